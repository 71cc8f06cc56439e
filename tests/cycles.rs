#![allow(missing_docs)]

//! Reference-tracking behavior: cycles, shared substructure, back-reference
//! resolution and the records-as-maps mode.

use boson::{BosonError, Decoder, Graph, Record, Value};

#[test]
fn a_record_can_reference_itself() {
    let mut graph = Graph::new();
    let r = graph.add_record(Record::new("R"));
    graph[r].set("self", Value::Record(r));

    let bytes = boson::encode(&Value::Record(r), &graph).unwrap();
    let decoded = boson::decode(&bytes).unwrap();

    let root = decoded.root.as_record().expect("record root");
    assert_eq!(
        decoded.graph[root].get("self"),
        Some(&Value::Record(root)),
        "the self slot must resolve to the decoded record itself"
    );
}

#[test]
fn mutually_referencing_records_survive() {
    let mut graph = Graph::new();
    let a1 = graph.add_record(Record::new("A"));
    let b1 = graph.add_record(Record::new("B"));
    graph[a1].set("b", Value::Record(b1));
    graph[b1].set("a", Value::Record(a1));

    let bytes = boson::encode(&Value::Record(a1), &graph).unwrap();
    let decoded = boson::decode(&bytes).unwrap();

    let a = decoded.root.as_record().expect("record root");
    let b = decoded.graph[a].get("b").and_then(Value::as_record).expect("b slot");
    assert_eq!(decoded.graph[a].class_name(), "A");
    assert_eq!(decoded.graph[b].class_name(), "B");
    assert_eq!(
        decoded.graph[b].get("a"),
        Some(&Value::Record(a)),
        "b.a must be the identical decoded a, not a copy"
    );
}

#[test]
fn shared_substructure_is_preserved_by_identity() {
    let mut graph = Graph::new();
    let shared = graph.add_record(Record::new("S"));
    graph[shared].set("n", Value::Int(42));
    let mut outer = Record::new("R");
    outer.set("left", Value::Record(shared));
    outer.set("right", Value::Record(shared));
    let outer = graph.add_record(outer);

    let bytes = boson::encode(&Value::Record(outer), &graph).unwrap();
    let decoded = boson::decode(&bytes).unwrap();

    let root = decoded.root.as_record().expect("record root");
    let left = decoded.graph[root].get("left").and_then(Value::as_record).expect("left");
    let right = decoded.graph[root].get("right").and_then(Value::as_record).expect("right");
    assert_eq!(left, right, "both slots must point at one decoded instance");
    assert_eq!(decoded.graph[left].get("n"), Some(&Value::Int(42)));
}

#[test]
fn records_inside_containers_share_identity_too() {
    let mut graph = Graph::new();
    let shared = graph.add_record(Record::new("S"));
    let list = Value::List(vec![Value::Record(shared), Value::Record(shared)]);

    let bytes = boson::encode(&list, &graph).unwrap();
    let decoded = boson::decode(&bytes).unwrap();
    let items = decoded.root.as_list().expect("list root");
    assert_eq!(items[0], items[1]);
    assert_eq!(decoded.graph.len(), 1, "one record body, one back-reference");
}

#[test]
fn reference_ids_allocate_from_zero_in_visit_order() {
    let mut graph = Graph::new();
    let first = graph.add_record(Record::new("First"));
    let second = graph.add_record(Record::new("Second"));
    let list = Value::List(vec![Value::Record(first), Value::Record(second)]);

    let bytes = boson::encode(&list, &graph).unwrap();
    // RECORD tag, then the int32 reference id.
    let first_ref = &bytes[7..11];
    assert_eq!(first_ref, [0, 0, 0, 0]);
}

#[test]
fn dangling_references_are_rejected() {
    let err = boson::decode(&[1, 15, 0, 0, 0, 0]).unwrap_err();
    assert!(matches!(err, BosonError::DanglingReference(0)));
}

#[test]
fn map_mode_materializes_records_as_string_keyed_maps() {
    let mut graph = Graph::new();
    let inner = graph.add_record(Record::new("Inner"));
    graph[inner].set("n", Value::Int(7));
    let mut outer = Record::new("Outer");
    outer.set("inner", Value::Record(inner));
    outer.set("tag", Value::String("x".into()));
    let outer = graph.add_record(outer);

    let bytes = boson::encode(&Value::Record(outer), &graph).unwrap();
    let decoded = Decoder::new().records_as_maps(true).decode(&bytes).unwrap();

    assert!(decoded.graph.is_empty(), "map mode leaves no arena records");
    let inner_map = decoded.root.get_entry("inner").expect("inner entry");
    assert_eq!(inner_map.get_entry("n"), Some(&Value::Int(7)));
    assert_eq!(decoded.root.get_entry("tag"), Some(&Value::String("x".into())));
}

#[test]
fn map_mode_duplicates_shared_substructure() {
    let mut graph = Graph::new();
    let shared = graph.add_record(Record::new("S"));
    graph[shared].set("n", Value::Int(1));
    let mut outer = Record::new("R");
    outer.set("left", Value::Record(shared));
    outer.set("right", Value::Record(shared));
    let outer = graph.add_record(outer);

    let bytes = boson::encode(&Value::Record(outer), &graph).unwrap();
    let decoded = Decoder::new().records_as_maps(true).decode(&bytes).unwrap();
    let left = decoded.root.get_entry("left").expect("left");
    let right = decoded.root.get_entry("right").expect("right");
    assert_eq!(left, right, "equal by value; identity is an arena concept");
}

#[test]
fn map_mode_rejects_cyclic_graphs() {
    let mut graph = Graph::new();
    let r = graph.add_record(Record::new("R"));
    graph[r].set("self", Value::Record(r));
    let bytes = boson::encode(&Value::Record(r), &graph).unwrap();

    let err = Decoder::new().records_as_maps(true).decode(&bytes).unwrap_err();
    assert!(matches!(err, BosonError::InvalidData(_)));
}

#[test]
fn deep_but_acyclic_nesting_decodes() {
    let mut graph = Graph::new();
    let mut child = graph.add_record(Record::new("Leaf"));
    for _ in 0..200 {
        let mut parent = Record::new("Node");
        parent.set("child", Value::Record(child));
        child = graph.add_record(parent);
    }
    let bytes = boson::encode(&Value::Record(child), &graph).unwrap();
    let decoded = boson::decode(&bytes).unwrap();
    assert_eq!(decoded.graph.len(), 201);
}
