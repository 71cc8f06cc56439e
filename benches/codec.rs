#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use boson::{Graph, Record, Value};

// --- SETUP ---

/// A mixed payload: a map of primitives plus a chain of records with shared
/// tails, shaped like the session snapshots the codec was built for.
fn build_payload() -> (Value, Graph) {
    let mut graph = Graph::new();

    let shared = graph.add_record(Record::new("Meta"));
    graph[shared].set("origin", Value::String("bench".into()));

    let mut previous: Option<boson::RecordId> = None;
    let mut ids = Vec::new();
    for i in 0..256i32 {
        let mut record = Record::new("Item");
        record.set("seq", Value::Int(i));
        record.set("meta", Value::Record(shared));
        record.set("blob", Value::Bytes(vec![i as u8; 64]));
        if let Some(prev) = previous {
            record.set("prev", Value::Record(prev));
        }
        let id = graph.add_record(record);
        ids.push(Value::Record(id));
        previous = Some(id);
    }

    let root = Value::Map(vec![
        ("items".into(), Value::List(ids)),
        ("count".into(), Value::Int(256)),
        ("label".into(), Value::String("codec-bench".into())),
    ]);
    (root, graph)
}

// --- BENCHMARKS ---

fn bench_encode(c: &mut Criterion) {
    let (root, graph) = build_payload();
    let encoded_len = boson::encode(&root, &graph).expect("encodable").len() as u64;

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(encoded_len));
    group.bench_function("mixed_graph", |b| {
        b.iter(|| boson::encode(black_box(&root), black_box(&graph)).expect("encodable"));
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let (root, graph) = build_payload();
    let bytes = boson::encode(&root, &graph).expect("encodable");

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("mixed_graph", |b| {
        b.iter(|| boson::decode(black_box(&bytes)).expect("decodable"));
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
