#![allow(missing_docs)]
#![allow(clippy::approx_constant)]

//! Round-trip coverage for primitives, containers and temporals.

use boson::{ComponentType, Graph, Period, Value};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta};

fn round_trip(value: Value) -> Value {
    let bytes = boson::encode(&value, &Graph::new()).unwrap();
    boson::decode(&bytes).unwrap().root
}

#[test]
fn primitives_round_trip() {
    let samples = [
        Value::Null,
        Value::Byte(i8::MIN),
        Value::Byte(-1),
        Value::Byte(i8::MAX),
        Value::Short(i16::MIN),
        Value::Short(1234),
        Value::Int(i32::MIN),
        Value::Int(0),
        Value::Int(i32::MAX),
        Value::Long(i64::MIN),
        Value::Long(i64::MAX),
        Value::Float(5.3),
        Value::Float(f32::MIN_POSITIVE),
        Value::Float(f32::NEG_INFINITY),
        Value::Double(6.2),
        Value::Double(f64::MAX),
        Value::Bool(true),
        Value::Bool(false),
        Value::Char('z'),
        Value::Char('é'),
        Value::Char('\u{ffff}'),
        Value::String(String::new()),
        Value::String("a str".into()),
        Value::String("päivää 🦀".into()),
    ];
    for value in samples {
        assert_eq!(round_trip(value.clone()), value);
    }
}

#[test]
fn float_bits_survive_exactly() {
    let nan = round_trip(Value::Double(f64::NAN));
    match nan {
        Value::Double(d) => assert!(d.is_nan()),
        other => panic!("expected a double, got {other:?}"),
    }
}

#[test]
fn containers_round_trip() {
    let samples = [
        Value::Bytes(vec![]),
        Value::Bytes(vec![1, 2, 3, 255]),
        Value::List(vec![]),
        Value::List(vec![Value::Int(5), Value::Int(6), Value::Null]),
        Value::Set(vec![Value::Int(34)]),
        Value::Map(vec![]),
        Value::Map(vec![
            (Value::Int(1), Value::String("one".into())),
            (Value::Double(2.5), Value::Null),
        ]),
        Value::Array(ComponentType::Int, vec![Value::Int(3), Value::Int(4), Value::Int(2)]),
        Value::Array(ComponentType::String, vec![Value::Null, Value::String("x".into())]),
        Value::List(vec![Value::List(vec![Value::Map(vec![(
            Value::String("deep".into()),
            Value::Set(vec![Value::Byte(7)]),
        )])])]),
    ];
    for value in samples {
        assert_eq!(round_trip(value.clone()), value);
    }
}

/// The mixed-map scenario: one of every kind in a single map, decoded back
/// under natural equality, with `byte[]` staying a raw byte sequence.
#[test]
fn mixed_map_round_trips() {
    let map = Value::Map(vec![
        ("int".into(), Value::Int(1)),
        ("long".into(), Value::Long(2)),
        ("byte".into(), Value::Byte(3)),
        ("short".into(), Value::Short(4)),
        ("boolean".into(), Value::Bool(true)),
        ("byte[]".into(), Value::Bytes(vec![1, 2, 3])),
        ("float".into(), Value::Float(5.3)),
        ("double".into(), Value::Double(6.2)),
        ("char".into(), Value::Char('z')),
        ("null".into(), Value::Null),
        ("str".into(), Value::String("a str".into())),
        (
            "array".into(),
            Value::Array(
                ComponentType::Other("java.lang.Object".into()),
                vec![Value::Int(1), Value::String("2".into())],
            ),
        ),
        ("list".into(), Value::List(vec![Value::Int(5), Value::Int(6)])),
        ("set".into(), Value::Set(vec![Value::Int(34)])),
        (
            "int-array".into(),
            Value::Array(
                ComponentType::Int,
                vec![Value::Int(3), Value::Int(4), Value::Int(2), Value::Int(5)],
            ),
        ),
    ]);

    let decoded = round_trip(map.clone());
    assert_eq!(decoded, map);
    assert!(
        matches!(decoded.get_entry("byte[]"), Some(Value::Bytes(b)) if b == &[1, 2, 3]),
        "byte[] must decode to a raw byte sequence"
    );
}

#[test]
fn map_equality_is_insensitive_to_pair_order() {
    let bytes = boson::encode(
        &Value::Map(vec![
            ("x".into(), Value::Int(1)),
            ("y".into(), Value::Int(2)),
        ]),
        &Graph::new(),
    )
    .unwrap();
    let reordered = Value::Map(vec![
        ("y".into(), Value::Int(2)),
        ("x".into(), Value::Int(1)),
    ]);
    assert_eq!(boson::decode(&bytes).unwrap().root, reordered);
}

#[test]
fn temporals_round_trip_at_wire_precision() {
    let timestamp = DateTime::from_timestamp_millis(1_277_859_600_123).unwrap();
    let samples = [
        Value::Timestamp(timestamp),
        Value::LocalDate(NaiveDate::from_ymd_opt(2010, 6, 30).unwrap()),
        Value::LocalDate(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()),
        Value::LocalDateTime(
            NaiveDate::from_ymd_opt(2007, 12, 3)
                .unwrap()
                .and_hms_milli_opt(10, 15, 30, 250)
                .unwrap(),
        ),
        Value::LocalTime(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()),
        Value::Duration(TimeDelta::hours(8) + TimeDelta::minutes(6) + TimeDelta::milliseconds(12_345)),
        Value::Duration(TimeDelta::seconds(-42)),
        Value::Period(Period::new(6, 3, 1)),
        Value::Period(Period::default()),
        Value::Interval {
            start: timestamp,
            end: DateTime::from_timestamp_millis(1_278_017_999_000).unwrap(),
        },
    ];
    for value in samples {
        assert_eq!(round_trip(value.clone()), value);
    }
}

#[test]
fn instants_carry_millisecond_precision() {
    // Sub-millisecond detail is below what the wire carries and must not
    // survive an encode.
    let fine = DateTime::from_timestamp_nanos(1_277_859_600_123_456_789);
    let decoded = round_trip(Value::Timestamp(fine));
    assert_eq!(
        decoded,
        Value::Timestamp(DateTime::from_timestamp_millis(1_277_859_600_123).unwrap())
    );
}

#[test]
fn legacy_temporal_tags_decode_onto_plain_kinds() {
    // Tag 25 carries epoch millis, like tag 19.
    let mut legacy = vec![1u8, 25];
    legacy.extend_from_slice(&1_277_859_600_123i64.to_be_bytes());
    let decoded = boson::decode(&legacy).unwrap();
    assert_eq!(
        decoded.root,
        Value::Timestamp(DateTime::from_timestamp_millis(1_277_859_600_123).unwrap())
    );

    // Tag 26 carries an ISO date string, unlike tag 20's epoch day.
    let mut legacy = vec![1u8, 26, 10, 0, 0, 0, 10];
    legacy.extend_from_slice(b"2010-06-30");
    let decoded = boson::decode(&legacy).unwrap();
    assert_eq!(
        decoded.root,
        Value::LocalDate(NaiveDate::from_ymd_opt(2010, 6, 30).unwrap())
    );

    // Tag 31 carries an ISO period.
    let mut legacy = vec![1u8, 31, 10, 0, 0, 0, 7];
    legacy.extend_from_slice(b"P1Y2M3D");
    let decoded = boson::decode(&legacy).unwrap();
    assert_eq!(decoded.root, Value::Period(Period::new(1, 2, 3)));
}

#[test]
fn re_encoding_legacy_input_emits_canonical_tags() {
    let mut legacy = vec![1u8, 25];
    legacy.extend_from_slice(&86_400_000i64.to_be_bytes());
    let decoded = boson::decode(&legacy).unwrap();
    let re_encoded = boson::encode(&decoded.root, &decoded.graph).unwrap();
    assert_eq!(re_encoded[1], 19, "plain DATE tag replaces the legacy twin");
}
