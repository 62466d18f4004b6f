use bytes::Bytes;
use dataschema::{decode, encode, size_of, Record, Schema, Value};
use proptest::prelude::*;
use serde_json::json;

fn schema() -> Schema {
    Schema::from_json(&json!({
        "fields": [
            {"name": "kind", "type": "uint8"},
            {"name": "guid", "type": "uint64"},
            {"name": "offset", "type": "int32"},
            {"name": "scale", "type": "float"},
            {"name": "label", "type": "string"},
            {"name": "blob", "type": "byteswithlength"},
            {"name": "values", "type": "array", "elementType": "uint16"},
            {"name": "entries", "type": "array", "elementSchema": {
                "fields": [
                    {"name": "key", "type": "string"},
                    {"name": "on", "type": "boolean"}
                ]
            }},
            {"name": "choice", "type": "variabletype8", "types": ["int16", "string"]},
            {"name": "nested", "type": "byteswithlength", "schema": {
                "fields": [{"name": "inner", "type": "array", "elementType": "int8"}]
            }}
        ]
    }))
    .unwrap()
}

fn variant() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i16>().prop_map(|v| Value::Variant {
            index: 0,
            value: Box::new(Value::I16(v)),
        }),
        "[a-z]{0,12}".prop_map(|s| Value::Variant {
            index: 1,
            value: Box::new(Value::String(s)),
        }),
    ]
}

fn entry() -> impl Strategy<Value = Value> {
    ("\\PC{0,8}", any::<bool>())
        .prop_map(|(key, on)| Value::Object(Record::new().with("key", key).with("on", on)))
}

prop_compose! {
    fn record()(
        kind in any::<u8>(),
        guid in any::<u64>(),
        offset in any::<i32>(),
        scale in -1.0e6f32..1.0e6f32,
        label in "\\PC{0,24}",
        blob in prop::collection::vec(any::<u8>(), 0..32),
        values in prop::collection::vec(any::<u16>(), 0..16),
        entries in prop::collection::vec(entry(), 0..4),
        choice in variant(),
        inner in prop::collection::vec(any::<i8>(), 0..8),
    ) -> Record {
        Record::new()
            .with("kind", kind)
            .with("guid", guid)
            .with("offset", offset)
            .with("scale", scale)
            .with("label", label)
            .with("blob", Bytes::from(blob))
            .with("values", Value::Array(values.into_iter().map(Value::U16).collect()))
            .with("entries", Value::Array(entries))
            .with("choice", choice)
            .with(
                "nested",
                Record::new().with("inner", Value::Array(inner.into_iter().map(Value::I8).collect())),
            )
    }
}

proptest! {
    /// The size calculator predicts exactly what the encoder writes.
    #[test]
    fn size_matches_bytes_written(record in record()) {
        let schema = schema();
        let size = size_of(&schema, &record).unwrap();
        let (data, written) = encode(&schema, &record).unwrap();
        prop_assert_eq!(size, written);
        prop_assert_eq!(data.len(), written);
    }

    /// Decoding the encoded bytes reproduces the original tree.
    #[test]
    fn decode_inverts_encode(record in record()) {
        let schema = schema();
        let (data, written) = encode(&schema, &record).unwrap();
        let (decoded, consumed) = decode(&schema, &data, 0).unwrap();
        prop_assert_eq!(consumed, written);
        prop_assert_eq!(decoded, record);
    }

    /// Arbitrary bytes either decode within bounds or fail cleanly.
    #[test]
    fn decode_never_reads_past_buffer(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let schema = schema();
        if let Ok((_, consumed)) = decode(&schema, &data, 0) {
            prop_assert!(consumed <= data.len());
        }
    }
}
