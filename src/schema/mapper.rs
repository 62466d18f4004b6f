// JSON <-> value tree mapping
//
// Converts JSON documents into typed value trees guided by the schema (so a
// JSON number becomes the exact integer variant the field declares), and
// value trees back into JSON for display.
//
// JSON forms: integers as numbers, `uint64` as a decimal string (numbers are
// accepted on input), byte blobs as hex strings (arrays of byte values are
// accepted on input), `variabletype8` as `{"type": index, "value": ...}` and
// `bitflags` as an object of booleans.

use bytes::Bytes;
use serde_json::{Map, Number, Value as JsonValue};

use crate::codec::types::{Record, Value};
use crate::internal::error::{Error, Result};
use crate::internal::int64::Int64;
use crate::schema::types::{ArrayElement, FieldType, Schema};
use crate::schema::utils::{json_kind, json_to_integer};

static NULL: JsonValue = JsonValue::Null;

/// Builds a record from a JSON object.
///
/// Only schema fields are read; keys the schema doesn't name are ignored and
/// absent keys stay absent (defaults are applied at encode time). Debug
/// fields are skipped.
pub fn record_from_json(schema: &Schema, json: &JsonValue) -> Result<Record> {
    let obj = json
        .as_object()
        .ok_or_else(|| Error::type_mismatch("object", json_kind(json)))?;

    let mut record = Record::with_capacity(schema.fields.len());
    for field in &schema.fields {
        if field.field_type.is_debug() {
            continue;
        }
        if let Some(field_json) = obj.get(&field.name) {
            let value = value_from_json(&field.field_type, field_json).map_err(|e| match e {
                Error::TypeMismatch { expected, found } => Error::TypeMismatch {
                    expected: format!("{} for field '{}'", expected, field.name),
                    found,
                },
                other => other,
            })?;
            record.insert(field.name.as_str(), value);
        }
    }
    Ok(record)
}

/// Converts a JSON value into a value of `field_type`.
pub fn value_from_json(field_type: &FieldType, json: &JsonValue) -> Result<Value> {
    match field_type {
        FieldType::UInt8 => Ok(Value::U8(json_to_integer(json, "uint8")?)),
        FieldType::Int8 => Ok(Value::I8(json_to_integer(json, "int8")?)),
        FieldType::UInt16 => Ok(Value::U16(json_to_integer(json, "uint16")?)),
        FieldType::Int16 => Ok(Value::I16(json_to_integer(json, "int16")?)),
        FieldType::UInt32 => Ok(Value::U32(json_to_integer(json, "uint32")?)),
        FieldType::Int32 => Ok(Value::I32(json_to_integer(json, "int32")?)),
        FieldType::UInt64 => match json {
            JsonValue::String(s) => Ok(Value::U64(s.parse::<Int64>()?.value())),
            other => Ok(Value::U64(json_to_integer(other, "uint64")?)),
        },
        FieldType::Float => Ok(Value::F32(json_to_f32(json)?)),
        FieldType::FloatVector2 | FieldType::FloatVector3 | FieldType::FloatVector4 => {
            let count = field_type.vector_len().unwrap_or_default();
            let items = json
                .as_array()
                .filter(|items| items.len() == count)
                .ok_or_else(|| Error::type_mismatch(format!("array of {} numbers", count), json_kind(json)))?;
            items
                .iter()
                .map(|item| json_to_f32(item).map(Value::F32))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        FieldType::Boolean => json_to_bool(json).map(Value::Bool),
        FieldType::BitFlags(flags) => {
            let obj = json
                .as_object()
                .ok_or_else(|| Error::type_mismatch("object of flags", json_kind(json)))?;
            let states = flags
                .iter()
                .map(|flag| -> Result<(String, bool)> {
                    let set = match obj.get(&flag.name) {
                        Some(state) => json_to_bool(state).map_err(|_| {
                            Error::type_mismatch(format!("boolean for flag '{}'", flag.name), json_kind(state))
                        })?,
                        None => false,
                    };
                    Ok((flag.name.clone(), set))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Flags(states))
        }
        FieldType::String => json
            .as_str()
            .map(Value::from)
            .ok_or_else(|| Error::type_mismatch("string", json_kind(json))),
        FieldType::Bytes { .. } | FieldType::DebugBytes { .. } | FieldType::BytesWithLength { schema: None } => {
            bytes_from_json(json).map(Value::Bytes)
        }
        FieldType::BytesWithLength { schema: Some(schema) } => record_from_json(schema, json).map(Value::Object),
        FieldType::Array(array) => {
            let items = json
                .as_array()
                .ok_or_else(|| Error::type_mismatch("array", json_kind(json)))?;
            items
                .iter()
                .map(|item| match &array.element {
                    ArrayElement::Schema(schema) => record_from_json(schema, item).map(Value::Object),
                    ArrayElement::Type(element_type) => value_from_json(element_type, item),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        FieldType::VariableType8(types) => {
            let obj = json
                .as_object()
                .ok_or_else(|| Error::type_mismatch("{type, value} object", json_kind(json)))?;
            let index: u8 = json_to_integer(obj.get("type").unwrap_or(&NULL), "variant index")?;
            let selected = FieldType::variant(types, index)?;
            let inner = obj.get("value").unwrap_or(&NULL);
            Ok(Value::Variant {
                index,
                value: Box::new(value_from_json(selected, inner)?),
            })
        }
        FieldType::DebugOffset => Ok(Value::Offset(json_to_integer(json, "offset")?)),
    }
}

/// Booleans as-is, numbers nonzero.
fn json_to_bool(json: &JsonValue) -> Result<bool> {
    match json {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::Number(n) => Ok(n.as_f64().map_or(false, |v| v != 0.0)),
        other => Err(Error::type_mismatch("boolean", json_kind(other))),
    }
}

fn json_to_f32(json: &JsonValue) -> Result<f32> {
    json.as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| Error::type_mismatch("number", json_kind(json)))
}

fn bytes_from_json(json: &JsonValue) -> Result<Bytes> {
    match json {
        JsonValue::String(s) => hex::decode(s)
            .map(Bytes::from)
            .map_err(|e| Error::type_mismatch("hex string", format!("'{}' ({})", s, e))),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| json_to_integer::<u8>(item, "byte"))
            .collect::<Result<Vec<u8>>>()
            .map(Bytes::from),
        other => Err(Error::type_mismatch("hex string or byte array", json_kind(other))),
    }
}

/// Converts a record into a JSON object, preserving field order.
pub fn record_to_json(record: &Record) -> JsonValue {
    let mut obj = Map::new();
    for (name, value) in record.iter() {
        obj.insert(name.to_string(), value_to_json(value));
    }
    JsonValue::Object(obj)
}

/// Converts a value into its JSON form.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Bool(v) => JsonValue::Bool(*v),
        Value::U8(v) => JsonValue::from(*v),
        Value::U16(v) => JsonValue::from(*v),
        Value::U32(v) => JsonValue::from(*v),
        // Decimal string keeps full precision for JSON readers using doubles.
        Value::U64(v) => JsonValue::String(v.to_string()),
        Value::I8(v) => JsonValue::from(*v),
        Value::I16(v) => JsonValue::from(*v),
        Value::I32(v) => JsonValue::from(*v),
        Value::F32(v) => Number::from_f64(*v as f64).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => JsonValue::String(hex::encode(b)),
        Value::Array(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
        Value::Object(record) => record_to_json(record),
        Value::Flags(flags) => {
            let mut obj = Map::new();
            for (name, set) in flags {
                obj.insert(name.clone(), JsonValue::Bool(*set));
            }
            JsonValue::Object(obj)
        }
        Value::Variant { index, value } => {
            let mut obj = Map::new();
            obj.insert("type".to_string(), JsonValue::from(*index));
            obj.insert("value".to_string(), value_to_json(value));
            JsonValue::Object(obj)
        }
        Value::Offset(v) => JsonValue::from(*v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ArrayField, Field, Flag};
    use serde_json::json;

    #[test]
    fn test_record_from_json_typed_by_schema() {
        let schema = Schema::new(vec![
            Field::new("id", FieldType::UInt16),
            Field::new("big", FieldType::UInt64),
            Field::new("pos", FieldType::FloatVector2),
            Field::new("raw", FieldType::Bytes { length: 2 }),
            Field::new("at", FieldType::DebugOffset),
            Field::new("opt", FieldType::UInt8).with_default(1u8),
        ]);
        let json = json!({
            "id": 7,
            "big": "18446744073709551615",
            "pos": [1.5, -2],
            "raw": "beef",
            "at": 12,
            "extra": true
        });
        let record = record_from_json(&schema, &json).unwrap();
        assert_eq!(record.get("id"), Some(&Value::U16(7)));
        assert_eq!(record.get("big"), Some(&Value::U64(u64::MAX)));
        assert_eq!(
            record.get("pos"),
            Some(&Value::Array(vec![Value::F32(1.5), Value::F32(-2.0)]))
        );
        assert_eq!(record.get("raw"), Some(&Value::Bytes(Bytes::from_static(&[0xbe, 0xef]))));
        assert!(!record.contains_key("at"));
        assert!(!record.contains_key("opt"));
        assert!(!record.contains_key("extra"));
    }

    #[test]
    fn test_value_from_json_errors_name_field() {
        let schema = Schema::new(vec![Field::new("n", FieldType::UInt8)]);
        let err = record_from_json(&schema, &json!({"n": "x"})).unwrap_err();
        assert!(err.to_string().contains("field 'n'"));

        let err = record_from_json(&schema, &json!({"n": 300})).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { .. }));

        assert!(record_from_json(&schema, &json!([1])).is_err());
    }

    #[test]
    fn test_variant_and_flags_from_json() {
        let field_type = FieldType::VariableType8(vec![FieldType::UInt8, FieldType::String]);
        let value = value_from_json(&field_type, &json!({"type": 1, "value": "hi"})).unwrap();
        assert_eq!(
            value,
            Value::Variant {
                index: 1,
                value: Box::new(Value::from("hi")),
            }
        );
        assert!(matches!(
            value_from_json(&field_type, &json!({"type": 2, "value": 0})),
            Err(Error::InvalidVariant { .. })
        ));

        let field_type = FieldType::BitFlags(vec![Flag::new("a", 0), Flag::new("b", 1)]);
        let value = value_from_json(&field_type, &json!({"a": true})).unwrap();
        assert_eq!(
            value,
            Value::Flags(vec![("a".to_string(), true), ("b".to_string(), false)])
        );
    }

    #[test]
    fn test_flags_from_json_use_boolean_truthiness() {
        let field_type = FieldType::BitFlags(vec![Flag::new("a", 0), Flag::new("b", 1)]);
        let value = value_from_json(&field_type, &json!({"a": 1, "b": 0})).unwrap();
        assert_eq!(
            value,
            Value::Flags(vec![("a".to_string(), true), ("b".to_string(), false)])
        );

        let schema = Schema::new(vec![Field::new("f", field_type.clone())]);
        let record = record_from_json(&schema, &json!({"f": {"a": 1}})).unwrap();
        let (data, _) = crate::codec::encode(&schema, &record).unwrap();
        assert_eq!(data, vec![0x01]);

        for bad in [json!({"a": "yes"}), json!({"b": {}}), json!({"a": null})] {
            assert!(
                matches!(value_from_json(&field_type, &bad), Err(Error::TypeMismatch { .. })),
                "expected TypeMismatch for {}",
                bad
            );
        }
    }

    #[test]
    fn test_nested_arrays_from_json() {
        let element = Schema::new(vec![Field::new("x", FieldType::Int8)]);
        let field_type = FieldType::Array(ArrayField::counted(ArrayElement::Schema(element)));
        let value = value_from_json(&field_type, &json!([{"x": -1}, {"x": 2}])).unwrap();
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Object(Record::new().with("x", -1i8)),
                Value::Object(Record::new().with("x", 2i8)),
            ])
        );
    }

    #[test]
    fn test_bytes_from_byte_array() {
        let value = value_from_json(&FieldType::BytesWithLength { schema: None }, &json!([1, 2, 255])).unwrap();
        assert_eq!(value, Value::Bytes(Bytes::from_static(&[1, 2, 255])));
        assert!(value_from_json(&FieldType::BytesWithLength { schema: None }, &json!("zz")).is_err());
    }

    #[test]
    fn test_value_to_json_forms() {
        let record = Record::new()
            .with("big", 4294967298u64)
            .with("raw", Bytes::from_static(&[0xde, 0xad]))
            .with(
                "v",
                Value::Variant {
                    index: 0,
                    value: Box::new(Value::U8(3)),
                },
            )
            .with("f", Value::Flags(vec![("a".to_string(), true)]))
            .with("at", Value::Offset(4))
            .with("x", 0.5f32);
        assert_eq!(
            record_to_json(&record),
            json!({
                "big": "4294967298",
                "raw": "dead",
                "v": {"type": 0, "value": 3},
                "f": {"a": true},
                "at": 4,
                "x": 0.5
            })
        );
    }
}
