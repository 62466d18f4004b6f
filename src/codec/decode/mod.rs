// Decode module: schema + buffer + offset -> value tree + bytes consumed

pub mod basic;
pub mod complex;

use tracing::trace;

use crate::codec::config::CodecConfig;
use crate::codec::types::{Record, Value};
use crate::internal::error::Result;
use crate::schema::types::{FieldType, Schema};

/// Decodes one record of `schema` starting at `offset`.
///
/// Fields are read in schema order with a cursor that starts at `offset`;
/// the returned length is `cursor_after - offset`. Nested schemas and arrays
/// recurse at the cursor and advance it by what the sub-call consumed.
pub fn decode_record(
    schema: &Schema,
    data: &[u8],
    offset: usize,
    config: &CodecConfig,
) -> Result<(Record, usize)> {
    let mut cursor = offset;
    let mut record = Record::with_capacity(schema.fields.len());

    for field in &schema.fields {
        trace!(field = %field.name, field_type = %field.field_type, cursor, "decoding field");
        let (value, consumed) = decode_value(&field.field_type, data, cursor, config)?;
        record.insert(field.name.as_str(), value);
        cursor += consumed;
    }

    Ok((record, cursor - offset))
}

/// Decodes a single value of `field_type` at `offset`.
///
/// This is the direct entry point used for array elements and
/// `variabletype8` payloads, so scalars never need a wrapper schema.
pub fn decode_value(
    field_type: &FieldType,
    data: &[u8],
    offset: usize,
    config: &CodecConfig,
) -> Result<(Value, usize)> {
    match field_type {
        FieldType::Array(array) => complex::decode_array(array, data, offset, config),
        FieldType::BytesWithLength { schema } => {
            complex::decode_bytes_with_length(schema.as_deref(), data, offset, config)
        }
        FieldType::VariableType8(types) => complex::decode_variable_type(types, data, offset, config),
        basic_type => basic::decode_basic_value(basic_type, data, offset, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Field;

    #[test]
    fn test_decode_record_in_schema_order() {
        let schema = Schema::new(vec![
            Field::new("id", FieldType::UInt32),
            Field::new("flag", FieldType::Boolean),
            Field::new("name", FieldType::String),
        ]);
        let data = [
            0x2a, 0x00, 0x00, 0x00, // id = 42
            0x01, // flag = true
            0x03, 0x00, 0x00, 0x00, b'b', b'o', b'b', // name = "bob"
        ];

        let (record, consumed) = decode_record(&schema, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["id", "flag", "name"]);
        assert_eq!(record.get("id"), Some(&Value::U32(42)));
        assert_eq!(record.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(record.get("name"), Some(&Value::from("bob")));
    }

    #[test]
    fn test_decode_record_at_offset() {
        let schema = Schema::new(vec![Field::new("v", FieldType::UInt16)]);
        let data = [0xff, 0xff, 0x34, 0x12];
        let (record, consumed) = decode_record(&schema, &data, 2, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(record.get("v"), Some(&Value::U16(0x1234)));
    }

    #[test]
    fn test_decode_truncated_buffer_fails() {
        let schema = Schema::new(vec![
            Field::new("a", FieldType::UInt8),
            Field::new("b", FieldType::UInt32),
        ]);
        let result = decode_record(&schema, &[0x01, 0x02], 0, &CodecConfig::default());
        assert!(matches!(
            result,
            Err(crate::internal::error::Error::OutOfBounds { offset: 1, length: 4, available: 2 })
        ));
    }

    #[test]
    fn test_debug_offset_reports_cursor() {
        let schema = Schema::new(vec![
            Field::new("a", FieldType::UInt16),
            Field::new("here", FieldType::DebugOffset),
            Field::new("b", FieldType::UInt8),
        ]);
        let data = [0x00, 0x00, 0x07];
        let (record, consumed) = decode_record(&schema, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(record.get("here"), Some(&Value::Offset(2)));
        assert_eq!(record.get("b"), Some(&Value::U8(7)));
    }
}
