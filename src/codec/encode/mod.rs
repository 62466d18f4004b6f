// Encode module: schema + value tree -> bytes

pub mod basic;
pub mod complex;

use tracing::trace;

use crate::codec::resolve_field;
use crate::codec::size::size_of_record;
use crate::codec::types::{Record, Value};
use crate::internal::error::Result;
use crate::schema::types::{FieldType, Schema};

/// Encodes `record` into a freshly allocated, exactly-sized buffer.
///
/// The buffer is sized by the size calculator before any byte is written.
/// Returns the buffer and the number of bytes written (its full length).
pub fn encode_record(schema: &Schema, record: &Record) -> Result<(Vec<u8>, usize)> {
    if schema.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let size = size_of_record(schema, record)?;
    let mut data = vec![0u8; size];
    let written = encode_record_into(schema, record, &mut data, 0)?;
    debug_assert_eq!(written, size, "size calculator and encoder disagree");
    Ok((data, written))
}

/// Encodes `record` into a caller-owned buffer starting at `offset`.
///
/// Nothing is allocated and the buffer never grows; writing past its end
/// fails with `OutOfBounds`. Returns the number of bytes written.
pub fn encode_record_into(schema: &Schema, record: &Record, data: &mut [u8], offset: usize) -> Result<usize> {
    let mut cursor = offset;

    for field in &schema.fields {
        // Debug fields are decode-only and have no bytes to write.
        if field.field_type.is_debug() {
            continue;
        }
        let value = resolve_field(field, record)?;
        trace!(field = %field.name, field_type = %field.field_type, cursor, "encoding field");
        cursor += encode_value(&field.field_type, value, data, cursor)?;
    }

    Ok(cursor - offset)
}

/// Encodes a single value of `field_type` at `offset`.
/// Returns the number of bytes written.
pub fn encode_value(field_type: &FieldType, value: &Value, data: &mut [u8], offset: usize) -> Result<usize> {
    match field_type {
        FieldType::Array(array) => complex::encode_array(array, value, data, offset),
        FieldType::BytesWithLength { schema } => {
            complex::encode_bytes_with_length(schema.as_deref(), value, data, offset)
        }
        FieldType::VariableType8(types) => complex::encode_variable_type(types, value, data, offset),
        basic_type => basic::encode_basic_value(basic_type, value, data, offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::error::Error;
    use crate::schema::types::Field;

    #[test]
    fn test_encode_record_allocates_exact_size() {
        let schema = Schema::new(vec![
            Field::new("id", FieldType::UInt32),
            Field::new("name", FieldType::String),
        ]);
        let record = Record::new().with("id", 42u32).with("name", "bob");
        let (data, written) = encode_record(&schema, &record).unwrap();
        assert_eq!(written, data.len());
        assert_eq!(
            data,
            vec![0x2a, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, b'b', b'o', b'b']
        );
    }

    #[test]
    fn test_encode_into_caller_buffer_at_offset() {
        let schema = Schema::new(vec![Field::new("v", FieldType::UInt16)]);
        let record = Record::new().with("v", 0x1234u16);
        let mut data = [0xffu8; 4];
        let written = encode_record_into(&schema, &record, &mut data, 1).unwrap();
        assert_eq!(written, 2);
        assert_eq!(data, [0xff, 0x34, 0x12, 0xff]);
    }

    #[test]
    fn test_encode_into_too_small_buffer() {
        let schema = Schema::new(vec![Field::new("v", FieldType::UInt32)]);
        let record = Record::new().with("v", 1u32);
        let mut data = [0u8; 3];
        assert!(matches!(
            encode_record_into(&schema, &record, &mut data, 0),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_encode_uses_default_value() {
        let schema = Schema::new(vec![
            Field::new("a", FieldType::UInt8),
            Field::new("b", FieldType::UInt8).with_default(7u8),
        ]);
        let (data, _) = encode_record(&schema, &Record::new().with("a", 1u8)).unwrap();
        assert_eq!(data, vec![1, 7]);

        // A present value wins over the default.
        let (data, _) = encode_record(&schema, &Record::new().with("a", 1u8).with("b", 2u8)).unwrap();
        assert_eq!(data, vec![1, 2]);
    }

    #[test]
    fn test_encode_missing_field() {
        let schema = Schema::new(vec![Field::new("x", FieldType::UInt8)]);
        let err = encode_record(&schema, &Record::new()).unwrap_err();
        assert!(matches!(err, Error::MissingField { ref field } if field == "x"));
    }

    #[test]
    fn test_encode_empty_schema() {
        let (data, written) = encode_record(&Schema::empty(), &Record::new()).unwrap();
        assert!(data.is_empty());
        assert_eq!(written, 0);
    }

    #[test]
    fn test_encode_skips_debug_fields() {
        let schema = Schema::new(vec![
            Field::new("at", FieldType::DebugOffset),
            Field::new("v", FieldType::UInt8),
            Field::new("peek", FieldType::DebugBytes { length: 2 }),
        ]);
        let record = Record::new()
            .with("at", Value::Offset(0))
            .with("v", 5u8)
            .with("peek", bytes::Bytes::from_static(&[1, 2]));
        let (data, written) = encode_record(&schema, &record).unwrap();
        assert_eq!(data, vec![5]);
        assert_eq!(written, 1);
    }
}
