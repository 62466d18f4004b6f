// Decoding of the recursive field types: arrays, length-prefixed blobs and
// tagged unions. Each recurses through `decode_value`/`decode_record` at the
// current cursor and reports the total bytes it consumed.

use bytes::Bytes;

use crate::codec::config::CodecConfig;
use crate::codec::decode::{decode_record, decode_value};
use crate::codec::types::Value;
use crate::internal::buffer::{self, LENGTH_PREFIX_LEN};
use crate::internal::error::{Error, Result};
use crate::schema::types::{ArrayElement, ArrayField, FieldType, Schema};

/// Decodes an array.
///
/// The element count is, in priority order: the `debuglength` override, the
/// fixed `length`, or a uint32 LE count prefix. The prefix is still consumed
/// when only the override is present.
pub fn decode_array(
    array: &ArrayField,
    data: &[u8],
    offset: usize,
    config: &CodecConfig,
) -> Result<(Value, usize)> {
    let mut cursor = offset;
    let mut count = match array.length {
        Some(length) => length,
        None => {
            let prefix = buffer::read_u32_le(data, cursor)? as usize;
            cursor += LENGTH_PREFIX_LEN;
            prefix
        }
    };
    if let Some(debug_length) = array.debug_length {
        count = debug_length;
    }
    let count_from_wire = array.length.is_none() && array.debug_length.is_none();
    let remaining = data.len().saturating_sub(cursor);
    if let Some(limit) = config.max_array_length {
        if count > limit {
            return Err(Error::ArrayTooLong { count, limit });
        }
    }

    // The count comes off the wire; don't let it size the allocation alone.
    let mut elements = Vec::with_capacity(count.min(remaining));
    for _ in 0..count {
        let (element, consumed) = match &array.element {
            ArrayElement::Schema(schema) => {
                let (record, consumed) = decode_record(schema, data, cursor, config)?;
                (Value::Object(record), consumed)
            }
            ArrayElement::Type(element_type) => decode_value(element_type, data, cursor, config)?,
        };
        // Zero-width elements never run out of input, so a wire count has
        // nothing else bounding it.
        if consumed == 0 && count_from_wire && count > remaining {
            return Err(Error::ArrayTooLong {
                count,
                limit: remaining,
            });
        }
        elements.push(element);
        cursor += consumed;
    }

    Ok((Value::Array(elements), cursor - offset))
}

/// Decodes a uint32 LE length prefix and the region it covers.
///
/// With a nested schema the region is decoded as a record confined to the
/// prefixed length. Either way the cursor advances by the prefix length.
pub fn decode_bytes_with_length(
    schema: Option<&Schema>,
    data: &[u8],
    offset: usize,
    config: &CodecConfig,
) -> Result<(Value, usize)> {
    let payload = buffer::read_prefixed_bytes(data, offset)?;
    let length = payload.len();
    let start = offset + LENGTH_PREFIX_LEN;

    let value = match schema {
        Some(schema) => {
            // Keep absolute offsets (for debugoffset) but stop reads at the region end.
            let region = &data[..start + length];
            let (record, _) = decode_record(schema, region, start, config)?;
            Value::Object(record)
        }
        None => Value::Bytes(Bytes::copy_from_slice(payload)),
    };

    Ok((value, LENGTH_PREFIX_LEN + length))
}

/// Decodes a `variabletype8`: a uint8 index into `types`, then a value of
/// the selected type.
pub fn decode_variable_type(
    types: &[FieldType],
    data: &[u8],
    offset: usize,
    config: &CodecConfig,
) -> Result<(Value, usize)> {
    let index = buffer::read_u8(data, offset)?;
    let selected = FieldType::variant(types, index)?;
    let (value, consumed) = decode_value(selected, data, offset + 1, config)?;
    Ok((
        Value::Variant {
            index,
            value: Box::new(value),
        },
        1 + consumed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::types::Record;
    use crate::schema::types::Field;

    fn scalar_array(element: FieldType) -> ArrayField {
        ArrayField::counted(ArrayElement::Type(Box::new(element)))
    }

    #[test]
    fn test_decode_counted_scalar_array() {
        let data = [0x03, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00];
        let (value, consumed) =
            decode_array(&scalar_array(FieldType::UInt16), &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 10);
        assert_eq!(value, Value::Array(vec![Value::U16(1), Value::U16(2), Value::U16(3)]));
    }

    #[test]
    fn test_decode_fixed_length_array_has_no_prefix() {
        let array = ArrayField::fixed(ArrayElement::Type(Box::new(FieldType::UInt8)), 2);
        let (value, consumed) = decode_array(&array, &[7, 8, 9], 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(value, Value::Array(vec![Value::U8(7), Value::U8(8)]));
    }

    #[test]
    fn test_debug_length_overrides_prefix() {
        let mut array = scalar_array(FieldType::UInt8);
        array.debug_length = Some(1);
        // Prefix claims 9 elements; the override reads one.
        let data = [0x09, 0x00, 0x00, 0x00, 0x05];
        let (value, consumed) = decode_array(&array, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(value, Value::Array(vec![Value::U8(5)]));
    }

    #[test]
    fn test_decode_array_of_records() {
        let element = Schema::new(vec![
            Field::new("x", FieldType::UInt8),
            Field::new("name", FieldType::String),
        ]);
        let array = ArrayField::counted(ArrayElement::Schema(element));
        let data = [
            0x02, 0x00, 0x00, 0x00, // count
            0x01, 0x01, 0x00, 0x00, 0x00, b'a', // {x: 1, name: "a"}
            0x02, 0x00, 0x00, 0x00, 0x00, // {x: 2, name: ""}
        ];
        let (value, consumed) = decode_array(&array, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(
            value,
            Value::Array(vec![
                Value::Object(Record::new().with("x", 1u8).with("name", "a")),
                Value::Object(Record::new().with("x", 2u8).with("name", "")),
            ])
        );
    }

    #[test]
    fn test_array_count_limit() {
        let config = CodecConfig {
            max_array_length: Some(2),
            ..CodecConfig::default()
        };
        let data = [0x03, 0x00, 0x00, 0x00, 1, 2, 3];
        let result = decode_array(&scalar_array(FieldType::UInt8), &data, 0, &config);
        assert!(matches!(result, Err(Error::ArrayTooLong { count: 3, limit: 2 })));
    }

    #[test]
    fn test_huge_count_fails_without_huge_allocation() {
        let data = [0xff, 0xff, 0xff, 0xff, 0x01];
        let result = decode_array(&scalar_array(FieldType::UInt32), &data, 0, &CodecConfig::default());
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_zero_width_elements_bound_wire_count() {
        let array = ArrayField::counted(ArrayElement::Schema(Schema::empty()));
        let data = 50_000_000u32.to_le_bytes();
        let result = decode_array(&array, &data, 0, &CodecConfig::default());
        assert!(matches!(
            result,
            Err(Error::ArrayTooLong { count: 50_000_000, limit: 0 })
        ));

        let array = scalar_array(FieldType::DebugOffset);
        let data = [0x03, 0x00, 0x00, 0x00, 0xaa];
        let result = decode_array(&array, &data, 0, &CodecConfig::default());
        assert!(matches!(result, Err(Error::ArrayTooLong { count: 3, limit: 1 })));
    }

    #[test]
    fn test_zero_width_elements_within_bounds_decode() {
        let array = ArrayField::counted(ArrayElement::Schema(Schema::empty()));
        let data = [0x02, 0x00, 0x00, 0x00, 0xaa, 0xbb];
        let (value, consumed) = decode_array(&array, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(
            value,
            Value::Array(vec![Value::Object(Record::new()), Value::Object(Record::new())])
        );

        // Schema-declared counts are trusted.
        let array = ArrayField::fixed(ArrayElement::Schema(Schema::empty()), 3);
        let (value, consumed) = decode_array(&array, &[], 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 0);
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_decode_bytes_with_length_raw() {
        let data = [0x02, 0x00, 0x00, 0x00, 0xaa, 0xbb, 0xcc];
        let (value, consumed) = decode_bytes_with_length(None, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 6);
        assert_eq!(value, Value::Bytes(Bytes::from_static(&[0xaa, 0xbb])));
    }

    #[test]
    fn test_decode_bytes_with_length_nested_schema_advances_by_prefix() {
        let schema = Schema::new(vec![Field::new("v", FieldType::UInt16)]);
        // Region of 3 bytes; the nested record only reads 2 of them.
        let data = [0x03, 0x00, 0x00, 0x00, 0x34, 0x12, 0xff, 0x01];
        let (value, consumed) =
            decode_bytes_with_length(Some(&schema), &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 7);
        assert_eq!(value, Value::Object(Record::new().with("v", 0x1234u16)));
    }

    #[test]
    fn test_nested_schema_cannot_read_past_region() {
        let schema = Schema::new(vec![Field::new("v", FieldType::UInt32)]);
        let data = [0x02, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04];
        let result = decode_bytes_with_length(Some(&schema), &data, 0, &CodecConfig::default());
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_decode_variable_type() {
        let types = vec![FieldType::UInt8, FieldType::String];
        let data = [0x01, 0x02, 0x00, 0x00, 0x00, b'h', b'i'];
        let (value, consumed) = decode_variable_type(&types, &data, 0, &CodecConfig::default()).unwrap();
        assert_eq!(consumed, 7);
        assert_eq!(
            value,
            Value::Variant {
                index: 1,
                value: Box::new(Value::from("hi")),
            }
        );

        let result = decode_variable_type(&types, &[0x05], 0, &CodecConfig::default());
        assert!(matches!(result, Err(Error::InvalidVariant { index: 5, variants: 2 })));
    }
}
