// Encoding of the recursive field types. Each writes into the caller's
// buffer at `offset` and returns the bytes written.

use crate::codec::encode::{encode_record, encode_record_into, encode_value};
use crate::codec::types::Value;
use crate::internal::buffer::{self, LENGTH_PREFIX_LEN};
use crate::internal::error::{Error, Result};
use crate::schema::types::{ArrayElement, ArrayField, FieldType, Schema};

/// Encodes an array, preceded by a uint32 LE count unless the field has a
/// fixed length (in which case the element count must match it).
pub fn encode_array(array: &ArrayField, value: &Value, data: &mut [u8], offset: usize) -> Result<usize> {
    let elements = value.as_array()?;
    let mut cursor = offset;

    match array.length {
        Some(expected) if expected != elements.len() => {
            return Err(Error::ArrayLengthMismatch {
                expected,
                actual: elements.len(),
            });
        }
        Some(_) => {}
        None => {
            let count = u32::try_from(elements.len()).map_err(|_| Error::ValueOutOfRange {
                expected: "uint32 element count".to_string(),
                value: elements.len().to_string(),
            })?;
            buffer::write_u32_le(data, count, cursor)?;
            cursor += LENGTH_PREFIX_LEN;
        }
    }

    for element in elements {
        cursor += match &array.element {
            ArrayElement::Schema(schema) => encode_record_into(schema, element.as_record()?, data, cursor)?,
            ArrayElement::Type(element_type) => encode_value(element_type, element, data, cursor)?,
        };
    }

    Ok(cursor - offset)
}

/// Encodes a uint32 LE length prefix followed by the payload.
///
/// With a nested schema the record is first encoded standalone to obtain its
/// bytes, then written length-prefixed.
pub fn encode_bytes_with_length(
    schema: Option<&Schema>,
    value: &Value,
    data: &mut [u8],
    offset: usize,
) -> Result<usize> {
    match schema {
        Some(schema) => {
            let (payload, _) = encode_record(schema, value.as_record()?)?;
            buffer::write_prefixed_bytes(data, &payload, offset)
        }
        None => buffer::write_prefixed_bytes(data, &value.to_byte_vec()?, offset),
    }
}

/// Encodes a `variabletype8`: the variant index byte, then the value as the
/// selected type.
pub fn encode_variable_type(types: &[FieldType], value: &Value, data: &mut [u8], offset: usize) -> Result<usize> {
    let (index, inner) = value.as_variant()?;
    let selected = FieldType::variant(types, index)?;
    buffer::write_u8(data, index, offset)?;
    Ok(1 + encode_value(selected, inner, data, offset + 1)?)
}
