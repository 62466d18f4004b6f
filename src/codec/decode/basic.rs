use bytes::Bytes;

use crate::codec::config::CodecConfig;
use crate::codec::types::Value;
use crate::internal::buffer::{self, LENGTH_PREFIX_LEN};
use crate::internal::error::{Error, Result};
use crate::internal::int64::Int64;
use crate::schema::types::{FieldType, Flag};

/// Decodes a value of a basic (non-recursive) field type.
/// Returns the value and the number of bytes consumed.
pub fn decode_basic_value(
    field_type: &FieldType,
    data: &[u8],
    offset: usize,
    config: &CodecConfig,
) -> Result<(Value, usize)> {
    match field_type {
        FieldType::UInt8 => Ok((Value::U8(buffer::read_u8(data, offset)?), 1)),
        FieldType::Int8 => Ok((Value::I8(buffer::read_i8(data, offset)?), 1)),
        FieldType::UInt16 => Ok((Value::U16(buffer::read_u16_le(data, offset)?), 2)),
        FieldType::Int16 => Ok((Value::I16(buffer::read_i16_le(data, offset)?), 2)),
        FieldType::UInt32 => Ok((Value::U32(buffer::read_u32_le(data, offset)?), 4)),
        FieldType::Int32 => Ok((Value::I32(buffer::read_i32_le(data, offset)?), 4)),
        FieldType::UInt64 => decode_uint64(data, offset),
        FieldType::Float => Ok((Value::F32(buffer::read_f32_le(data, offset)?), 4)),
        FieldType::FloatVector2 | FieldType::FloatVector3 | FieldType::FloatVector4 => {
            let count = field_type.vector_len().unwrap_or_default();
            decode_float_vector(count, data, offset)
        }
        FieldType::Boolean => Ok((Value::Bool(buffer::read_u8(data, offset)? != 0), 1)),
        FieldType::BitFlags(flags) => decode_bitflags(flags, data, offset),
        FieldType::String => {
            let (text, length) = buffer::read_prefixed_string(data, offset, config.strict_utf8)?;
            Ok((Value::String(text), LENGTH_PREFIX_LEN + length))
        }
        FieldType::Bytes { length } => {
            let raw = buffer::read_bytes(data, offset, *length)?;
            Ok((Value::Bytes(Bytes::copy_from_slice(raw)), *length))
        }
        // Virtual: reports the cursor, occupies no bytes.
        FieldType::DebugOffset => Ok((Value::Offset(offset), 0)),
        // Captures the upcoming bytes without consuming them.
        FieldType::DebugBytes { length } => {
            let raw = buffer::read_bytes(data, offset, *length)?;
            Ok((Value::Bytes(Bytes::copy_from_slice(raw)), 0))
        }
        FieldType::Array(_) | FieldType::BytesWithLength { .. } | FieldType::VariableType8(_) => {
            Err(Error::UnsupportedType(format!(
                "{} is not a basic type",
                field_type.tag()
            )))
        }
    }
}

/// Two uint32 LE words, high word first.
fn decode_uint64(data: &[u8], offset: usize) -> Result<(Value, usize)> {
    let high = buffer::read_u32_le(data, offset)?;
    let low = buffer::read_u32_le(data, offset + 4)?;
    Ok((Value::U64(Int64::from_halves(high, low).value()), 8))
}

fn decode_float_vector(count: usize, data: &[u8], offset: usize) -> Result<(Value, usize)> {
    let floats = (0..count)
        .map(|i| buffer::read_f32_le(data, offset + i * 4).map(Value::F32))
        .collect::<Result<Vec<_>>>()?;
    Ok((Value::Array(floats), count * 4))
}

fn decode_bitflags(flags: &[Flag], data: &[u8], offset: usize) -> Result<(Value, usize)> {
    let byte = buffer::read_u8(data, offset)?;
    let states = flags
        .iter()
        .map(|flag| (flag.name.clone(), byte & flag.mask() != 0))
        .collect();
    Ok((Value::Flags(states), 1))
}
