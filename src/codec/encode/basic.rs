use crate::codec::types::Value;
use crate::internal::buffer;
use crate::internal::error::{Error, Result};
use crate::schema::types::{FieldType, Flag};

/// Encodes a value of a basic (non-recursive) field type at `offset`.
/// Returns the number of bytes written.
pub fn encode_basic_value(field_type: &FieldType, value: &Value, data: &mut [u8], offset: usize) -> Result<usize> {
    match field_type {
        FieldType::UInt8 => {
            buffer::write_u8(data, value.to_int("uint8")?, offset)?;
            Ok(1)
        }
        FieldType::Int8 => {
            buffer::write_i8(data, value.to_int("int8")?, offset)?;
            Ok(1)
        }
        FieldType::UInt16 => {
            buffer::write_u16_le(data, value.to_int("uint16")?, offset)?;
            Ok(2)
        }
        FieldType::Int16 => {
            buffer::write_i16_le(data, value.to_int("int16")?, offset)?;
            Ok(2)
        }
        FieldType::UInt32 => {
            buffer::write_u32_le(data, value.to_int("uint32")?, offset)?;
            Ok(4)
        }
        FieldType::Int32 => {
            buffer::write_i32_le(data, value.to_int("int32")?, offset)?;
            Ok(4)
        }
        FieldType::UInt64 => {
            // High word first.
            let int64 = value.to_int64()?;
            buffer::write_u32_le(data, int64.high32(), offset)?;
            buffer::write_u32_le(data, int64.low32(), offset + 4)?;
            Ok(8)
        }
        FieldType::Float => {
            buffer::write_f32_le(data, value.to_f32()?, offset)?;
            Ok(4)
        }
        FieldType::FloatVector2 | FieldType::FloatVector3 | FieldType::FloatVector4 => {
            let count = field_type.vector_len().unwrap_or_default();
            encode_float_vector(count, value, data, offset)
        }
        FieldType::Boolean => {
            buffer::write_u8(data, value.to_bool()? as u8, offset)?;
            Ok(1)
        }
        FieldType::BitFlags(flags) => {
            buffer::write_u8(data, pack_flags(flags, value)?, offset)?;
            Ok(1)
        }
        FieldType::String => buffer::write_prefixed_string(data, value.as_str()?, offset),
        FieldType::Bytes { length } => {
            let raw = value.to_byte_vec()?;
            buffer::write_bytes(data, &raw, offset, Some(*length))
        }
        FieldType::DebugOffset | FieldType::DebugBytes { .. } => Ok(0),
        FieldType::Array(_) | FieldType::BytesWithLength { .. } | FieldType::VariableType8(_) => {
            Err(Error::UnsupportedType(format!(
                "{} is not a basic type",
                field_type.tag()
            )))
        }
    }
}

/// Runs the value checks [`encode_basic_value`] performs, without writing.
///
/// The size calculator calls this for fixed-width fields so both passes
/// reject the same trees.
pub fn check_basic_value(field_type: &FieldType, value: &Value) -> Result<()> {
    match field_type {
        FieldType::UInt8 => value.to_int::<u8>("uint8").map(|_| ()),
        FieldType::Int8 => value.to_int::<i8>("int8").map(|_| ()),
        FieldType::UInt16 => value.to_int::<u16>("uint16").map(|_| ()),
        FieldType::Int16 => value.to_int::<i16>("int16").map(|_| ()),
        FieldType::UInt32 => value.to_int::<u32>("uint32").map(|_| ()),
        FieldType::Int32 => value.to_int::<i32>("int32").map(|_| ()),
        FieldType::UInt64 => value.to_int64().map(|_| ()),
        FieldType::Float => value.to_f32().map(|_| ()),
        FieldType::FloatVector2 | FieldType::FloatVector3 | FieldType::FloatVector4 => {
            let count = field_type.vector_len().unwrap_or_default();
            for item in float_vector_items(count, value)? {
                item.to_f32()?;
            }
            Ok(())
        }
        FieldType::Boolean => value.to_bool().map(|_| ()),
        FieldType::BitFlags(flags) => pack_flags(flags, value).map(|_| ()),
        FieldType::String => value.as_str().map(|_| ()),
        FieldType::Bytes { .. } => value.byte_len().map(|_| ()),
        FieldType::DebugOffset | FieldType::DebugBytes { .. } => Ok(()),
        FieldType::Array(_) | FieldType::BytesWithLength { .. } | FieldType::VariableType8(_) => {
            Err(Error::UnsupportedType(format!(
                "{} is not a basic type",
                field_type.tag()
            )))
        }
    }
}

fn float_vector_items(count: usize, value: &Value) -> Result<&[Value]> {
    let items = value.as_array()?;
    if items.len() != count {
        return Err(Error::type_mismatch(
            format!("floatvector{}", count),
            format!("array of {} elements", items.len()),
        ));
    }
    Ok(items)
}

fn encode_float_vector(count: usize, value: &Value, data: &mut [u8], offset: usize) -> Result<usize> {
    let items = float_vector_items(count, value)?;
    for (i, item) in items.iter().enumerate() {
        buffer::write_f32_le(data, item.to_f32()?, offset + i * 4)?;
    }
    Ok(count * 4)
}

/// Packs named booleans into one byte; unlisted bits stay zero.
fn pack_flags(flags: &[Flag], value: &Value) -> Result<u8> {
    let mut byte = 0u8;
    for flag in flags {
        if value.flag(&flag.name)? {
            byte |= flag.mask();
        }
    }
    Ok(byte)
}
