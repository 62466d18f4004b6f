// Size calculator: schema + value tree -> encoded byte length.
//
// Must agree exactly with what the encoder writes for the same tree, since
// the encoder sizes its buffer from this result before writing anything.

use tracing::trace;

use crate::codec::encode::basic;
use crate::codec::resolve_field;
use crate::codec::types::{Record, Value};
use crate::internal::buffer::LENGTH_PREFIX_LEN;
use crate::internal::error::{Error, Result};
use crate::schema::types::{ArrayElement, ArrayField, FieldType, Schema};

/// Computes the encoded length of `record` against `schema`.
///
/// Debug fields occupy no bytes and are not looked up.
pub fn size_of_record(schema: &Schema, record: &Record) -> Result<usize> {
    let mut total = 0;
    for field in &schema.fields {
        if field.field_type.is_debug() {
            continue;
        }
        let value = resolve_field(field, record)?;
        let size = size_of_value(&field.field_type, value)?;
        trace!(field = %field.name, field_type = %field.field_type, size, "sized field");
        total += size;
    }
    Ok(total)
}

/// Computes the encoded length of a single value of `field_type`.
pub fn size_of_value(field_type: &FieldType, value: &Value) -> Result<usize> {
    if let Some(size) = field_type.fixed_size() {
        // Width is known, but the value must still be encodable.
        basic::check_basic_value(field_type, value)?;
        return Ok(size);
    }

    match field_type {
        FieldType::String => Ok(LENGTH_PREFIX_LEN + value.as_str()?.len()),
        FieldType::BytesWithLength { schema: Some(schema) } => {
            Ok(LENGTH_PREFIX_LEN + size_of_record(schema, value.as_record()?)?)
        }
        FieldType::BytesWithLength { schema: None } => Ok(LENGTH_PREFIX_LEN + value.byte_len()?),
        FieldType::Array(array) => size_of_array(array, value.as_array()?),
        FieldType::VariableType8(types) => {
            // Only the selected variant contributes.
            let (index, inner) = value.as_variant()?;
            let selected = FieldType::variant(types, index)?;
            Ok(1 + size_of_value(selected, inner)?)
        }
        other => Err(Error::UnsupportedType(format!(
            "{} has no variable-size rule",
            other.tag()
        ))),
    }
}

fn size_of_array(array: &ArrayField, elements: &[Value]) -> Result<usize> {
    let prefix = match array.length {
        Some(expected) if expected != elements.len() => {
            return Err(Error::ArrayLengthMismatch {
                expected,
                actual: elements.len(),
            });
        }
        Some(_) => 0,
        None => LENGTH_PREFIX_LEN,
    };

    let mut total = prefix;
    for element in elements {
        total += match &array.element {
            ArrayElement::Schema(schema) => size_of_record(schema, element.as_record()?)?,
            ArrayElement::Type(element_type) => size_of_value(element_type, element)?,
        };
    }
    Ok(total)
}
