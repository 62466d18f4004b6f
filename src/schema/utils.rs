// Utility functions for the schema module
//
// Shared by the parser (descriptor parameters) and the mapper (JSON values).

use serde_json::Value as JsonValue;

use crate::internal::error::{Error, Result};

/// Reads a JSON number as an integer of type `T`, checking its range.
///
/// Floats with no fractional part are accepted, since JSON writers often
/// emit `3.0` for `3`.
pub fn json_to_integer<T>(json: &JsonValue, expected: &str) -> Result<T>
where
    T: TryFrom<i128>,
{
    let wide: i128 = if let Some(v) = json.as_i64() {
        v as i128
    } else if let Some(v) = json.as_u64() {
        v as i128
    } else if let Some(v) = json.as_f64().filter(|v| v.fract() == 0.0 && v.is_finite()) {
        // Saturating cast; out-of-range values are caught below.
        v as i128
    } else {
        return Err(Error::type_mismatch(expected, json_kind(json)));
    };

    T::try_from(wide).map_err(|_| Error::ValueOutOfRange {
        expected: expected.to_string(),
        value: json.to_string(),
    })
}

/// Short name of a JSON value's kind, used in error messages.
pub fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
