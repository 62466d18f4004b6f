use thiserror::Error;

/// Unified error type for the dataschema library.
#[derive(Error, Debug)]
pub enum Error {
    /// A schema field has no value in the tree and no declared default.
    #[error("Missing Field: '{field}' not found in value tree and no default value")]
    MissingField { field: String },

    /// A field descriptor names a type tag outside the registry.
    #[error("Unsupported Type: '{0}'")]
    UnsupportedType(String),

    /// A buffer read or write ran past the end of the buffer.
    #[error("Out Of Bounds: {length} bytes at offset {offset}, buffer holds {available}")]
    OutOfBounds {
        offset: usize,
        length: usize,
        available: usize,
    },

    /// An array descriptor has neither `elementSchema` nor `elementType`.
    #[error("Invalid Array Schema: field '{field}' has neither elementSchema nor elementType")]
    InvalidArraySchema { field: String },

    /// A schema definition is malformed.
    #[error("Invalid Schema: {0}")]
    InvalidSchema(String),

    /// A value cannot be written as the field's type.
    #[error("Type Mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A numeric value does not fit the field's width.
    #[error("Value Out Of Range: {value} does not fit {expected}")]
    ValueOutOfRange { expected: String, value: String },

    /// A `variabletype8` tag selects no entry of the field's `types`.
    #[error("Invalid Variant: index {index} but only {variants} types declared")]
    InvalidVariant { index: u8, variants: usize },

    /// A fixed-length array was given a different number of elements.
    #[error("Array Length Mismatch: expected {expected} elements, got {actual}")]
    ArrayLengthMismatch { expected: usize, actual: usize },

    /// An element count read from the wire exceeds the configured limit.
    #[error("Array Too Long: {count} elements exceeds limit of {limit}")]
    ArrayTooLong { count: usize, limit: usize },

    /// A `string` payload is not valid UTF-8.
    #[error("Invalid String: {0}")]
    InvalidString(String),

    /// A 64-bit value could not be parsed from its decimal form.
    #[error("Invalid UInt64: '{0}'")]
    InvalidUInt64(String),

    /// A schema or value document could not be read as JSON.
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for dataschema operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/*
Panic policy:

Recoverable failures (bad data, bad schema, missing values) are returned as
Result<T, Error> and propagated with `?` up to the top-level decode/size/encode
call. Nothing inside the library catches and retries; a failure means the
caller gets no partial value tree or buffer. Panics are reserved for
programming errors inside the crate.
*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::MissingField { field: "x".to_string() };
        assert_eq!(
            err.to_string(),
            "Missing Field: 'x' not found in value tree and no default value"
        );

        let err = Error::OutOfBounds { offset: 6, length: 4, available: 8 };
        assert_eq!(err.to_string(), "Out Of Bounds: 4 bytes at offset 6, buffer holds 8");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("Json Error:"));
    }
}
