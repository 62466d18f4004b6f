// Codec module: the three schema-driven passes (decode, size, encode)

pub mod config;
pub mod decode;
pub mod encode;
pub mod size;
pub mod types;

use tracing::debug;

use crate::codec::config::CodecConfig;
use crate::codec::types::{Record, Value};
use crate::internal::error::{Error, Result};
use crate::schema::types::{Field, Schema};

/// Resolves the value a field encodes from: the tree's value, else the
/// field's default, else `MissingField`.
pub(crate) fn resolve_field<'a>(field: &'a Field, record: &'a Record) -> Result<&'a Value> {
    record
        .get(&field.name)
        .or(field.default_value.as_ref())
        .ok_or_else(|| Error::MissingField {
            field: field.name.clone(),
        })
}

/// Schema-driven codec carrying a [`CodecConfig`].
///
/// ```
/// use dataschema::{Codec, Record, Schema};
///
/// let schema: Schema = r#"{"fields": [
///     {"name": "id", "type": "uint16"},
///     {"name": "name", "type": "string"}
/// ]}"#.parse().unwrap();
///
/// let codec = Codec::new();
/// let record = Record::new().with("id", 7u16).with("name", "hi");
/// let (data, written) = codec.encode(&schema, &record).unwrap();
/// assert_eq!(data, [0x07, 0x00, 0x02, 0x00, 0x00, 0x00, b'h', b'i']);
///
/// let (decoded, consumed) = codec.decode(&schema, &data, 0).unwrap();
/// assert_eq!(consumed, written);
/// assert_eq!(decoded, record);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    /// Creates a codec with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes one record of `schema` from `data` starting at `offset`.
    /// Returns the value tree and the number of bytes consumed.
    pub fn decode(&self, schema: &Schema, data: &[u8], offset: usize) -> Result<(Record, usize)> {
        debug!(fields = schema.fields.len(), offset, available = data.len(), "decode");
        let (record, consumed) = decode::decode_record(schema, data, offset, &self.config)?;
        debug!(consumed, "decoded");
        Ok((record, consumed))
    }

    /// Computes the number of bytes `record` encodes to under `schema`.
    pub fn size_of(&self, schema: &Schema, record: &Record) -> Result<usize> {
        let size = size::size_of_record(schema, record)?;
        debug!(fields = schema.fields.len(), size, "size_of");
        Ok(size)
    }

    /// Encodes `record` into a new buffer sized by [`Codec::size_of`].
    /// Returns the buffer and the number of bytes written.
    pub fn encode(&self, schema: &Schema, record: &Record) -> Result<(Vec<u8>, usize)> {
        let (data, written) = encode::encode_record(schema, record)?;
        debug!(fields = schema.fields.len(), written, "encode");
        Ok((data, written))
    }

    /// Encodes `record` into `data` at `offset` without allocating.
    /// Returns the number of bytes written.
    pub fn encode_into(&self, schema: &Schema, record: &Record, data: &mut [u8], offset: usize) -> Result<usize> {
        let written = encode::encode_record_into(schema, record, data, offset)?;
        debug!(fields = schema.fields.len(), offset, written, "encode_into");
        Ok(written)
    }
}

/// Decodes with the default configuration. See [`Codec::decode`].
pub fn decode(schema: &Schema, data: &[u8], offset: usize) -> Result<(Record, usize)> {
    Codec::new().decode(schema, data, offset)
}

/// Sizes with the default configuration. See [`Codec::size_of`].
pub fn size_of(schema: &Schema, record: &Record) -> Result<usize> {
    Codec::new().size_of(schema, record)
}

/// Encodes with the default configuration. See [`Codec::encode`].
pub fn encode(schema: &Schema, record: &Record) -> Result<(Vec<u8>, usize)> {
    Codec::new().encode(schema, record)
}

/// Encodes into a caller buffer. See [`Codec::encode_into`].
pub fn encode_into(schema: &Schema, record: &Record, data: &mut [u8], offset: usize) -> Result<usize> {
    Codec::new().encode_into(schema, record, data, offset)
}
