// dataschema library entry point
//
// A `Schema` describes a little-endian byte layout as an ordered list of typed
// fields. The codec decodes a buffer into a `Record` value tree, computes the
// encoded length of a tree, and encodes a tree back into bytes.

pub mod codec;
pub mod internal;
pub mod schema;

pub use crate::codec::config::CodecConfig;
pub use crate::codec::types::{Record, Value};
pub use crate::codec::{decode, encode, encode_into, size_of, Codec};
pub use crate::internal::error::{Error, Result};
pub use crate::schema::{Field, FieldType, Schema};
