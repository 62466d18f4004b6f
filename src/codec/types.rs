use bytes::Bytes;

use crate::internal::error::{Error, Result};
use crate::internal::int64::Int64;

/// A node of the value tree produced by the decoder and consumed by the
/// size calculator and encoder.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    String(String),
    Bytes(Bytes),
    /// Array elements, also used for `floatvector2/3/4`.
    Array(Vec<Value>),
    /// A nested record (array element schemas, `byteswithlength` schemas).
    Object(Record),
    /// `bitflags`: flag name to state, in the field's flag order.
    Flags(Vec<(String, bool)>),
    /// `variabletype8`: index into the field's `types` and the value of that type.
    Variant { index: u8, value: Box<Value> },
    /// `debugoffset`: absolute cursor position at the field.
    Offset(usize),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::F32(_) => "f32",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Flags(_) => "flags",
            Value::Variant { .. } => "variant",
            Value::Offset(_) => "offset",
        }
    }

    /// Integer view of the value as a wide signed integer.
    ///
    /// `U64` values above `i64::MAX` are still representable through `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::U8(v) => Some(*v as i128),
            Value::U16(v) => Some(*v as i128),
            Value::U32(v) => Some(*v as i128),
            Value::U64(v) => Some(*v as i128),
            Value::I8(v) => Some(*v as i128),
            Value::I16(v) => Some(*v as i128),
            Value::I32(v) => Some(*v as i128),
            Value::Offset(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// Converts the value to an integer of type `T`, checking the range.
    pub fn to_int<T>(&self, expected: &str) -> Result<T>
    where
        T: TryFrom<i128>,
    {
        let wide = self
            .as_integer()
            .ok_or_else(|| Error::type_mismatch(expected, self.kind()))?;
        T::try_from(wide).map_err(|_| Error::ValueOutOfRange {
            expected: expected.to_string(),
            value: wide.to_string(),
        })
    }

    /// Converts the value to a 64-bit integer, accepting the decimal string form.
    pub fn to_int64(&self) -> Result<Int64> {
        match self {
            Value::String(s) => s.parse(),
            other => other.to_int::<u64>("uint64").map(Int64::new),
        }
    }

    pub fn to_f32(&self) -> Result<f32> {
        match self {
            Value::F32(v) => Ok(*v),
            other => other
                .as_integer()
                .map(|v| v as f32)
                .ok_or_else(|| Error::type_mismatch("float", other.kind())),
        }
    }

    /// Truthiness used by `boolean` fields: booleans as-is, integers nonzero.
    pub fn to_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => other
                .as_integer()
                .map(|v| v != 0)
                .ok_or_else(|| Error::type_mismatch("boolean", other.kind())),
        }
    }

    /// Raw byte view for `bytes`/`byteswithlength` fields.
    ///
    /// Accepts byte blobs, text (as UTF-8) and arrays of byte-sized integers.
    pub fn to_byte_vec(&self) -> Result<Bytes> {
        match self {
            Value::Bytes(b) => Ok(b.clone()),
            Value::String(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.to_int::<u8>("byte"))
                .collect::<Result<Vec<u8>>>()
                .map(Bytes::from),
            other => Err(Error::type_mismatch("bytes", other.kind())),
        }
    }

    /// Length in bytes that [`Value::to_byte_vec`] would produce.
    pub fn byte_len(&self) -> Result<usize> {
        match self {
            Value::Bytes(b) => Ok(b.len()),
            Value::String(s) => Ok(s.len()),
            Value::Array(items) => {
                for item in items {
                    item.to_int::<u8>("byte")?;
                }
                Ok(items.len())
            }
            other => Err(Error::type_mismatch("bytes", other.kind())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::type_mismatch("string", other.kind())),
        }
    }

    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(Error::type_mismatch("array", other.kind())),
        }
    }

    pub fn as_record(&self) -> Result<&Record> {
        match self {
            Value::Object(record) => Ok(record),
            other => Err(Error::type_mismatch("object", other.kind())),
        }
    }

    /// Returns the state of flag `name`; unlisted flags read as unset.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self {
            Value::Flags(flags) => Ok(flags
                .iter()
                .find(|(flag, _)| flag == name)
                .map(|(_, set)| *set)
                .unwrap_or(false)),
            Value::Object(record) => record.get(name).map(Value::to_bool).unwrap_or(Ok(false)),
            other => Err(Error::type_mismatch("bitflags", other.kind())),
        }
    }

    pub fn as_variant(&self) -> Result<(u8, &Value)> {
        match self {
            Value::Variant { index, value } => Ok((*index, value)),
            other => Err(Error::type_mismatch("variant", other.kind())),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::I8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Object(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

/// One level of the value tree: field name to value, in schema order.
///
/// Each name appears at most once; inserting an existing name replaces its
/// value in place.
///
/// Entries live in a `Vec` and lookups scan it, so `insert` and `get` are
/// linear in the number of fields and building an N-field record is O(N²).
/// Records are one schema level wide (packet-sized); schemas with hundreds of
/// fields per level would want an index here.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
