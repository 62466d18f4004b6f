// Schema type system for dataschema
//
// A schema is an ordered list of field descriptors. Each descriptor carries a
// closed `FieldType` whose variant decides the wire shape and sizing rule.

use std::fmt;
use std::str::FromStr;

use crate::codec::types::Value;
use crate::internal::error::{Error, Result};

/// The registry of type tags as they appear in schema definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Float,
    FloatVector2,
    FloatVector3,
    FloatVector4,
    Boolean,
    BitFlags,
    String,
    Bytes,
    BytesWithLength,
    Array,
    VariableType8,
    DebugOffset,
    DebugBytes,
}

impl TypeTag {
    pub const ALL: [TypeTag; 20] = [
        TypeTag::UInt8,
        TypeTag::Int8,
        TypeTag::UInt16,
        TypeTag::Int16,
        TypeTag::UInt32,
        TypeTag::Int32,
        TypeTag::UInt64,
        TypeTag::Float,
        TypeTag::FloatVector2,
        TypeTag::FloatVector3,
        TypeTag::FloatVector4,
        TypeTag::Boolean,
        TypeTag::BitFlags,
        TypeTag::String,
        TypeTag::Bytes,
        TypeTag::BytesWithLength,
        TypeTag::Array,
        TypeTag::VariableType8,
        TypeTag::DebugOffset,
        TypeTag::DebugBytes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::UInt8 => "uint8",
            TypeTag::Int8 => "int8",
            TypeTag::UInt16 => "uint16",
            TypeTag::Int16 => "int16",
            TypeTag::UInt32 => "uint32",
            TypeTag::Int32 => "int32",
            TypeTag::UInt64 => "uint64",
            TypeTag::Float => "float",
            TypeTag::FloatVector2 => "floatvector2",
            TypeTag::FloatVector3 => "floatvector3",
            TypeTag::FloatVector4 => "floatvector4",
            TypeTag::Boolean => "boolean",
            TypeTag::BitFlags => "bitflags",
            TypeTag::String => "string",
            TypeTag::Bytes => "bytes",
            TypeTag::BytesWithLength => "byteswithlength",
            TypeTag::Array => "array",
            TypeTag::VariableType8 => "variabletype8",
            TypeTag::DebugOffset => "debugoffset",
            TypeTag::DebugBytes => "debugbytes",
        }
    }

    /// Encoded size for tags whose size does not depend on the value.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            TypeTag::UInt8 | TypeTag::Int8 | TypeTag::Boolean | TypeTag::BitFlags => Some(1),
            TypeTag::UInt16 | TypeTag::Int16 => Some(2),
            TypeTag::UInt32 | TypeTag::Int32 | TypeTag::Float => Some(4),
            TypeTag::UInt64 | TypeTag::FloatVector2 => Some(8),
            TypeTag::FloatVector3 => Some(12),
            TypeTag::FloatVector4 => Some(16),
            TypeTag::DebugOffset | TypeTag::DebugBytes => Some(0),
            TypeTag::String
            | TypeTag::Bytes
            | TypeTag::BytesWithLength
            | TypeTag::Array
            | TypeTag::VariableType8 => None,
        }
    }

    /// Decode-only tags with no encode counterpart.
    pub fn is_debug(&self) -> bool {
        matches!(self, TypeTag::DebugOffset | TypeTag::DebugBytes)
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| Error::UnsupportedType(s.to_string()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named bit of a `bitflags` byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub name: String,
    /// Bit position, 0-7.
    pub bit: u8,
}

impl Flag {
    pub fn new(name: impl Into<String>, bit: u8) -> Self {
        Self {
            name: name.into(),
            bit,
        }
    }

    pub fn mask(&self) -> u8 {
        1 << self.bit
    }
}

/// How array elements are laid out.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    /// Each element is a record of this schema.
    Schema(Schema),
    /// Each element is a single value of this type.
    Type(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayField {
    pub element: ArrayElement,
    /// Fixed element count; when absent a uint32 LE count prefix is used.
    pub length: Option<usize>,
    /// Decode-only override of the element count.
    pub debug_length: Option<usize>,
}

impl ArrayField {
    pub fn counted(element: ArrayElement) -> Self {
        Self {
            element,
            length: None,
            debug_length: None,
        }
    }

    pub fn fixed(element: ArrayElement, length: usize) -> Self {
        Self {
            element,
            length: Some(length),
            debug_length: None,
        }
    }
}

/// The type of a field together with its type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Float,
    FloatVector2,
    FloatVector3,
    FloatVector4,
    Boolean,
    BitFlags(Vec<Flag>),
    String,
    Bytes { length: usize },
    BytesWithLength { schema: Option<Box<Schema>> },
    Array(ArrayField),
    VariableType8(Vec<FieldType>),
    DebugOffset,
    DebugBytes { length: usize },
}

impl FieldType {
    pub fn tag(&self) -> TypeTag {
        match self {
            FieldType::UInt8 => TypeTag::UInt8,
            FieldType::Int8 => TypeTag::Int8,
            FieldType::UInt16 => TypeTag::UInt16,
            FieldType::Int16 => TypeTag::Int16,
            FieldType::UInt32 => TypeTag::UInt32,
            FieldType::Int32 => TypeTag::Int32,
            FieldType::UInt64 => TypeTag::UInt64,
            FieldType::Float => TypeTag::Float,
            FieldType::FloatVector2 => TypeTag::FloatVector2,
            FieldType::FloatVector3 => TypeTag::FloatVector3,
            FieldType::FloatVector4 => TypeTag::FloatVector4,
            FieldType::Boolean => TypeTag::Boolean,
            FieldType::BitFlags(_) => TypeTag::BitFlags,
            FieldType::String => TypeTag::String,
            FieldType::Bytes { .. } => TypeTag::Bytes,
            FieldType::BytesWithLength { .. } => TypeTag::BytesWithLength,
            FieldType::Array(_) => TypeTag::Array,
            FieldType::VariableType8(_) => TypeTag::VariableType8,
            FieldType::DebugOffset => TypeTag::DebugOffset,
            FieldType::DebugBytes { .. } => TypeTag::DebugBytes,
        }
    }

    pub fn is_debug(&self) -> bool {
        self.tag().is_debug()
    }

    /// Encoded size when it does not depend on the value.
    ///
    /// Unlike [`TypeTag::fixed_size`] this accounts for parameters, so
    /// `bytes` with a declared length is fixed.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldType::Bytes { length } => Some(*length),
            other => other.tag().fixed_size(),
        }
    }

    /// Number of floats in a `floatvectorN`, if this is one.
    pub fn vector_len(&self) -> Option<usize> {
        match self {
            FieldType::FloatVector2 => Some(2),
            FieldType::FloatVector3 => Some(3),
            FieldType::FloatVector4 => Some(4),
            _ => None,
        }
    }

    /// Looks up the type selected by a `variabletype8` tag byte.
    pub fn variant(types: &[FieldType], index: u8) -> Result<&FieldType> {
        types.get(index as usize).ok_or(Error::InvalidVariant {
            index,
            variants: types.len(),
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tag(), f)
    }
}

/// A field descriptor: one entry of a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Key of this field in the value tree.
    pub name: String,
    pub field_type: FieldType,
    /// Used by the size calculator and encoder when the tree lacks the key.
    pub default_value: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// An ordered sequence of field descriptors describing a byte layout.
///
/// Schemas are read-only during every codec call and can be shared freely
/// between threads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The schema with no fields; encodes to zero bytes.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Encoded size of the whole schema when no field depends on its value.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields
            .iter()
            .map(|f| f.field_type.fixed_size())
            .sum()
    }
}
