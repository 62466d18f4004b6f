// JSON schema definition parser for dataschema
//
// Converts authored schema definitions into typed `Schema` values:
//
//   { "fields": [ { "name": "id", "type": "uint32" },
//                 { "name": "items", "type": "array", "elementType": "uint16" } ] }
//
// Descriptor keys are camelCase as in existing definitions: `length`,
// `debuglength`, `elementType`, `elementSchema`, `schema`, `types`, `flags`,
// `defaultValue`. `elementType` and `types` entries may be bare type tags or
// full descriptor objects.

use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};

use crate::internal::error::{Error, Result};
use crate::schema::mapper;
use crate::schema::types::{ArrayElement, ArrayField, Field, FieldType, Flag, Schema, TypeTag};
use crate::schema::utils::{json_kind, json_to_integer};

type JsonObject = Map<String, JsonValue>;

/// Parser for JSON schema definitions
#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    /// Creates a new schema parser
    pub fn new() -> Self {
        Self
    }

    /// Parses a schema object. A schema without `fields` is the empty schema.
    pub fn parse_schema(&self, json: &JsonValue) -> Result<Schema> {
        let obj = match json {
            JsonValue::Object(obj) => obj,
            other => {
                return Err(Error::InvalidSchema(format!(
                    "Schema must be a JSON object, got {}",
                    json_kind(other)
                )))
            }
        };

        let fields = match obj.get("fields") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| self.parse_field(item))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(Error::InvalidSchema(format!(
                    "'fields' must be an array, got {}",
                    json_kind(other)
                )))
            }
        };

        Ok(Schema::new(fields))
    }

    /// Parses one field descriptor.
    pub fn parse_field(&self, json: &JsonValue) -> Result<Field> {
        let obj = json.as_object().ok_or_else(|| {
            Error::InvalidSchema(format!("Field descriptor must be an object, got {}", json_kind(json)))
        })?;

        let name = self.get_string_field(obj, "name")?;
        let field_type = self.parse_field_type(obj, &name)?;

        let default_value = match obj.get("defaultValue") {
            Some(default_json) => Some(mapper::value_from_json(&field_type, default_json).map_err(|e| {
                Error::InvalidSchema(format!("Invalid defaultValue for field '{}': {}", name, e))
            })?),
            None => None,
        };

        Ok(Field {
            name,
            field_type,
            default_value,
        })
    }

    /// Parses the `type` tag of a descriptor object and its parameters.
    fn parse_field_type(&self, obj: &JsonObject, name: &str) -> Result<FieldType> {
        let tag = TypeTag::from_str(&self.get_string_field(obj, "type")?)?;

        let field_type = match tag {
            TypeTag::UInt8 => FieldType::UInt8,
            TypeTag::Int8 => FieldType::Int8,
            TypeTag::UInt16 => FieldType::UInt16,
            TypeTag::Int16 => FieldType::Int16,
            TypeTag::UInt32 => FieldType::UInt32,
            TypeTag::Int32 => FieldType::Int32,
            TypeTag::UInt64 => FieldType::UInt64,
            TypeTag::Float => FieldType::Float,
            TypeTag::FloatVector2 => FieldType::FloatVector2,
            TypeTag::FloatVector3 => FieldType::FloatVector3,
            TypeTag::FloatVector4 => FieldType::FloatVector4,
            TypeTag::Boolean => FieldType::Boolean,
            TypeTag::String => FieldType::String,
            TypeTag::DebugOffset => FieldType::DebugOffset,
            TypeTag::BitFlags => FieldType::BitFlags(self.parse_flags(obj, name)?),
            TypeTag::Bytes => FieldType::Bytes {
                length: self.require_length(obj, name, tag)?,
            },
            TypeTag::DebugBytes => FieldType::DebugBytes {
                length: self.require_length(obj, name, tag)?,
            },
            TypeTag::BytesWithLength => FieldType::BytesWithLength {
                schema: match obj.get("schema") {
                    Some(schema_json) => Some(Box::new(self.parse_schema(schema_json)?)),
                    None => None,
                },
            },
            TypeTag::Array => FieldType::Array(self.parse_array(obj, name)?),
            TypeTag::VariableType8 => {
                let types = match obj.get("types") {
                    Some(JsonValue::Array(items)) => items
                        .iter()
                        .map(|item| self.parse_type_ref(item, name))
                        .collect::<Result<Vec<_>>>()?,
                    _ => {
                        return Err(Error::InvalidSchema(format!(
                            "Field '{}': variabletype8 requires a 'types' array",
                            name
                        )))
                    }
                };
                FieldType::VariableType8(types)
            }
        };

        Ok(field_type)
    }

    fn parse_array(&self, obj: &JsonObject, name: &str) -> Result<ArrayField> {
        let element = if let Some(schema_json) = obj.get("elementSchema") {
            ArrayElement::Schema(self.parse_schema(schema_json)?)
        } else if let Some(type_json) = obj.get("elementType") {
            ArrayElement::Type(Box::new(self.parse_type_ref(type_json, name)?))
        } else {
            return Err(Error::InvalidArraySchema {
                field: name.to_string(),
            });
        };

        Ok(ArrayField {
            element,
            length: self.get_usize_field(obj, "length")?,
            debug_length: self.get_usize_field(obj, "debuglength")?,
        })
    }

    /// Parses an element or variant type: a bare tag or a descriptor object.
    fn parse_type_ref(&self, json: &JsonValue, name: &str) -> Result<FieldType> {
        match json {
            JsonValue::String(tag) => {
                let mut obj = JsonObject::new();
                obj.insert("type".to_string(), JsonValue::String(tag.clone()));
                self.parse_field_type(&obj, name)
            }
            JsonValue::Object(obj) => self.parse_field_type(obj, name),
            other => Err(Error::InvalidSchema(format!(
                "Field '{}': type must be a tag or descriptor object, got {}",
                name,
                json_kind(other)
            ))),
        }
    }

    fn parse_flags(&self, obj: &JsonObject, name: &str) -> Result<Vec<Flag>> {
        let items = match obj.get("flags") {
            Some(JsonValue::Array(items)) => items,
            _ => {
                return Err(Error::InvalidSchema(format!(
                    "Field '{}': bitflags requires a 'flags' array",
                    name
                )))
            }
        };

        items
            .iter()
            .map(|item| {
                let flag_obj = item.as_object().ok_or_else(|| {
                    Error::InvalidSchema(format!("Field '{}': flag must be an object", name))
                })?;
                let flag_name = self.get_string_field(flag_obj, "name")?;
                let bit: u8 = flag_obj
                    .get("bit")
                    .ok_or_else(|| Error::InvalidSchema(format!("Flag '{}' is missing 'bit'", flag_name)))
                    .and_then(|bit| json_to_integer(bit, "bit position"))?;
                if bit > 7 {
                    return Err(Error::InvalidSchema(format!(
                        "Flag '{}' bit {} is outside 0-7",
                        flag_name, bit
                    )));
                }
                Ok(Flag::new(flag_name, bit))
            })
            .collect()
    }

    fn require_length(&self, obj: &JsonObject, name: &str, tag: TypeTag) -> Result<usize> {
        self.get_usize_field(obj, "length")?.ok_or_else(|| {
            Error::InvalidSchema(format!("Field '{}': {} requires 'length'", name, tag))
        })
    }

    fn get_string_field(&self, obj: &JsonObject, field: &str) -> Result<String> {
        match obj.get(field) {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(Error::InvalidSchema(format!("Field '{}' must be a string", field))),
            None => Err(Error::InvalidSchema(format!("Missing required field '{}'", field))),
        }
    }

    fn get_usize_field(&self, obj: &JsonObject, field: &str) -> Result<Option<usize>> {
        match obj.get(field) {
            Some(value) => json_to_integer(value, field)
                .map(Some)
                .map_err(|e| Error::InvalidSchema(format!("Invalid '{}': {}", field, e))),
            None => Ok(None),
        }
    }
}

impl Schema {
    /// Parses a schema from a JSON value. See [`SchemaParser`].
    pub fn from_json(json: &JsonValue) -> Result<Schema> {
        SchemaParser::new().parse_schema(json)
    }

    /// Parses a schema from JSON text.
    pub fn from_json_str(s: &str) -> Result<Schema> {
        let json: JsonValue = serde_json::from_str(s)?;
        Self::from_json(&json)
    }
}

impl FromStr for Schema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Schema::from_json_str(s)
    }
}
