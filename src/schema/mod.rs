// Schema module for dataschema
//
// This module provides the schema grammar the codec interprets:
//
// 1. Typed schema and field descriptors with a closed field-type registry
// 2. JSON schema definition parser
// 3. JSON <-> value tree mapping guided by a schema

// Re-export public types and functions
pub use self::types::{ArrayElement, ArrayField, Field, FieldType, Flag, Schema, TypeTag};
pub use self::parser::SchemaParser;
pub use self::mapper::{record_from_json, record_to_json, value_from_json, value_to_json};

// Sub-modules
pub mod types;
pub mod parser;
pub mod mapper;

// Internal module for shared utilities
mod utils;
