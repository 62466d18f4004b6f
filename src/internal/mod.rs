// Internal utilities shared by the schema and codec modules

pub mod buffer;
pub mod error;
pub mod int64;
