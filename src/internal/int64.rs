// 64-bit integer helper for the `uint64` field type.
//
// On the wire a `uint64` is two uint32 LE words, high word first. In the
// value tree it is carried whole; its text form is the decimal string.

use std::fmt;
use std::str::FromStr;

use crate::internal::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Int64(u64);

impl Int64 {
    pub fn new(value: u64) -> Self {
        Int64(value)
    }

    /// Builds the value from its two 32-bit halves.
    pub fn from_halves(high: u32, low: u32) -> Self {
        Int64(((high as u64) << 32) | low as u64)
    }

    pub fn high32(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn low32(&self) -> u32 {
        self.0 as u32
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Int64 {
    fn from(value: u64) -> Self {
        Int64(value)
    }
}

impl FromStr for Int64 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Int64)
            .map_err(|_| Error::InvalidUInt64(s.to_string()))
    }
}

impl fmt::Display for Int64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
