//! Serializer Module
//!
//! Encodes cache values to bytes for the remote backend.

mod binary;
mod json;
pub mod registry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::value::CacheValue;

pub use binary::BinarySerializer;
pub use json::JsonSerializer;

// == Serializer Trait ==
/// Converts cache values to and from bytes.
///
/// Implement this to plug a custom format into
/// [`RedisCache`](crate::cache::RedisCache).
pub trait Serializer: Send + Sync + 'static {
    /// Short name of the format.
    fn name(&self) -> &'static str;

    /// Encodes `value`, preserving whether it is nil.
    fn encode<T: CacheValue>(&self, value: &T) -> Result<Vec<u8>>;

    /// Decodes `data` into `dest`.
    ///
    /// On error `dest` is left untouched.
    fn decode<T: CacheValue>(&self, data: &[u8], dest: &mut T) -> Result<()>;
}

// == Codec ==
/// Built-in serializer choice, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Type-preserving bincode frames
    #[default]
    Binary,
    /// Cross-readable JSON envelope
    Json,
}

impl Serializer for Codec {
    fn name(&self) -> &'static str {
        match self {
            Codec::Binary => BinarySerializer.name(),
            Codec::Json => JsonSerializer.name(),
        }
    }

    fn encode<T: CacheValue>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            Codec::Binary => BinarySerializer.encode(value),
            Codec::Json => JsonSerializer.encode(value),
        }
    }

    fn decode<T: CacheValue>(&self, data: &[u8], dest: &mut T) -> Result<()> {
        match self {
            Codec::Binary => BinarySerializer.decode(data, dest),
            Codec::Json => JsonSerializer.decode(data, dest),
        }
    }
}

impl FromStr for Codec {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bincode" | "gob" => Ok(Codec::Binary),
            "json" => Ok(Codec::Json),
            other => Err(CacheError::Config(format!("unknown serializer: {other}"))),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
