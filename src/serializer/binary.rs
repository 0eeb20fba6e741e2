//! Binary Serializer Module
//!
//! Type-preserving bincode codec. Each blob is a frame carrying the
//! concrete type name, so a decode into the wrong type fails instead of
//! coercing. The frame layout is internal and not a stability contract.

use std::any::type_name;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};
use crate::serializer::{registry, Serializer};
use crate::value::{assign, assign_nil, CacheValue};

#[derive(Debug, Serialize, Deserialize)]
enum Frame {
    /// A nil-shaped value of the named type
    Nil { type_name: String },
    /// A bincode payload of the named type
    Value { type_name: String, payload: Vec<u8> },
}

// == Binary Serializer ==
/// Bincode-backed serializer that round-trips exact Rust types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySerializer;

fn encode_error(name: &str, err: bincode::Error) -> CacheError {
    match *err {
        bincode::ErrorKind::SequenceMustHaveLength => CacheError::UnsupportedType {
            type_name: name.to_string(),
            reason: "sequence length must be known up front".to_string(),
        },
        other => CacheError::Codec(format!("binary encode error: {other}")),
    }
}

impl Serializer for BinarySerializer {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn encode<T: CacheValue>(&self, value: &T) -> Result<Vec<u8>> {
        let name = type_name::<T>();

        let frame = if value.is_nil() {
            Frame::Nil {
                type_name: name.to_string(),
            }
        } else {
            registry::register::<T>();
            let payload = bincode::serialize(value).map_err(|e| encode_error(name, e))?;
            Frame::Value {
                type_name: name.to_string(),
                payload,
            }
        };

        bincode::serialize(&frame).map_err(|e| encode_error(name, e))
    }

    fn decode<T: CacheValue>(&self, data: &[u8], dest: &mut T) -> Result<()> {
        let frame: Frame = bincode::deserialize(data)
            .map_err(|e| CacheError::Codec(format!("binary decode error: {e}")))?;

        match frame {
            Frame::Nil { .. } => assign_nil(dest),
            Frame::Value {
                type_name: got,
                payload,
            } => {
                registry::register::<T>();
                let rebuild = registry::lookup(&got)
                    .ok_or_else(|| CacheError::type_mismatch(type_name::<T>(), got.as_str()))?;
                let value = rebuild(&payload)
                    .map_err(|e| CacheError::Codec(format!("binary decode error: {e}")))?;
                assign(dest, &*value, &got)
            }
        }
    }
}
