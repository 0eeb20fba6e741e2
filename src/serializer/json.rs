//! JSON Serializer Module
//!
//! Cross-readable codec. Every value is wrapped in an envelope:
//!
//! ```text
//! {"is_nil": false, "value": {"id": 1, "name": "ann"}}
//! {"is_nil": true}
//! ```
//!
//! `value` is omitted for nil values. This layout is stable and safe for
//! other clients to read and write. Decoding always targets the caller's
//! type, so no type name is carried.
//!
//! The format is lossy where JSON is:
//! - A present value whose JSON form is `null`, such as `Some(None)` in an
//!   `Option<Option<T>>` or `Some(())`, reads back as nil.
//! - Values that do not survive a JSON round trip into their own type, such
//!   as non-finite floats (which serde_json writes as `null`), are rejected
//!   at encode time with `UnsupportedType`.

use std::any::type_name;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};
use crate::serializer::Serializer;
use crate::value::{assign_nil, CacheValue};

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    is_nil: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

fn unsupported<T>(err: serde_json::Error) -> CacheError {
    CacheError::UnsupportedType {
        type_name: type_name::<T>().to_string(),
        reason: err.to_string(),
    }
}

// == JSON Serializer ==
/// serde_json-backed serializer using the `is_nil` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode<T: CacheValue>(&self, value: &T) -> Result<Vec<u8>> {
        let envelope = if value.is_nil() {
            Envelope {
                is_nil: true,
                value: None,
            }
        } else {
            let value = serde_json::to_value(value).map_err(unsupported::<T>)?;
            // NaN and infinities become null here, so check the tree reads back as T
            serde_json::from_value::<T>(value.clone()).map_err(unsupported::<T>)?;
            Envelope {
                is_nil: false,
                value: Some(value),
            }
        };

        serde_json::to_vec(&envelope)
            .map_err(|e| CacheError::Codec(format!("json encode error: {e}")))
    }

    fn decode<T: CacheValue>(&self, data: &[u8], dest: &mut T) -> Result<()> {
        let envelope: Envelope = serde_json::from_slice(data)
            .map_err(|e| CacheError::Codec(format!("json decode error: {e}")))?;

        if envelope.is_nil {
            return assign_nil(dest);
        }

        // Second pass: generic JSON tree into the destination's concrete type
        let value = envelope.value.unwrap_or(Value::Null);
        *dest = serde_json::from_value(value).map_err(|e| {
            CacheError::Codec(format!("json decode to {} error: {e}", type_name::<T>()))
        })?;
        Ok(())
    }
}
