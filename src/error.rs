//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type shared by every backend and serializer.
///
/// Nothing in this crate retries on any of these; they propagate to the
/// caller unchanged.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is absent (never set, deleted or expired)
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Destination type differs from the stored or decoded type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// A nil-shaped value was read into a destination that cannot hold nil
    #[error("Cannot assign nil to non-nilable type {0}")]
    NilAssignment(String),

    /// The serializer cannot represent this value
    #[error("Unsupported type {type_name}: {reason}")]
    UnsupportedType { type_name: String, reason: String },

    /// Malformed or undecodable bytes
    #[error("Codec error: {0}")]
    Codec(String),

    /// Failure reported by the remote store
    #[error("Transport error: {0}")]
    Transport(#[from] redis::RedisError),

    /// Fixed response of the no-op backend
    #[error("Not implemented")]
    NotImplemented,

    /// Error returned by a read-through callback, kept as-is
    #[error(transparent)]
    Callback(anyhow::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Builds a `TypeMismatch` from two type names.
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        CacheError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Returns true for `KeyNotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
