//! Typed Cache - uniform key-value caching over interchangeable backends
//!
//! Provides an in-process expiring store, a Redis store and a no-op store
//! behind one [`Cacher`] trait, with serializers that keep a nil value
//! distinct from an absent key.

pub mod cache;
pub mod config;
pub mod error;
pub mod serializer;
pub mod tasks;
pub mod value;

pub use cache::{Cache, Cacher, MemoryCache, NoneCache, RedisCache};
pub use config::{Backend, Config};
pub use error::{CacheError, Result};
pub use serializer::{BinarySerializer, Codec, JsonSerializer, Serializer};
pub use tasks::spawn_cleanup_task;
pub use value::CacheValue;
