//! Cache Module
//!
//! One capability set, [`Cacher`], implemented by an in-process backend,
//! a Redis backend and a no-op backend.

mod entry;
mod memory;
mod none;
mod remote;
mod store;


use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{Backend, Config};
use crate::error::{CacheError, Result};
use crate::value::CacheValue;

// Re-export public types
pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use none::NoneCache;
pub use remote::RedisCache;
pub use store::ExpiringStore;

// == Cacher Trait ==
/// Typed key-value cache operations shared by every backend.
///
/// A zero `ttl` is the "no explicit TTL" input; each backend documents what
/// it maps to. Operations run on the caller's task, and nothing here retries.
#[async_trait]
pub trait Cacher: Send + Sync {
    /// Returns true when `key` holds a value, including a nil value.
    async fn exists(&self, key: &str) -> bool;

    /// Writes the value stored under `key` into `dest`.
    ///
    /// Fails with `KeyNotFound` for absent keys and `TypeMismatch` when the
    /// stored type is not `T`. `dest` is untouched on error.
    async fn get<T: CacheValue>(&self, key: &str, dest: &mut T) -> Result<()>;

    /// Stores `value` under `key`.
    async fn set<T: CacheValue>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Read-through lookup.
    ///
    /// On a hit `dest` is filled and `on_miss` is never called. On a miss,
    /// where any `get` error counts as a miss, `on_miss` fills `dest`
    /// and the resulting value is stored with `ttl`. A callback error aborts
    /// without writing and is returned as [`CacheError::Callback`].
    ///
    /// The callback runs synchronously with no timeout. Lookup and store are
    /// separate steps, so concurrent callers missing the same key may each
    /// run their callback; the last store wins.
    async fn get_set<T, F>(&self, key: &str, ttl: Duration, dest: &mut T, on_miss: F) -> Result<()>
    where
        T: CacheValue,
        F: FnOnce(&str, &mut T) -> anyhow::Result<()> + Send,
    {
        match self.get(key, dest).await {
            Ok(()) => return Ok(()),
            Err(err) => debug!(key, error = %err, "read-through miss"),
        }

        on_miss(key, dest).map_err(CacheError::Callback)?;

        // Store the value itself so the next lookup into `T` matches
        self.set(key, &*dest, ttl).await
    }

    /// Removes `key`. Removing an absent key succeeds.
    async fn del(&self, key: &str) -> Result<()>;

    /// Makes an existing `key` expire at `at`. A past instant deletes it.
    async fn expires_at(&self, key: &str, at: DateTime<Utc>) -> Result<()>;

    /// Makes an existing `key` expire after `ttl`.
    async fn expires_in(&self, key: &str, ttl: Duration) -> Result<()>;
}

// == Cache ==
/// A backend chosen at runtime, so call sites do not change when caching
/// is switched between memory, Redis or off.
#[derive(Debug)]
pub enum Cache {
    Memory(MemoryCache),
    Redis(RedisCache),
    Noop(NoneCache),
}

impl Cache {
    /// Builds the backend named by `config`.
    ///
    /// The memory backend starts its cleanup task, so this must run inside a
    /// tokio runtime. The Redis backend connects eagerly.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let cache = match config.backend {
            Backend::Memory => Cache::Memory(MemoryCache::with_cleanup(
                config.default_ttl(),
                config.cleanup_interval(),
            )),
            Backend::Redis => {
                Cache::Redis(RedisCache::connect_with(&config.redis_url, config.serializer).await?)
            }
            Backend::None => Cache::Noop(NoneCache::new()),
        };
        info!(backend = %config.backend, "cache backend ready");
        Ok(cache)
    }

    pub fn backend(&self) -> Backend {
        match self {
            Cache::Memory(_) => Backend::Memory,
            Cache::Redis(_) => Backend::Redis,
            Cache::Noop(_) => Backend::None,
        }
    }
}

#[async_trait]
impl Cacher for Cache {
    async fn exists(&self, key: &str) -> bool {
        match self {
            Cache::Memory(c) => c.exists(key).await,
            Cache::Redis(c) => c.exists(key).await,
            Cache::Noop(c) => c.exists(key).await,
        }
    }

    async fn get<T: CacheValue>(&self, key: &str, dest: &mut T) -> Result<()> {
        match self {
            Cache::Memory(c) => c.get(key, dest).await,
            Cache::Redis(c) => c.get(key, dest).await,
            Cache::Noop(c) => c.get(key, dest).await,
        }
    }

    async fn set<T: CacheValue>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        match self {
            Cache::Memory(c) => c.set(key, value, ttl).await,
            Cache::Redis(c) => c.set(key, value, ttl).await,
            Cache::Noop(c) => c.set(key, value, ttl).await,
        }
    }

    async fn get_set<T, F>(&self, key: &str, ttl: Duration, dest: &mut T, on_miss: F) -> Result<()>
    where
        T: CacheValue,
        F: FnOnce(&str, &mut T) -> anyhow::Result<()> + Send,
    {
        match self {
            Cache::Memory(c) => c.get_set(key, ttl, dest, on_miss).await,
            Cache::Redis(c) => c.get_set(key, ttl, dest, on_miss).await,
            Cache::Noop(c) => c.get_set(key, ttl, dest, on_miss).await,
        }
    }

    async fn del(&self, key: &str) -> Result<()> {
        match self {
            Cache::Memory(c) => c.del(key).await,
            Cache::Redis(c) => c.del(key).await,
            Cache::Noop(c) => c.del(key).await,
        }
    }

    async fn expires_at(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        match self {
            Cache::Memory(c) => c.expires_at(key, at).await,
            Cache::Redis(c) => c.expires_at(key, at).await,
            Cache::Noop(c) => c.expires_at(key, at).await,
        }
    }

    async fn expires_in(&self, key: &str, ttl: Duration) -> Result<()> {
        match self {
            Cache::Memory(c) => c.expires_in(key, ttl).await,
            Cache::Redis(c) => c.expires_in(key, ttl).await,
            Cache::Noop(c) => c.expires_in(key, ttl).await,
        }
    }
}
