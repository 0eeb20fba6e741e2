//! Redis Cache Backend
//!
//! Values pass through a [`Serializer`] on the way in and out; existence,
//! deletion and expiry map straight onto Redis commands with no local
//! bookkeeping. Transport errors are returned as-is and never retried.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, warn};

use crate::cache::Cacher;
use crate::error::{CacheError, Result};
use crate::serializer::{Codec, Serializer};
use crate::value::CacheValue;

// == Redis Cache ==
/// Redis backend, generic over the value serializer.
///
/// A zero TTL on `set` stores the key without expiry. This differs from
/// [`MemoryCache`](crate::cache::MemoryCache), which applies its default TTL.
pub struct RedisCache<S: Serializer = Codec> {
    conn: ConnectionManager,
    serializer: S,
}

impl RedisCache<Codec> {
    /// Connects to `url` using the binary codec.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(url, Codec::default()).await
    }
}

impl<S: Serializer> RedisCache<S> {
    /// Connects to `url` using `serializer`.
    ///
    /// # Errors
    /// Returns `Transport` if the URL is invalid or the server is unreachable.
    pub async fn connect_with(url: &str, serializer: S) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await.map_err(|e| {
            warn!(url, error = %e, "redis connection failed");
            CacheError::from(e)
        })?;

        info!(url, serializer = serializer.name(), "redis cache connected");
        Ok(Self::from_manager(conn, serializer))
    }

    /// Wraps an existing connection manager.
    pub fn from_manager(conn: ConnectionManager, serializer: S) -> Self {
        Self { conn, serializer }
    }

    /// Swaps the serializer, keeping the connection.
    pub fn with_serializer<S2: Serializer>(self, serializer: S2) -> RedisCache<S2> {
        RedisCache {
            conn: self.conn,
            serializer,
        }
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    /// Maps an EXPIRE-family reply of 0 (key absent) to `KeyNotFound`.
    fn expect_key(key: &str, updated: i64) -> Result<()> {
        if updated == 0 {
            Err(CacheError::KeyNotFound(key.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Redis rejects `PX 0`, so positive sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl<S: Serializer> fmt::Debug for RedisCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("serializer", &self.serializer.name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: Serializer> Cacher for RedisCache<S> {
    async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();
        let found: redis::RedisResult<i64> =
            redis::cmd("EXISTS").arg(key).query_async(&mut conn).await;
        match found {
            Ok(count) => count > 0,
            Err(e) => {
                warn!(key, error = %e, "redis EXISTS failed");
                false
            }
        }
    }

    async fn get<T: CacheValue>(&self, key: &str, dest: &mut T) -> Result<()> {
        let mut conn = self.conn.clone();
        let data: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;

        match data {
            Some(bytes) => self.serializer.decode(&bytes, dest),
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    async fn set<T: CacheValue>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        // Encode first so an unsupported value never reaches the server
        let bytes = self.serializer.encode(value)?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(bytes);
        if !ttl.is_zero() {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }

        let mut conn = self.conn.clone();
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }

    async fn expires_at(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        let mut conn = self.conn.clone();
        let updated: i64 = redis::cmd("PEXPIREAT")
            .arg(key)
            .arg(at.timestamp_millis())
            .query_async(&mut conn)
            .await?;
        Self::expect_key(key, updated)
    }

    async fn expires_in(&self, key: &str, ttl: Duration) -> Result<()> {
        let millis = if ttl.is_zero() { 0 } else { ttl_millis(ttl) };

        let mut conn = self.conn.clone();
        let updated: i64 = redis::cmd("PEXPIRE")
            .arg(key)
            .arg(millis)
            .query_async(&mut conn)
            .await?;
        Self::expect_key(key, updated)
    }
}
