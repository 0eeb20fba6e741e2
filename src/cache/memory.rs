//! In-Process Cache Backend
//!
//! Keeps values as live objects, so no serializer is involved. Reads
//! clone the stored value into the destination after an exact type check.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{Cacher, ExpiringStore};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;
use crate::value::{assign, CacheValue};

// == Memory Cache ==
/// In-process backend over an [`ExpiringStore`].
///
/// A zero TTL on `set` or `expires_in` selects the store's default TTL,
/// which is "never expire" when no default is configured.
pub struct MemoryCache {
    store: Arc<RwLock<ExpiringStore>>,
    cleanup: Option<JoinHandle<()>>,
}

impl MemoryCache {
    /// Creates a cache without a background sweep.
    ///
    /// Expired entries stay invisible to reads but keep their memory until
    /// [`purge_expired`](Self::purge_expired) runs.
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            store: Arc::new(RwLock::new(ExpiringStore::new(default_ttl))),
            cleanup: None,
        }
    }

    /// Creates a cache whose expired entries are purged every `cleanup_interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_cleanup(default_ttl: Option<Duration>, cleanup_interval: Duration) -> Self {
        let mut cache = Self::new(default_ttl);
        cache.cleanup = Some(spawn_cleanup_task(cache.store.clone(), cleanup_interval));
        cache
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Remaining lifetime of `key`, `None` when it never expires.
    ///
    /// Fails with `KeyNotFound` when no live entry exists.
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.store
            .read()
            .await
            .get(key)
            .map(|entry| entry.ttl_remaining())
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    /// Removes expired entries now, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup.take() {
            handle.abort();
        }
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("cleanup", &self.cleanup.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Cacher for MemoryCache {
    async fn exists(&self, key: &str) -> bool {
        self.store.read().await.contains(key)
    }

    async fn get<T: CacheValue>(&self, key: &str, dest: &mut T) -> Result<()> {
        let (value, type_name) = {
            let store = self.store.read().await;
            let entry = store
                .get(key)
                .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))?;
            (entry.value.clone(), entry.type_name)
        };
        assign(dest, &*value, type_name)
    }

    async fn set<T: CacheValue>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.store.write().await.set(key, value.clone(), ttl);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.store.write().await.delete(key);
        Ok(())
    }

    async fn expires_at(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        // A deadline at or before now becomes a zero TTL, which deletes the key
        let ttl = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        if ttl.is_zero() {
            debug!(key, %at, "expiry instant already passed");
        }
        self.store.write().await.set_expiry(key, Some(ttl))
    }

    async fn expires_in(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut store = self.store.write().await;
        let ttl = store.resolve_ttl(ttl);
        store.set_expiry(key, ttl)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    impl CacheValue for User {}

    fn user(id: u64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::default();
        let ann = user(1, "ann");

        cache.set("u:1", &ann, Duration::from_secs(60)).await.unwrap();

        let mut dest = user(0, "");
        cache.get("u:1", &mut dest).await.unwrap();
        assert_eq!(dest, ann);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = MemoryCache::default();
        let mut dest = 0i32;

        let err = cache.get("missing", &mut dest).await.unwrap_err();
        assert!(matches!(err, CacheError::KeyNotFound(ref k) if k == "missing"));
    }

    #[tokio::test]
    async fn test_get_type_mismatch_leaves_dest() {
        let cache = MemoryCache::default();
        cache.set("k", &42i64, Duration::ZERO).await.unwrap();

        let mut dest = "keep".to_string();
        let err = cache.get("k", &mut dest).await.unwrap_err();
        assert!(matches!(err, CacheError::TypeMismatch { .. }));
        assert_eq!(dest, "keep");
    }

    #[tokio::test]
    async fn test_nil_value_exists() {
        let cache = MemoryCache::default();
        cache
            .set("u:1", &None::<User>, Duration::from_secs(600))
            .await
            .unwrap();

        let mut dest = Some(user(9, "x"));
        cache.get("u:1", &mut dest).await.unwrap();
        assert!(dest.is_none());
        assert!(cache.exists("u:1").await);
    }

    #[tokio::test]
    async fn test_zero_ttl_uses_default() {
        let cache = MemoryCache::new(Some(Duration::from_millis(50)));
        cache.set("k", &1u8, Duration::ZERO).await.unwrap();
        assert!(cache.exists("k").await);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_expires_at_past_deletes() {
        let cache = MemoryCache::default();
        cache.set("k", &1u8, Duration::ZERO).await.unwrap();

        cache
            .expires_at("k", Utc::now() - ChronoDuration::seconds(5))
            .await
            .unwrap();
        assert!(!cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_expires_at_future_keeps_value() {
        let cache = MemoryCache::default();
        cache.set("k", &7u8, Duration::ZERO).await.unwrap();

        cache
            .expires_at("k", Utc::now() + ChronoDuration::milliseconds(80))
            .await
            .unwrap();

        let mut dest = 0u8;
        cache.get("k", &mut dest).await.unwrap();
        assert_eq!(dest, 7);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_expiry_on_missing_key_does_not_create() {
        let cache = MemoryCache::default();

        let err = cache.expires_in("nope", Duration::from_secs(5)).await.unwrap_err();
        assert!(err.is_not_found());
        let err = cache
            .expires_at("nope", Utc::now() + ChronoDuration::seconds(5))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!cache.exists("nope").await);
    }

    #[tokio::test]
    async fn test_expires_in_extends_lifetime() {
        let cache = MemoryCache::default();
        cache.set("k", &1u8, Duration::from_millis(50)).await.unwrap();
        cache.expires_in("k", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_del_absent_key_succeeds() {
        let cache = MemoryCache::default();
        cache.del("nope").await.unwrap();

        cache.set("k", &1u8, Duration::ZERO).await.unwrap();
        cache.del("k").await.unwrap();
        assert!(!cache.exists("k").await);
    }

    #[tokio::test]
    async fn test_ttl_reports_remaining_lifetime() {
        let cache = MemoryCache::default();
        cache.set("forever", &1u8, Duration::ZERO).await.unwrap();
        cache.set("short", &1u8, Duration::from_secs(30)).await.unwrap();

        assert_eq!(cache.ttl("forever").await.unwrap(), None);
        let remaining = cache.ttl("short").await.unwrap().unwrap();
        assert!(remaining > Duration::from_secs(29) && remaining <= Duration::from_secs(30));

        cache.expires_in("short", Duration::from_secs(5)).await.unwrap();
        let remaining = cache.ttl("short").await.unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(5));

        assert!(cache.ttl("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::default();
        cache.set("a", &1u8, Duration::from_millis(20)).await.unwrap();
        cache.set("b", &2u8, Duration::ZERO).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_with_cleanup_zero_interval() {
        let cache = MemoryCache::with_cleanup(None, Duration::ZERO);
        cache.set("a", &1u8, Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_with_cleanup_sweeps() {
        let cache = MemoryCache::with_cleanup(None, Duration::from_millis(30));
        cache.set("a", &1u8, Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.purge_expired().await, 0);
        assert!(cache.is_empty().await);
    }
}
