//! Expiring Store Module
//!
//! In-process key-value storage with per-entry deadlines. Expired entries
//! are invisible to reads and removed by [`cleanup_expired`](ExpiringStore::cleanup_expired),
//! which the background cleanup task calls periodically.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};
use crate::value::CacheValue;

// == Expiring Store ==
/// Map of live values with optional expiry.
///
/// Not synchronised on its own; [`MemoryCache`](crate::cache::MemoryCache)
/// wraps it in a `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct ExpiringStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// TTL used when a caller passes a zero TTL, None = never expire
    default_ttl: Option<Duration>,
}

impl ExpiringStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `default_ttl` - Lifetime for entries stored with a zero TTL
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    /// Maps a caller TTL to the lifetime actually applied.
    ///
    /// Zero selects the default, so a non-positive TTL never yields an
    /// already-expired entry.
    pub fn resolve_ttl(&self, ttl: Duration) -> Option<Duration> {
        if ttl.is_zero() {
            self.default_ttl
        } else {
            Some(ttl)
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous value and TTL.
    pub fn set<T: CacheValue>(&mut self, key: &str, value: T, ttl: Duration) {
        let entry = CacheEntry::new(value, self.resolve_ttl(ttl));
        self.entries.insert(key.to_string(), entry);
    }

    // == Get ==
    /// Returns the live entry for `key`.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes `key`, returning whether a live entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries
            .remove(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Set Expiry ==
    /// Gives an existing entry a new lifetime, keeping its value.
    ///
    /// `None` removes the deadline and a zero TTL deletes the entry. Fails
    /// with `KeyNotFound` when no live entry exists; the key is never created.
    pub fn set_expiry(&mut self, key: &str, ttl: Option<Duration>) -> Result<()> {
        let live = match self.entries.get(key) {
            Some(entry) => !entry.is_expired(),
            None => return Err(CacheError::KeyNotFound(key.to_string())),
        };
        if !live {
            self.entries.remove(key);
            return Err(CacheError::KeyNotFound(key.to_string()));
        }

        if ttl.is_some_and(|ttl| ttl.is_zero()) {
            self.entries.remove(key);
        } else if let Some(entry) = self.entries.get_mut(key) {
            entry.set_ttl(ttl);
        }
        Ok(())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
