//! No-op Cache Backend
//!
//! Disables caching without touching call sites.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::Cacher;
use crate::error::{CacheError, Result};
use crate::value::CacheValue;

/// Backend that stores nothing.
///
/// Writes succeed and are discarded, nothing exists, and reads fail with
/// `NotImplemented`. `get_set` fails the same way without running its
/// callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneCache;

impl NoneCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Cacher for NoneCache {
    async fn exists(&self, _key: &str) -> bool {
        false
    }

    async fn get<T: CacheValue>(&self, _key: &str, _dest: &mut T) -> Result<()> {
        Err(CacheError::NotImplemented)
    }

    async fn set<T: CacheValue>(&self, _key: &str, _value: &T, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn get_set<T, F>(
        &self,
        _key: &str,
        _ttl: Duration,
        _dest: &mut T,
        _on_miss: F,
    ) -> Result<()>
    where
        T: CacheValue,
        F: FnOnce(&str, &mut T) -> anyhow::Result<()> + Send,
    {
        Err(CacheError::NotImplemented)
    }

    async fn del(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn expires_at(&self, _key: &str, _at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }

    async fn expires_in(&self, _key: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}
