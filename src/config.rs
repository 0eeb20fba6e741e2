//! Configuration Module
//!
//! Loads cache settings from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::serializer::Codec;

// == Backend ==
/// Which cache implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process expiring store
    #[default]
    Memory,
    /// Remote Redis server
    Redis,
    /// Caching disabled
    None,
}

impl FromStr for Backend {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "redis" => Ok(Backend::Redis),
            "none" | "off" => Ok(Backend::None),
            other => Err(CacheError::Config(format!("unknown cache backend: {other}"))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Memory => "memory",
            Backend::Redis => "redis",
            Backend::None => "none",
        })
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend to build
    pub backend: Backend,
    /// Lifetime in seconds for in-process entries set with a zero TTL, 0 = never expire
    pub default_ttl: u64,
    /// Interval in seconds between in-process expiry sweeps
    pub cleanup_interval: u64,
    /// Serializer used by the Redis backend
    pub serializer: Codec,
    /// Redis connection URL
    pub redis_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `memory`, `redis` or `none` (default: memory)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds, 0 = never (default: 0)
    /// - `CACHE_CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `CACHE_SERIALIZER` - `binary` or `json` (default: binary)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.backend),
            default_ttl: parse_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_var("CACHE_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            serializer: parse_var("CACHE_SERIALIZER").unwrap_or(defaults.serializer),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
        }
    }

    /// Default TTL of the in-process store, `None` when entries never expire.
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.default_ttl > 0).then(|| Duration::from_secs(self.default_ttl))
    }

    /// Cleanup interval, clamped to at least one second.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            default_ttl: 0,
            cleanup_interval: 60,
            serializer: Codec::Binary,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}
