//! Typed Cache probe
//!
//! Builds the backend described by the environment and runs one pass of
//! every cache operation against a probe key, logging each result. Exits
//! non-zero if the backend cannot be built or a write fails.

use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use typed_cache::{Cache, CacheValue, Cacher, Config};

const PROBE_KEY: &str = "typed_cache:probe";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Probe {
    started_at: chrono::DateTime<Utc>,
    pid: u32,
}

impl CacheValue for Probe {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typed_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        backend = %config.backend,
        serializer = %config.serializer,
        default_ttl = config.default_ttl,
        "configuration loaded"
    );

    let cache = Cache::from_config(&config)
        .await
        .context("failed to build cache backend")?;

    let probe = Probe {
        started_at: Utc::now(),
        pid: std::process::id(),
    };
    cache
        .set(PROBE_KEY, &probe, Duration::from_secs(30))
        .await
        .context("probe write failed")?;
    info!(exists = cache.exists(PROBE_KEY).await, "probe written");

    // A hit here means the callback does not run
    let mut read = Probe {
        started_at: Utc::now(),
        pid: 0,
    };
    let mut refreshed = false;
    let result = cache
        .get_set(PROBE_KEY, Duration::from_secs(30), &mut read, |_, dest| {
            refreshed = true;
            *dest = probe.clone();
            Ok(())
        })
        .await;
    match result {
        Ok(()) => info!(pid = read.pid, refreshed, "probe read back"),
        Err(e) => warn!(error = %e, "probe read failed"),
    }

    if let Err(e) = cache.expires_in(PROBE_KEY, Duration::from_secs(5)).await {
        warn!(error = %e, "probe expiry update failed");
    }
    cache.del(PROBE_KEY).await.context("probe delete failed")?;
    info!(exists = cache.exists(PROBE_KEY).await, "probe removed");

    Ok(())
}
