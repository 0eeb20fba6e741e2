//! Expiry Cleanup Task
//!
//! Background task that periodically purges expired in-process entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::ExpiringStore;

/// Shortest sweep period; tokio intervals must be non-zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a task that calls [`ExpiringStore::cleanup_expired`] every `every`.
///
/// The first purge happens one full interval after spawning. Intervals
/// shorter than one millisecond, including zero, are raised to it. The returned
/// handle runs until aborted; [`MemoryCache`](crate::cache::MemoryCache)
/// aborts it on drop.
///
/// Must be called from within a tokio runtime.
pub fn spawn_cleanup_task(store: Arc<RwLock<ExpiringStore>>, every: Duration) -> JoinHandle<()> {
    let every = every.max(MIN_INTERVAL);
    tokio::spawn(async move {
        info!(interval_ms = every.as_millis() as u64, "starting expiry cleanup task");

        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately on the first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = store.write().await.cleanup_expired();
            if removed > 0 {
                info!(removed, "expiry cleanup removed entries");
            } else {
                debug!("expiry cleanup found nothing to remove");
            }
        }
    })
}
