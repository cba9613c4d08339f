//! Periodic removal of stale cache entries
//!
//! Stale and absent entries route the same way on a crawl request, so
//! sweeping only changes the `/view` listing and memory use.

use crate::cache::{CacheStore, Clock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawns a task that evicts stale entries every `every`
///
/// The first sweep runs one full interval after the call. The task runs
/// until aborted.
pub fn spawn_stale_sweep(
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = store.evict_stale(clock.now());
            if evicted > 0 {
                tracing::info!("Swept {} stale cache entries ({} left)", evicted, store.len());
            }
        }
    })
}
