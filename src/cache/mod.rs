//! Shared in-memory state for the page cache
//!
//! # Components
//!
//! - `CacheStore`: one entry per URL with sliding-window freshness
//! - `AccessLedger`: append-only per-URL log of crawl requests
//! - `Clock`: the time source both are evaluated against
//! - `spawn_stale_sweep`: optional background eviction of stale entries

mod clock;
mod ledger;
mod store;
mod sweep;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use ledger::{AccessLedger, AccessRecord};
pub use store::{CacheEntry, CacheStore, Lookup, DEFAULT_FRESHNESS_WINDOW_MINUTES};
pub use sweep::spawn_stale_sweep;
