//! Crawl request dispatch
//!
//! Maps one inbound crawl request onto the cache state machine:
//!
//! ```text
//! Absent --fetch ok--> Fresh --window passes--> Stale --fetch ok--> Fresh
//! ```
//!
//! `Absent` and `Stale` both route to the coordinator and answer "in
//! progress"; `Fresh` slides the window and answers with the cached text.

use crate::cache::{AccessLedger, CacheStore, Clock, Lookup};
use crate::crawler::{CrawlCoordinator, FetchDispatch};
use std::sync::Arc;

/// Body returned while a page is being fetched
pub const IN_PROGRESS_MESSAGE: &str = "Crawling in progress...";

/// What a crawl request resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Fresh cached text
    Cached(String),

    /// A fetch was requested (or joined); the caller should poll again
    InProgress,
}

impl CrawlOutcome {
    /// The plain-text response body for this outcome
    pub fn into_body(self) -> String {
        match self {
            CrawlOutcome::Cached(content) => content,
            CrawlOutcome::InProgress => IN_PROGRESS_MESSAGE.to_string(),
        }
    }
}

/// Entry point for crawl requests
#[derive(Clone)]
pub struct CrawlDispatcher {
    store: Arc<CacheStore>,
    ledger: Arc<AccessLedger>,
    coordinator: CrawlCoordinator,
    clock: Arc<dyn Clock>,
}

impl CrawlDispatcher {
    /// Creates a dispatcher over shared cache state
    pub fn new(
        store: Arc<CacheStore>,
        ledger: Arc<AccessLedger>,
        coordinator: CrawlCoordinator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            ledger,
            coordinator,
            clock,
        }
    }

    /// Handles one crawl request
    ///
    /// Every call appends exactly one ledger record, whatever the outcome.
    /// The URL is not validated; an empty or malformed URL is an ordinary
    /// key and the fetcher rejects it. `is_paying` is accepted and ignored.
    pub fn crawl(&self, url: &str, is_paying: bool) -> CrawlOutcome {
        let now = self.clock.now();
        self.ledger.record(url, now);

        match self.store.lookup(url, now) {
            Lookup::Fresh(entry) => {
                self.store.touch(url, now);
                tracing::debug!("Cache hit for {} (paying: {})", url, is_paying);
                CrawlOutcome::Cached(entry.content)
            }
            lookup => {
                let dispatch = self.coordinator.request_fetch(url);
                tracing::debug!(
                    "Cache {} for {} (paying: {}), fetch {}",
                    if matches!(lookup, Lookup::Stale(_)) { "stale" } else { "miss" },
                    url,
                    is_paying,
                    match dispatch {
                        FetchDispatch::Spawned => "spawned",
                        FetchDispatch::Joined => "joined",
                    }
                );
                CrawlOutcome::InProgress
            }
        }
    }

    /// The cache this dispatcher reads from
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// The ledger this dispatcher writes to
    pub fn ledger(&self) -> &Arc<AccessLedger> {
        &self.ledger
    }

    /// The coordinator handling misses
    pub fn coordinator(&self) -> &CrawlCoordinator {
        &self.coordinator
    }
}
