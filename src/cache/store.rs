//! In-memory page cache with sliding expiration
//!
//! Each URL maps to exactly one [`CacheEntry`]. An entry is fresh while
//! `now - refreshed_at <= window`; every fresh hit restarts the window.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default freshness window (60 minutes)
pub const DEFAULT_FRESHNESS_WINDOW_MINUTES: i64 = 60;

/// A cached page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The URL this entry is keyed by
    pub url: String,

    /// Extracted textual content of the page
    pub content: String,

    /// Last successful fetch or fresh hit, whichever is later
    pub refreshed_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Returns true if the entry is within `window` of `now`
    ///
    /// The boundary is inclusive: an entry exactly `window` old is fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.refreshed_at <= window
    }
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Entry exists and is within the freshness window
    Fresh(CacheEntry),

    /// Entry exists but has aged past the freshness window
    Stale(CacheEntry),

    /// No entry for this URL
    Absent,
}

impl Lookup {
    /// Returns true for [`Lookup::Fresh`]
    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }

    /// Returns the entry regardless of freshness
    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Lookup::Fresh(entry) | Lookup::Stale(entry) => Some(entry),
            Lookup::Absent => None,
        }
    }
}

/// Process-wide page cache
///
/// The map is guarded by a reader/writer lock. Lookups and snapshots share
/// the read side; `touch`, `commit` and `evict_stale` each replace whole
/// entries under a single write acquisition, so readers never observe a
/// partially written entry.
#[derive(Debug)]
pub struct CacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    window: Duration,
}

impl CacheStore {
    /// Creates an empty store with the given freshness window
    pub fn new(window: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            window,
        }
    }

    // Every critical section leaves the map consistent, so a poisoned lock
    // still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks up `url` and classifies the entry against `now`
    ///
    /// Read-only; never mutates the entry.
    pub fn lookup(&self, url: &str, now: DateTime<Utc>) -> Lookup {
        match self.read().get(url) {
            Some(entry) if entry.is_fresh(now, self.window) => Lookup::Fresh(entry.clone()),
            Some(entry) => Lookup::Stale(entry.clone()),
            None => Lookup::Absent,
        }
    }

    /// Slides the freshness window of an existing entry to `now`
    ///
    /// Content is left untouched. Does nothing if the URL is absent. The
    /// timestamp never moves backwards.
    ///
    /// # Returns
    ///
    /// * `true` - The entry existed and was refreshed
    /// * `false` - No entry for `url`
    pub fn touch(&self, url: &str, now: DateTime<Utc>) -> bool {
        match self.write().get_mut(url) {
            Some(entry) => {
                entry.refreshed_at = entry.refreshed_at.max(now);
                true
            }
            None => false,
        }
    }

    /// Inserts or replaces the entry for `url`
    ///
    /// Called by the crawl coordinator after a successful fetch. If the
    /// existing entry carries a later timestamp (a concurrent `touch` won the
    /// race), that timestamp is kept.
    pub fn commit(&self, url: &str, content: String, now: DateTime<Utc>) {
        let mut entries = self.write();
        let refreshed_at = entries
            .get(url)
            .map_or(now, |existing| existing.refreshed_at.max(now));

        entries.insert(
            url.to_string(),
            CacheEntry {
                url: url.to_string(),
                content,
                refreshed_at,
            },
        );
    }

    /// Removes every entry that is stale at `now`
    ///
    /// # Returns
    ///
    /// The number of entries removed
    pub fn evict_stale(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.window));
        before - entries.len()
    }

    /// Copies every entry out of the store, ordered by URL
    pub fn snapshot(&self) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self.read().values().cloned().collect();
        entries.sort_by(|a, b| a.url.cmp(&b.url));
        entries
    }

    /// Number of cached URLs
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_FRESHNESS_WINDOW_MINUTES))
    }
}
