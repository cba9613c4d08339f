//! Append-only access ledger
//!
//! Records one timestamp per crawl request, grouped by URL. Records are never
//! mutated or removed.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

/// A single recorded access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRecord {
    /// The requested URL
    pub url: String,

    /// When the request was received
    pub timestamp: DateTime<Utc>,
}

/// Per-URL chronological log of crawl requests
#[derive(Debug, Default)]
pub struct AccessLedger {
    records: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl AccessLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `now` to the sequence for `url`
    ///
    /// The append happens under one write acquisition, so insertion order is
    /// the order in which callers reached the ledger.
    pub fn record(&self, url: &str, now: DateTime<Utc>) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.entry(url.to_string()).or_default().push(now);
    }

    /// Read-only copy of the whole ledger, ordered by URL
    pub fn snapshot(&self) -> BTreeMap<String, Vec<DateTime<Utc>>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(url, times)| (url.clone(), times.clone()))
            .collect()
    }

    /// All records for a single URL in insertion order
    pub fn records_for(&self, url: &str) -> Vec<AccessRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .map(|times| {
                times
                    .iter()
                    .map(|&timestamp| AccessRecord {
                        url: url.to_string(),
                        timestamp,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
