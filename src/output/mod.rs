//! Output module for report pages
//!
//! This module renders read-only views over the cache and the access ledger:
//! - The list of cached URLs and their last refresh time
//! - The per-URL access log

mod html;

pub use html::{render_access_log, render_cache_view, TIMESTAMP_FORMAT};

use crate::cache::{AccessLedger, CacheStore};

/// Renders the `/view` page from the current cache contents
pub fn cache_report(store: &CacheStore) -> String {
    render_cache_view(&store.snapshot())
}

/// Renders the `/accesslog` page from the current ledger contents
pub fn access_report(ledger: &AccessLedger) -> String {
    render_access_log(&ledger.snapshot())
}
