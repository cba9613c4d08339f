//! Crawler module for the cache miss path
//!
//! This module contains everything between a crawl request and a cache write:
//! - Request dispatch over the cache state machine
//! - Detached fetch coordination with single-flight deduplication
//! - HTTP fetching and error classification
//! - Text extraction from fetched HTML

mod coordinator;
mod dispatch;
mod fetcher;
mod parser;

pub use coordinator::{CoordinatorOptions, CrawlCoordinator, FetchDispatch};
pub use dispatch::{CrawlDispatcher, CrawlOutcome, IN_PROGRESS_MESSAGE};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use parser::extract_text;
