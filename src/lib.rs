//! pagecache: a caching front for a page fetcher
//!
//! Serves page text from an in-memory cache keyed by URL. A cached page stays
//! fresh for a sliding window that restarts on every hit; misses and stale
//! hits trigger a background fetch and answer "in progress" right away. Every
//! request is recorded in an append-only access ledger.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod output;
pub mod server;

use std::net::SocketAddr;
use thiserror::Error;

/// Main error type for pagecache operations
#[derive(Debug, Error)]
pub enum PageCacheError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid bind address {0}")]
    InvalidAddress(String),
}

/// Result type alias for pagecache operations
pub type Result<T> = std::result::Result<T, PageCacheError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::{AccessLedger, CacheEntry, CacheStore, Lookup};
pub use config::Config;
pub use crawler::{CrawlCoordinator, CrawlDispatcher, CrawlOutcome, Fetcher, HttpFetcher};
