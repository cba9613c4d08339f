//! Configuration module for pagecache
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the service also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use pagecache::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagecache.toml")).unwrap();
//! println!("Freshness window: {} minutes", config.cache.freshness_window_minutes);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheConfig, Config, FetcherConfig, ServerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
