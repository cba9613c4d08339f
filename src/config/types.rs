use serde::Deserialize;

/// Main configuration structure for pagecache
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(rename = "bind-address")]
    pub bind_address: String,

    /// Directory served under `/static/`
    #[serde(rename = "static-dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            static_dir: "./static".to_string(),
        }
    }
}

/// Cache behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long an entry stays fresh after its last fetch or hit (minutes)
    #[serde(rename = "freshness-window-minutes")]
    pub freshness_window_minutes: u32,

    /// How often stale entries are swept out (minutes, 0 disables the sweep)
    #[serde(rename = "sweep-interval-minutes")]
    pub sweep_interval_minutes: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness_window_minutes: 60,
            sweep_interval_minutes: 0,
        }
    }
}

/// Outbound fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Name sent in the User-Agent header
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version sent in the User-Agent header
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Upper bound on a single fetch (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum number of fetches running at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Share one fetch between concurrent misses for the same URL
    #[serde(rename = "deduplicate-in-flight")]
    pub deduplicate_in_flight: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            crawler_name: "pagecache".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout_secs: 30,
            max_concurrent_fetches: 64,
            deduplicate_in_flight: true,
        }
    }
}
