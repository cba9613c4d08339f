//! pagecache main entry point
//!
//! This is the command-line interface for the pagecache server.

use clap::Parser;
use pagecache::config::{load_config_with_hash, Config};
use pagecache::server::serve;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pagecache: a caching front for a page fetcher
///
/// Serves `/crawl?url=...` from an in-memory cache with a sliding freshness
/// window, fetching misses in the background, and keeps an access log of
/// every request.
#[derive(Parser, Debug)]
#[command(name = "pagecache")]
#[command(version)]
#[command(about = "In-memory page cache with background fetching", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration file
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
        pagecache::config::validate(&config)?;
    }

    tracing::info!(
        "Freshness window: {} minutes, fetch timeout: {}s, max concurrent fetches: {}, dedup: {}",
        config.cache.freshness_window_minutes,
        config.fetcher.timeout_secs,
        config.fetcher.max_concurrent_fetches,
        config.fetcher.deduplicate_in_flight
    );

    match serve(&config).await {
        Ok(()) => {
            tracing::info!("Server stopped");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Server failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagecache=info,tower_http=info,warn"),
            1 => EnvFilter::new("pagecache=debug,tower_http=debug,info"),
            2 => EnvFilter::new("pagecache=trace,tower_http=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
