//! HTTP surface
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /crawl?url=<u>&isPaying=<bool>` | cached text or the in-progress message |
//! | `GET /view` | HTML list of cached URLs |
//! | `GET /accesslog` | HTML access log |
//! | `GET /static/*` | files from the configured static directory |

mod routes;

pub use routes::{build_router, CrawlParams};

use crate::cache::{spawn_stale_sweep, AccessLedger, CacheStore, Clock, SystemClock};
use crate::config::Config;
use crate::crawler::{CoordinatorOptions, CrawlCoordinator, CrawlDispatcher, Fetcher, HttpFetcher};
use crate::{ConfigError, PageCacheError};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: CrawlDispatcher,
}

impl AppState {
    /// Wires up the cache, ledger and coordinator around `fetcher`
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>) -> Self {
        let window = chrono::Duration::minutes(i64::from(config.cache.freshness_window_minutes));
        let store = Arc::new(CacheStore::new(window));
        let ledger = Arc::new(AccessLedger::new());
        let coordinator = CrawlCoordinator::new(
            Arc::clone(&store),
            fetcher,
            Arc::clone(&clock),
            CoordinatorOptions::from(&config.fetcher),
        );

        Self {
            dispatcher: CrawlDispatcher::new(store, ledger, coordinator, clock),
        }
    }

    /// Production wiring: HTTP fetcher and wall clock
    pub fn from_config(config: &Config) -> Result<Self, PageCacheError> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Ok(Self::new(config, Arc::new(fetcher), Arc::new(SystemClock)))
    }
}

/// Binds the configured address and serves until Ctrl-C
///
/// # Returns
///
/// * `Ok(())` - Server shut down cleanly
/// * `Err(PageCacheError)` - Invalid address, bind failure, or server error
pub async fn serve(config: &Config) -> Result<(), PageCacheError> {
    let addr: SocketAddr = config.server.bind_address.parse().map_err(|e| {
        ConfigError::InvalidAddress(format!("'{}': {}", config.server.bind_address, e))
    })?;

    let state = AppState::from_config(config)?;

    let sweep = match config.cache.sweep_interval_minutes {
        0 => None,
        minutes => {
            tracing::info!("Sweeping stale entries every {} minutes", minutes);
            Some(spawn_stale_sweep(
                Arc::clone(state.dispatcher.store()),
                Arc::new(SystemClock),
                Duration::from_secs(u64::from(minutes) * 60),
            ))
        }
    };

    let router = build_router(state, Path::new(&config.server.static_dir));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| PageCacheError::Bind { addr, source })?;

    tracing::info!("Starting the server on {}", addr);
    let result = run(listener, router).await;

    if let Some(handle) = sweep {
        handle.abort();
    }
    result
}

/// Serves `router` on an already bound listener until Ctrl-C
pub async fn run(listener: TcpListener, router: axum::Router) -> Result<(), PageCacheError> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
