//! Crawl coordinator - the cache miss path
//!
//! On a miss or stale hit the dispatcher asks the coordinator for a fetch.
//! The coordinator:
//! - Spawns the fetch as a detached task so the request path never waits
//! - Optionally collapses concurrent misses for one URL into a single fetch
//! - Bounds the number of fetches running at once with a semaphore
//! - Bounds each fetch with a timeout
//! - Commits successful results into the cache store, logs failures

use crate::cache::{CacheStore, Clock};
use crate::config::FetcherConfig;
use crate::crawler::{FetchError, Fetcher};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

/// What `request_fetch` did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDispatch {
    /// A new fetch task was spawned
    Spawned,

    /// A fetch for this URL was already running; nothing was spawned
    Joined,
}

/// Tuning knobs for the coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Upper bound on a single fetch
    pub fetch_timeout: Duration,

    /// Maximum number of fetches running at once
    pub max_concurrent_fetches: usize,

    /// Share one fetch between concurrent misses for the same URL
    pub deduplicate_in_flight: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self::from(&FetcherConfig::default())
    }
}

impl From<&FetcherConfig> for CoordinatorOptions {
    fn from(config: &FetcherConfig) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(config.timeout_secs),
            max_concurrent_fetches: config.max_concurrent_fetches as usize,
            deduplicate_in_flight: config.deduplicate_in_flight,
        }
    }
}

/// URLs with a fetch currently running
type InFlightRegistry = Arc<Mutex<HashSet<String>>>;

/// Held by a fetch task for its whole lifetime
///
/// Dropping it releases the URL's in-flight slot and the active count, even
/// if the task panics or times out.
struct FetchGuard {
    registry: Option<(InFlightRegistry, String)>,
    active: Arc<AtomicUsize>,
}

impl FetchGuard {
    fn new(active: &Arc<AtomicUsize>, registry: Option<(InFlightRegistry, String)>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self {
            registry,
            active: Arc::clone(active),
        }
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if let Some((registry, url)) = &self.registry {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(url);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Dispatches detached fetches and commits their results
#[derive(Clone)]
pub struct CrawlCoordinator {
    store: Arc<CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    permits: Arc<Semaphore>,
    in_flight: InFlightRegistry,
    active: Arc<AtomicUsize>,
    options: CoordinatorOptions,
}

impl CrawlCoordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `store` - Cache that successful fetches are committed into
    /// * `fetcher` - Collaborator that retrieves page text
    /// * `clock` - Time source for commit timestamps
    /// * `options` - Timeout, concurrency cap and deduplication settings
    pub fn new(
        store: Arc<CacheStore>,
        fetcher: Arc<dyn Fetcher>,
        clock: Arc<dyn Clock>,
        options: CoordinatorOptions,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(options.max_concurrent_fetches.max(1)));

        Self {
            store,
            fetcher,
            clock,
            permits,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            active: Arc::new(AtomicUsize::new(0)),
            options,
        }
    }

    /// Requests a background fetch of `url`
    ///
    /// Returns immediately. The fetch runs on its own task which the caller
    /// cannot await or cancel. Must be called from within a tokio runtime.
    ///
    /// With deduplication enabled, a request for a URL that is already being
    /// fetched spawns nothing and returns [`FetchDispatch::Joined`]. Without
    /// it, every call spawns its own fetch and the last one to finish wins.
    pub fn request_fetch(&self, url: &str) -> FetchDispatch {
        let registry = if self.options.deduplicate_in_flight {
            let claimed = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(url.to_string());

            if !claimed {
                tracing::debug!("Fetch already in flight for {}", url);
                return FetchDispatch::Joined;
            }
            Some((Arc::clone(&self.in_flight), url.to_string()))
        } else {
            None
        };

        let guard = FetchGuard::new(&self.active, registry);
        let coordinator = self.clone();
        let url = url.to_string();

        tokio::spawn(async move {
            let Ok(_permit) = Arc::clone(&coordinator.permits).acquire_owned().await else {
                tracing::error!("Fetch permits closed, dropping fetch for {}", url);
                return;
            };

            let result = coordinator.run_fetch(&url).await;
            // Free the slot before logging so the next miss can retry at once
            drop(guard);

            match result {
                Ok(()) => tracing::info!("Cached {}", url),
                Err(e) => tracing::warn!("Error crawling URL {}: {}", url, e),
            }
        });

        FetchDispatch::Spawned
    }

    /// Number of fetch tasks that have been spawned and not yet finished
    pub fn in_flight_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns true if a deduplicated fetch for `url` is running
    pub fn is_in_flight(&self, url: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Body of a fetch task
    ///
    /// Runs with a concurrency permit held. Fetches under the timeout and
    /// commits on success; failures leave the cache as it was and are
    /// returned to the task for logging.
    async fn run_fetch(&self, url: &str) -> Result<(), FetchError> {
        tracing::debug!("Fetching {}", url);

        let result = match tokio::time::timeout(self.options.fetch_timeout, self.fetcher.fetch(url))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        };

        let content = result?;
        self.store.commit(url, content, self.clock.now());
        Ok(())
    }
}
