//! Page fetching
//!
//! This module defines the [`Fetcher`] seam the crawl coordinator calls on a
//! cache miss, and the HTTP implementation used in production:
//! - Building an HTTP client with the configured user agent and timeouts
//! - GET requests with status and Content-Type checks
//! - Text extraction from the returned HTML
//! - Error classification

use crate::config::FetcherConfig;
use crate::crawler::parser::extract_text;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors a fetch can end with
///
/// The coordinator treats all of them the same way: log and drop.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got '{content_type}'")]
    ContentMismatch { url: String, content_type: String },

    #[error("No text content extracted from {url}")]
    EmptyContent { url: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Retrieves a page and returns its extracted text
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the text to cache
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use pagecache::config::FetcherConfig;
/// use pagecache::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Unparseable URL or non-HTTP(S) scheme | `InvalidUrl` |
    /// | Connection refused, DNS or TLS failure | `Request` |
    /// | Client timeout | `Timeout` |
    /// | Non-2xx status after redirects | `Status` |
    /// | Content-Type not HTML | `ContentMismatch` |
    /// | No text after extraction | `EmptyContent` |
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let text = extract_text(&body);
        if text.is_empty() {
            return Err(FetchError::EmptyContent {
                url: url.to_string(),
            });
        }

        tracing::debug!("Fetched {} ({} bytes of text)", url, text.len());
        Ok(text)
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Returns true for HTML and XHTML media types
fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}
