//! Route handlers
//!
//! Handlers are thin: they pull parameters out of the request and hand them
//! to the dispatcher or the report renderer. Every core route answers 200.

use crate::output::{access_report, cache_report};
use crate::server::AppState;
use axum::extract::{RawQuery, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Query parameters of `/crawl`
///
/// Both are optional. A missing `url` is the empty key; `isPaying` is true
/// only for the exact string `true`. When a key repeats, the first value
/// wins, so no query string can make the route reject a request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CrawlParams {
    pub url: String,
    pub is_paying: Option<String>,
}

impl CrawlParams {
    /// Parses a raw `application/x-www-form-urlencoded` query string
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let mut url = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "url" if url.is_none() => url = Some(value.into_owned()),
                "isPaying" if params.is_paying.is_none() => {
                    params.is_paying = Some(value.into_owned())
                }
                _ => {}
            }
        }

        params.url = url.unwrap_or_default();
        params
    }

    /// Interprets `isPaying`
    pub fn is_paying(&self) -> bool {
        self.is_paying.as_deref() == Some("true")
    }
}

/// Builds the application router
///
/// # Arguments
///
/// * `state` - Shared handler state
/// * `static_dir` - Directory served under `/static/`
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/crawl", get(crawl_handler))
        .route("/view", get(view_handler))
        .route("/accesslog", get(access_log_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn crawl_handler(State(state): State<AppState>, RawQuery(query): RawQuery) -> String {
    let params = CrawlParams::from_query(query.as_deref());
    state
        .dispatcher
        .crawl(&params.url, params.is_paying())
        .into_body()
}

async fn view_handler(State(state): State<AppState>) -> Html<String> {
    Html(cache_report(state.dispatcher.store()))
}

async fn access_log_handler(State(state): State<AppState>) -> Html<String> {
    Html(access_report(state.dispatcher.ledger()))
}
