//! Integration tests for the page cache
//!
//! These tests use wiremock to stand in for remote sites and drive the full
//! router, from `/crawl` through the HTTP fetcher into the cache and reports.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pagecache::cache::SystemClock;
use pagecache::config::{Config, FetcherConfig};
use pagecache::crawler::{FetchError, Fetcher, HttpFetcher, IN_PROGRESS_MESSAGE};
use pagecache::server::{build_router, run, AppState};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><head><title>Home</title><script>ignored()</script></head>
<body><h1>Welcome</h1><p>Cached   content</p></body></html>"#;

fn test_config() -> Config {
    let mut config = Config::default();
    config.fetcher = FetcherConfig {
        crawler_name: "TestBot".to_string(),
        timeout_secs: 5,
        ..FetcherConfig::default()
    };
    config
}

fn http_state(config: &Config) -> AppState {
    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    AppState::new(config, Arc::new(fetcher), Arc::new(SystemClock))
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("Request failed");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, String::from_utf8(body.to_vec()).expect("Body is not UTF-8"))
}

fn crawl_uri(url: &str) -> String {
    format!(
        "/crawl?url={}&isPaying=false",
        url::form_urlencoded::byte_serialize(url.as_bytes()).collect::<String>()
    )
}

/// Waits until every spawned fetch has finished
async fn settle(state: &AppState) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while state.dispatcher.coordinator().in_flight_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("Fetches did not finish in time");
}

#[tokio::test]
async fn test_http_fetcher_extracts_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(PAGE))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_config().fetcher).unwrap();
    let text = fetcher
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch should succeed");

    assert_eq!(text, "Home Welcome Cached content");
}

#[tokio::test]
async fn test_http_fetcher_classifies_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(html_page("<html><body>  </body></html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_config().fetcher).unwrap();
    let base = mock_server.uri();

    let result = fetcher.fetch(&format!("{}/missing", base)).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));

    let result = fetcher.fetch(&format!("{}/data.json", base)).await;
    assert!(matches!(result, Err(FetchError::ContentMismatch { .. })));

    let result = fetcher.fetch(&format!("{}/blank", base)).await;
    assert!(matches!(result, Err(FetchError::EmptyContent { .. })));
}

#[tokio::test]
async fn test_http_fetcher_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page(PAGE).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        timeout_secs: 1,
        ..FetcherConfig::default()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    let result = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_full_crawl_cycle() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page(PAGE))
        .mount(&mock_server)
        .await;

    let config = test_config();
    let state = http_state(&config);
    let router = build_router(state.clone(), Path::new(&config.server.static_dir));
    let url = format!("{}/page", mock_server.uri());

    // First request: miss, placeholder returned immediately
    let (status, body) = get(&router, &crawl_uri(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, IN_PROGRESS_MESSAGE);

    settle(&state).await;

    // Second request: served from the cache
    let (status, body) = get(&router, &crawl_uri(&url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Home Welcome Cached content");

    // Third request: still cached, no new fetch
    let (_, body) = get(&router, &crawl_uri(&url)).await;
    assert_eq!(body, "Home Welcome Cached content");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    // The view lists the URL exactly once
    let (status, view) = get(&router, "/view").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view.matches("<div class='entry'>").count(), 1);
    assert!(view.contains(&url));

    // The access log holds one record per crawl request
    let (status, log) = get(&router, "/accesslog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(log.matches("<h2>").count(), 1);
    assert_eq!(log.matches("<li>").count(), 3);
}

#[tokio::test]
async fn test_failing_url_stays_in_progress() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = test_config();
    let state = http_state(&config);
    let router = build_router(state.clone(), Path::new(&config.server.static_dir));
    let url = format!("{}/broken", mock_server.uri());

    for _ in 0..3 {
        let (_, body) = get(&router, &crawl_uri(&url)).await;
        assert_eq!(body, IN_PROGRESS_MESSAGE);
        settle(&state).await;
    }

    // Every miss retried the fetch, none of them cached anything
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
    assert!(state.dispatcher.store().is_empty());
    assert_eq!(state.dispatcher.ledger().records_for(&url).len(), 3);

    let (_, view) = get(&router, "/view").await;
    assert_eq!(view.matches("<div class='entry'>").count(), 0);
}

#[tokio::test]
async fn test_concurrent_misses_fetch_once() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(PAGE).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let config = test_config();
    let state = http_state(&config);
    let router = build_router(state.clone(), Path::new(&config.server.static_dir));
    let url = format!("{}/slow", mock_server.uri());

    let requests: Vec<_> = (0..10)
        .map(|_| {
            let router = router.clone();
            let uri = crawl_uri(&url);
            tokio::spawn(async move { get(&router, &uri).await })
        })
        .collect();

    for request in requests {
        let (status, body) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, IN_PROGRESS_MESSAGE);
    }

    settle(&state).await;

    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    assert_eq!(state.dispatcher.ledger().records_for(&url).len(), 10);

    let (_, body) = get(&router, &crawl_uri(&url)).await;
    assert_eq!(body, "Home Welcome Cached content");
}

#[tokio::test]
async fn test_concurrent_misses_without_dedup_fetch_each_time() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(PAGE).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let mut config = test_config();
    config.fetcher.deduplicate_in_flight = false;
    let state = http_state(&config);
    let router = build_router(state.clone(), Path::new(&config.server.static_dir));
    let url = format!("{}/slow", mock_server.uri());

    for _ in 0..5 {
        let (_, body) = get(&router, &crawl_uri(&url)).await;
        assert_eq!(body, IN_PROGRESS_MESSAGE);
    }

    settle(&state).await;

    assert_eq!(mock_server.received_requests().await.unwrap().len(), 5);
    assert_eq!(state.dispatcher.store().len(), 1);
}

/// Stands in for a fetcher that must never be reached
struct UnreachableFetcher;

#[async_trait::async_trait]
impl Fetcher for UnreachableFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "test fetcher".to_string(),
        })
    }
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();

    let state = AppState::new(
        &Config::default(),
        Arc::new(UnreachableFetcher),
        Arc::new(SystemClock),
    );
    let router = build_router(state, dir.path());

    let (status, body) = get(&router, "/static/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body { margin: 0; }");

    let (status, _) = get(&router, "/static/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_over_tcp() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page(PAGE))
        .mount(&mock_server)
        .await;

    let config = test_config();
    let state = http_state(&config);
    let router = build_router(state.clone(), Path::new(&config.server.static_dir));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(run(listener, router));

    let client = reqwest::Client::new();
    let endpoint = format!("http://{}/crawl", addr);
    let target = format!("{}/page", mock_server.uri());

    let body = client
        .get(&endpoint)
        .query(&[("url", target.as_str()), ("isPaying", "true")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, IN_PROGRESS_MESSAGE);

    settle(&state).await;

    let body = client
        .get(&endpoint)
        .query(&[("url", target.as_str())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Home Welcome Cached content");

    server.abort();
}
