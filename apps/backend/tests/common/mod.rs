//! Test infrastructure for Moovi backend integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` running the
//! production router, and a `MockTmdb` upstream: an axum server on an
//! ephemeral port that replays canned JSON and records every request.

use axum::{
    extract::{Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use axum_test::TestServer;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use moovi::config::{Config, ImagesConfig, ServerConfig, TmdbConfig};
use moovi::AppState;

/// Token the test app is configured with.
pub const TEST_TOKEN: &str = "test-read-access-token";

/// Image CDN root used in assertions.
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// A request received by the mock upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path relative to the API root, e.g. `/movie/550`.
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<HashMap<String, (StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Stand-in for the TMDB API.
pub struct MockTmdb {
    base_url: String,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockTmdb {
    /// Start the mock on an ephemeral local port.
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(replay).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().expect("Mock upstream has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock upstream crashed");
        });

        Self {
            base_url: format!("http://{}/3", addr),
            state,
            handle,
        }
    }

    /// API root to configure the client with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serve `body` with 200 for `path`.
    pub fn respond(&self, path: &str, body: Value) {
        self.respond_with(path, StatusCode::OK, body);
    }

    /// Serve `body` with the given status for `path`.
    pub fn respond_with(&self, path: &str, status: StatusCode, body: Value) {
        self.state
            .routes
            .lock()
            .expect("routes lock poisoned")
            .insert(path.to_string(), (status, body));
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .len()
    }

    /// The single recorded request for `path`.
    pub fn request_for(&self, path: &str) -> RecordedRequest {
        let matching: Vec<_> = self
            .requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect();
        assert_eq!(matching.len(), 1, "expected one request to {}", path);
        matching.into_iter().next().expect("checked above")
    }
}

impl Drop for MockTmdb {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn replay(
    State(state): State<MockState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/3")
        .unwrap_or(uri.path())
        .to_string();

    state
        .requests
        .lock()
        .expect("requests lock poisoned")
        .push(RecordedRequest {
            path: path.clone(),
            query,
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });

    let canned = state
        .routes
        .lock()
        .expect("routes lock poisoned")
        .get(&path)
        .cloned();

    match canned {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "success": false,
                "status_code": 34,
                "status_message": "The resource you requested could not be found."
            })),
        )
            .into_response(),
    }
}

/// Test application wrapper around axum_test::TestServer.
pub struct TestApp {
    server: TestServer,
    upstream: MockTmdb,
}

impl TestApp {
    /// Create a test application with a configured token pointing at a fresh mock upstream.
    pub async fn new() -> Self {
        Self::build(Some(TEST_TOKEN)).await
    }

    /// Create a test application with no access token configured.
    ///
    /// The mock upstream still runs so tests can assert it was never contacted.
    pub async fn without_token() -> Self {
        Self::build(None).await
    }

    async fn build(token: Option<&str>) -> Self {
        let upstream = MockTmdb::start().await;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: Vec::new(),
            },
            tmdb: TmdbConfig {
                access_token: token.map(str::to_string),
                base_url: upstream.base_url().to_string(),
                timeout_secs: 5,
            },
            images: ImagesConfig {
                base_url: IMAGE_BASE.to_string(),
                ..Default::default()
            },
        };

        let app = moovi::app(AppState::new(config));
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, upstream }
    }

    /// Get a reference to the test server.
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    /// Get a reference to the mock upstream.
    pub fn upstream(&self) -> &MockTmdb {
        &self.upstream
    }
}

/// Absolute CDN URL for `size` and a relative path.
#[allow(dead_code)]
pub fn image(size: &str, path: &str) -> String {
    format!("{}/{}{}", IMAGE_BASE, size, path)
}

/// A page of upstream results.
#[allow(dead_code)]
pub fn page_of(results: Vec<Value>, page: u32, total_pages: u32, total_results: u32) -> Value {
    serde_json::json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_results
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_endpoint() {
        let app = TestApp::new().await;
        let response = app.server().get("/health").await;

        response.assert_status_ok();
        response.assert_json_contains(&serde_json::json!({
            "message": "Moovi backend is running",
            "upstream_configured": true
        }));
        assert_eq!(app.upstream().request_count(), 0);
    }

    #[tokio::test]
    async fn test_health_check_without_token() {
        let app = TestApp::without_token().await;
        let response = app.server().get("/health").await;

        response.assert_status_ok();
        response.assert_json_contains(&serde_json::json!({ "upstream_configured": false }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = TestApp::new().await;
        let response = app.server().get("/api/nope").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Not found");
    }
}
