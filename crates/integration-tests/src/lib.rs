//! Integration test support for Nijitter.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nijitter-integration-tests
//!
//! # Database-backed tests (need MySQL and DATABASE_URL)
//! cargo test -p nijitter-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `client_*` - REST client against an in-process mock backend
//! - `web_*` - Page-shell routes exercised with `tower::ServiceExt::oneshot`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use nijitter_client::{ClientConfig, MemoryStore, Navigator, NijitterApi};
use nijitter_core::Location;
use nijitter_web::config::{SlackConfig, WebConfig};
use nijitter_web::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

// =============================================================================
// Mock REST backend
// =============================================================================

/// A request received by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

type RequestLog = Arc<Mutex<Vec<RecordedRequest>>>;

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(String::from),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: bytes.clone(),
    };
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// An axum router standing in for the REST backend, bound to `127.0.0.1:0`.
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    log: RequestLog,
}

impl MockBackend {
    /// Serve `router` on an ephemeral port, recording every request.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(router: Router) -> Self {
        let log = RequestLog::default();
        let app = router.layer(from_fn_with_state(log.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self { addr, log }
    }

    /// Base URL of the backend.
    ///
    /// # Panics
    ///
    /// Panics if the address does not form a URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("mock backend URL")
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

// =============================================================================
// Client under test
// =============================================================================

/// Navigator that records every redirect and alert.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<Location>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn navigations(&self) -> Vec<Location> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, location: &Location) {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.clone());
    }

    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// A client wired to a mock backend, with its store and navigator exposed.
#[derive(Debug, Clone)]
pub struct TestClient {
    pub api: NijitterApi,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestClient {
    /// Client for `backend` without a stored token.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new(backend: &MockBackend) -> Self {
        Self::with_store(backend, MemoryStore::new())
    }

    /// Client for `backend` holding `token`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn signed_in(backend: &MockBackend, token: &str) -> Self {
        Self::with_store(backend, MemoryStore::with_token(token))
    }

    fn with_store(backend: &MockBackend, store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let navigator = Arc::new(RecordingNavigator::default());
        let api = NijitterApi::new(
            &ClientConfig::new(backend.url()),
            store.clone(),
            navigator.clone(),
        )
        .expect("build client");
        Self {
            api,
            store,
            navigator,
        }
    }

    /// Stored token, exposed for assertions.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        use secrecy::ExposeSecret;
        self.api
            .access_token()
            .map(|t: SecretString| t.expose_secret().to_string())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A carrot as the backend serializes it.
#[must_use]
pub fn carrot_json(id: i64) -> Value {
    json!({
        "id": id,
        "user_id_int": 1,
        "user_id": "usagi",
        "username": "Usagi",
        "icon_path": null,
        "content": format!("carrot {id}"),
        "reply_to": null,
        "created_at": "2024-01-01T00:00:00Z",
        "images": [],
        "is_liked": false
    })
}

/// A profile as the backend serializes it.
#[must_use]
pub fn user_json(handle: &str, is_following: bool) -> Value {
    json!({
        "username": "Usagi",
        "user_id": handle,
        "icon_path": null,
        "bio": "carrots",
        "status_message": null,
        "created_at": "2023-05-01T00:00:00Z",
        "follower_count": 3,
        "following_count": 4,
        "is_following": is_following
    })
}

/// A timeline page of `ids` with an optional next cursor.
#[must_use]
pub fn page_json(ids: &[i64], next_cursor: Option<i64>) -> Value {
    json!({
        "carrots": ids.iter().map(|id| carrot_json(*id)).collect::<Vec<_>>(),
        "next_cursor": next_cursor
    })
}

/// A fresh empty directory under the system temp dir.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[must_use]
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("nijitter-it-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

// =============================================================================
// Web server under test
// =============================================================================

/// Server configuration for tests. Slack calls go to `slack_api_url`.
#[must_use]
pub fn web_config(static_dir: PathBuf, slack_api_url: &str) -> WebConfig {
    WebConfig {
        database_url: SecretString::from("mysql://nijitter@127.0.0.1:3306/nijitter".to_owned()),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        api_url: "https://api.nijitter.test".to_string(),
        image_url: "https://img.nijitter.test".to_string(),
        static_dir,
        slack: SlackConfig {
            client_id: "client-id".to_string(),
            client_secret: SecretString::from("client-secret".to_owned()),
            redirect_url: "https://nijitter.test/signup".to_string(),
            team_id: "T0001".to_string(),
            authorize_url: "https://slack.test/oauth/v2/authorize?client_id=client-id&state=".to_string(),
            api_url: slack_api_url.to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Application state over a lazy pool; no connection is opened unless a
/// handler queries the database.
///
/// # Panics
///
/// Panics if the database URL does not parse.
#[must_use]
pub fn web_state(config: WebConfig) -> AppState {
    let pool =
        nijitter_web::db::create_lazy_pool(&config.database_url).expect("lazy database pool");
    AppState::new(config, pool)
}
