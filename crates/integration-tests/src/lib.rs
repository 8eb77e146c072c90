//! Integration tests for the Autopeças client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p autopecas-integration-tests
//! ```
//!
//! No database or backend is needed: each test starts a [`MockBackend`], an
//! in-process axum server on an ephemeral port that answers canned
//! responses and records every request it receives.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use autopecas_client::{ApiClient, ClientConfig, Session};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Canned answer for one route.
#[derive(Debug, Clone)]
pub enum MockBody {
    Json(Value),
    Text(String),
    Empty,
}

/// A method + path the mock answers, and what it answers with.
#[derive(Debug, Clone)]
pub struct MockRoute {
    method: Method,
    path: String,
    status: StatusCode,
    body: MockBody,
}

impl MockRoute {
    /// Answer `method path` with a JSON body.
    ///
    /// A `status` outside `100..=999` is answered as `500`.
    #[must_use]
    pub fn json(method: &str, path: &str, status: u16, body: Value) -> Self {
        Self::new(method, path, status, MockBody::Json(body))
    }

    /// Answer `method path` with a plain-text body.
    #[must_use]
    pub fn text(method: &str, path: &str, status: u16, body: &str) -> Self {
        Self::new(method, path, status, MockBody::Text(body.to_string()))
    }

    /// Answer `method path` with no body.
    #[must_use]
    pub fn empty(method: &str, path: &str, status: u16) -> Self {
        Self::new(method, path, status, MockBody::Empty)
    }

    fn new(method: &str, path: &str, status: u16, body: MockBody) -> Self {
        Self {
            method: Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET),
            path: path.to_string(),
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        }
    }
}

/// A request as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Raw `Authorization` header.
    pub authorization: Option<String>,
    /// JSON body, `None` when empty.
    pub body: Option<Value>,
}

#[derive(Clone)]
struct MockState {
    routes: Arc<Vec<MockRoute>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process backend listening on `127.0.0.1`.
///
/// The server task is aborted when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start a server answering `routes`; anything else gets a `404` with
    /// `{"error": "Not found"}`.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn start(routes: Vec<MockRoute>) -> io::Result<Self> {
        let state = MockState {
            routes: Arc::new(routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = Arc::clone(&state.requests);

        let app = Router::new().fallback(handle).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            requests,
            server,
        })
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client(&self, session: Session) -> autopecas_client::Result<ApiClient> {
        let config = ClientConfig::for_url(&self.api_url())?;
        ApiClient::new(&config, session)
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    };
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(recorded);

    let Some(route) = state
        .routes
        .iter()
        .find(|route| route.method == method && route.path == uri.path())
    else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"error": "Not found"})),
        )
            .into_response();
    };

    match &route.body {
        MockBody::Json(value) => (route.status, axum::Json(value.clone())).into_response(),
        MockBody::Text(text) => (route.status, text.clone()).into_response(),
        MockBody::Empty => route.status.into_response(),
    }
}
