//! Stub income API for tests.
//!
//! An in-process axum server that answers from canned responses and records
//! every request it receives.

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::session::SessionStore;

/// One request as the stub saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: Option<Value>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(String, String), VecDeque<Canned>>,
    requests: Vec<Recorded>,
}

/// Canned responses are keyed by method and path (query ignored). When
/// several are queued for a key they are served in order and the last one
/// repeats.
#[derive(Clone, Default)]
pub struct StubApi {
    inner: Arc<Mutex<Inner>>,
}

impl StubApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, status, Some(body), None)
    }

    pub fn respond_empty(&self, method: &str, path: &str, status: u16) -> &Self {
        self.push(method, path, status, None, None)
    }

    pub fn respond_slowly(&self, method: &str, path: &str, delay: Duration, body: Value) -> &Self {
        self.push(method, path, 200, Some(body), Some(delay))
    }

    fn push(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: Option<Value>,
        delay: Option<Duration>,
    ) -> &Self {
        let canned = Canned {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            delay,
        };
        self.inner
            .lock()
            .unwrap()
            .routes
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(canned);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Bind to an ephemeral port and serve in the background; returns the
    /// base URL.
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }
}

async fn handle(
    State(stub): State<StubApi>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let canned = {
        let mut inner = stub.inner.lock().unwrap();
        inner.requests.push(Recorded {
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
            body: serde_json::from_str(&body).ok(),
        });

        let key = (method.as_str().to_string(), uri.path().to_string());
        match inner.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    let Some(canned) = canned else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))).into_response();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    match canned.body {
        Some(body) => (canned.status, Json(body)).into_response(),
        None => canned.status.into_response(),
    }
}

/// Client with the default timeout pointed at `base_url`
pub fn client_for(base_url: &str, session: Arc<SessionStore>) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    };
    ApiClient::new(&config, session).unwrap()
}

/// Income record in wire format
pub fn record_json(id: &str, source: &str, heads: u32, income: f64, created_at: &str) -> Value {
    json!({
        "_id": id,
        "source": source,
        "numberOfHeads": heads,
        "income": income,
        "ownerShare": income * 0.3,
        "createdAt": created_at,
    })
}
