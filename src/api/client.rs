//! Request Gateway
//!
//! The single HTTP client every view goes through. It fixes the base URL,
//! timeout and JSON content type, and runs the interceptors (bearer auth by
//! default) before each request is sent.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::session::SessionStore;

/// Hook run on every outbound request before it is sent.
///
/// An error aborts the request and is returned to the caller as is.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError>;
}

/// Attaches `Authorization: Bearer <token>` when a session exists.
pub struct BearerAuth {
    session: Arc<SessionStore>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

impl Interceptor for BearerAuth {
    fn intercept(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match self.session.token()? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }
}

/// Income API client
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    session: Arc<SessionStore>,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl ApiClient {
    /// Create the client with bearer auth drawn from `session`
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            interceptors: vec![Box::new(BearerAuth::new(Arc::clone(&session)))],
            session,
        })
    }

    /// Append an interceptor; it runs after the ones already installed
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Sending request");
        self.http.request(method, url)
    }

    async fn send<T: DeserializeOwned>(&self, mut request: RequestBuilder) -> Result<T, ApiError> {
        for interceptor in &self.interceptors {
            request = interceptor.intercept(request)?;
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            tracing::debug!("Request failed: {}", err);
            return Err(err);
        }

        decode_body(&body)
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(error)
        }
    }
}

/// Decode a success body; an empty body reads as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let result = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_str("null")
    } else {
        serde_json::from_slice(body)
    };

    result.map_err(|e| ApiError::Decode(e.to_string()))
}
