//! API Error Types
//!
//! Failures of a call to the income API, split the way the views report
//! them: the request never completed, or the server answered with an error.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::session::SessionError;

/// Income API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, DNS failure, connection reset...
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// No response within the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server answered with a non-2xx status
    #[error("API error ({status}): {}", describe(.status, .message.as_deref()))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// 2xx response whose body did not match the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// An interceptor could not read the session
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Server message, else the canonical reason phrase for `status`
fn describe(status: &u16, message: Option<&str>) -> String {
    match message {
        Some(message) => message.to_string(),
        None => StatusCode::from_u16(*status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown status")
            .to_string(),
    }
}

impl ApiError {
    /// Build an `Api` error from a non-2xx response body.
    ///
    /// The server's `message` field is kept when present. Without one the
    /// error displays the canonical status text and views fall back to
    /// their own wording.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Text to show the operator: the server's message, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
