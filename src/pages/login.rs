//! Login Page

use crate::api::ApiClient;
use crate::guard::Route;
use crate::session::SessionStore;

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";

#[derive(Debug, Default)]
pub struct LoginPage {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
    is_submitting: bool,
    error: Option<String>,
}

impl LoginPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// An operator who is already signed in skips the form.
    pub fn on_mount(&self, session: &SessionStore) -> Option<Route> {
        match session.token() {
            Ok(Some(_)) => Some(Route::Home),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not read session on login mount: {}", e);
                None
            }
        }
    }

    /// Exchange the entered credentials for a token and store it.
    ///
    /// Returns the route to show next on success. Ignored while a previous
    /// submission is still in flight.
    pub async fn submit(&mut self, client: &ApiClient, session: &SessionStore) -> Option<Route> {
        if self.is_submitting {
            tracing::debug!("Login already in flight, ignoring submit");
            return None;
        }

        self.error = None;
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            self.error = Some("Email and password are required.".to_string());
            return None;
        }

        self.is_submitting = true;
        let result = client.login(&email, &self.password).await;
        self.is_submitting = false;

        let token = match result {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Login failed: {}", e);
                self.error = Some(e.user_message(LOGIN_FAILED));
                return None;
            }
        };

        if let Err(e) = session.set_token(&token, self.remember_me) {
            tracing::error!("Failed to store session token: {}", e);
            self.error = Some(LOGIN_FAILED.to_string());
            return None;
        }

        self.password.clear();
        tracing::info!(remember_me = self.remember_me, "Logged in as {}", email);
        Some(Route::Home)
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn dismiss(&mut self) {
        self.error = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, StubApi};
    use serde_json::json;
    use std::sync::Arc;

    fn page(email: &str, password: &str, remember_me: bool) -> LoginPage {
        LoginPage {
            email: email.to_string(),
            password: password.to_string(),
            remember_me,
            ..LoginPage::default()
        }
    }

    #[tokio::test]
    async fn test_successful_login_stores_token() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/users/login", 200, json!({"token": "tok-1"}));
        let base = stub.serve().await;

        let session = Arc::new(SessionStore::in_memory());
        let client = client_for(&base, session.clone());

        let mut login = page("owner@shop.ph", "secret", true);
        assert_eq!(login.submit(&client, &session).await, Some(Route::Home));
        assert_eq!(session.token().unwrap().as_deref(), Some("tok-1"));
        assert!(session.cookies().cookie("token").unwrap().expires.is_some());
        assert!(!login.is_submitting());
        assert!(login.password.is_empty());

        let sent = stub.requests_to("POST", "/api/users/login");
        assert_eq!(sent[0].body, Some(json!({"email": "owner@shop.ph", "password": "secret"})));
        assert_eq!(sent[0].authorization, None);
    }

    #[tokio::test]
    async fn test_without_remember_me_token_is_session_only() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/users/login", 200, json!({"token": "tok-2"}));
        let base = stub.serve().await;

        let session = Arc::new(SessionStore::in_memory());
        let client = client_for(&base, session.clone());

        let mut login = page("owner@shop.ph", "secret", false);
        login.submit(&client, &session).await;
        assert!(session.cookies().cookie("token").unwrap().is_session());
    }

    #[tokio::test]
    async fn test_failure_uses_server_message_or_fallback() {
        let stub = StubApi::new();
        stub.respond("POST", "/api/users/login", 401, json!({"message": "Invalid credentials"}));
        stub.respond("POST", "/api/users/login", 500, json!({}));
        let base = stub.serve().await;

        let session = Arc::new(SessionStore::in_memory());
        let client = client_for(&base, session.clone());
        let mut login = page("owner@shop.ph", "wrong", false);

        assert_eq!(login.submit(&client, &session).await, None);
        assert_eq!(login.error(), Some("Invalid credentials"));

        assert_eq!(login.submit(&client, &session).await, None);
        assert_eq!(login.error(), Some(LOGIN_FAILED));
        assert!(!login.is_submitting());
        assert!(session.token().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_uses_fallback() {
        let session = Arc::new(SessionStore::in_memory());
        let client = client_for("http://127.0.0.1:1", session.clone());

        let mut login = page("owner@shop.ph", "secret", false);
        assert_eq!(login.submit(&client, &session).await, None);
        assert_eq!(login.error(), Some(LOGIN_FAILED));

        login.dismiss();
        assert!(login.error().is_none());
    }

    #[tokio::test]
    async fn test_blank_fields_and_duplicate_submit_send_nothing() {
        let stub = StubApi::new();
        let base = stub.serve().await;
        let session = Arc::new(SessionStore::in_memory());
        let client = client_for(&base, session.clone());

        let mut login = page("  ", "secret", false);
        assert_eq!(login.submit(&client, &session).await, None);
        assert!(login.error().is_some());

        let mut login = page("owner@shop.ph", "secret", false);
        login.is_submitting = true;
        assert_eq!(login.submit(&client, &session).await, None);

        assert!(stub.requests().is_empty());
    }

    #[test]
    fn test_mount_redirects_when_signed_in() {
        let session = SessionStore::in_memory();
        let login = LoginPage::new();
        assert_eq!(login.on_mount(&session), None);

        session.set_token("tok", false).unwrap();
        assert_eq!(login.on_mount(&session), Some(Route::Home));
    }
}
