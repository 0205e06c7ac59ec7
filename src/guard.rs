//! Route Guard
//!
//! Two routes: the public login page and the authenticated shell. Whether
//! the shell may render is decided from the session store alone; the token
//! is not validated against the server here. An expired or revoked token
//! surfaces later as a 401 from the API.

use std::fmt;
use std::sync::Arc;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Login,
    /// `/Home`
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Home => "/Home",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "" => Some(Route::Login),
            "/Home" => Some(Route::Home),
            _ => None,
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Home)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up on screen
    pub fn route(&self) -> Route {
        match self {
            Navigation::Render(route) | Navigation::Redirect(route) => *route,
        }
    }
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn state(&self) -> AuthState {
        match self.session.token() {
            Ok(Some(_)) => AuthState::Authenticated,
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                tracing::warn!("Could not read session, treating as signed out: {}", e);
                AuthState::Unauthenticated
            }
        }
    }

    pub fn navigate(&self, route: Route) -> Navigation {
        if route.requires_auth() && self.state() == AuthState::Unauthenticated {
            tracing::debug!("Redirecting {} to {}", route, Route::Login);
            return Navigation::Redirect(Route::Login);
        }
        Navigation::Render(route)
    }
}
