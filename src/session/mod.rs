//! Session Store
//!
//! Holds the operator's bearer token. The token lives in a cookie jar named
//! after the browser mechanism it replaces; a legacy key/value store is kept
//! as a read fallback for tokens written by older clients.
//!
//! The store is shared explicitly (`Arc<SessionStore>`) with the request
//! gateway and the route guard.
//!
//! # Example
//!
//! ```rust
//! use barbershop::session::SessionStore;
//!
//! let session = SessionStore::in_memory();
//! session.set_token("abc123", false).unwrap();
//! assert_eq!(session.token().unwrap().as_deref(), Some("abc123"));
//!
//! session.clear_all().unwrap();
//! assert!(session.token().unwrap().is_none());
//! ```

mod cookie_jar;
mod local_storage;

pub use cookie_jar::{Cookie, CookieJar};
pub use local_storage::LocalStorage;

use chrono::{Duration, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::SessionConfig;

/// A place a credential may be kept.
///
/// Logout walks every implementation, so any new storage location must
/// implement this trait to be cleared.
pub trait CredentialStore: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Session storage errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to access credential store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credential store {path:?} is corrupt: {error}")]
    Corrupt { path: PathBuf, error: String },
}

/// Bearer-token storage shared by the gateway and the route guard
pub struct SessionStore {
    cookies: CookieJar,
    local: LocalStorage,
    cookie_name: String,
    remember_for: Duration,
}

impl SessionStore {
    pub fn new(
        cookies: CookieJar,
        local: LocalStorage,
        cookie_name: impl Into<String>,
        remember_days: i64,
    ) -> Self {
        Self {
            cookies,
            local,
            cookie_name: cookie_name.into(),
            remember_for: Duration::days(remember_days),
        }
    }

    /// Open the on-disk stores described by `config`, creating the data
    /// directory if needed.
    pub fn open(config: &SessionConfig) -> Result<Self, SessionError> {
        let dir = PathBuf::from(&config.data_dir);
        std::fs::create_dir_all(&dir).map_err(|source| SessionError::Io {
            path: dir.clone(),
            source,
        })?;

        let cookies = CookieJar::open(config.cookie_path())?;
        let local = LocalStorage::open(config.local_storage_path())?;

        tracing::debug!("Opened session store in {:?}", dir);
        Ok(Self::new(cookies, local, &config.cookie_name, config.remember_days))
    }

    /// Store with no disk backing (tests, throwaway sessions)
    pub fn in_memory() -> Self {
        Self::new(CookieJar::in_memory(), LocalStorage::in_memory(), "token", 7)
    }

    /// Save a freshly issued token.
    ///
    /// A persistent token gets a cookie expiring after the remember period;
    /// otherwise it is a session cookie that ends with the process.
    pub fn set_token(&self, token: &str, persistent: bool) -> Result<(), SessionError> {
        let expires = persistent.then(|| Utc::now() + self.remember_for);
        self.cookies.set(&self.cookie_name, token, expires)?;

        // A stale legacy token must not resurface once this cookie ends.
        self.local.remove(&self.cookie_name)?;

        tracing::info!(persistent, "Session token stored");
        Ok(())
    }

    /// Current token: the cookie first, then the legacy fallback.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        for store in self.stores() {
            if let Some(token) = store.get(&self.cookie_name)? {
                if !token.is_empty() {
                    return Ok(Some(token));
                }
            }
        }
        Ok(None)
    }

    /// Remove the token from every storage location.
    ///
    /// Every store is attempted; the first failure is reported afterwards.
    pub fn clear_all(&self) -> Result<(), SessionError> {
        let mut first_error = None;

        for store in self.stores() {
            if let Err(e) = store.remove(&self.cookie_name) {
                tracing::error!("Failed to clear {}: {}", store.name(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!("Session cleared");
                Ok(())
            }
        }
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn local_storage(&self) -> &LocalStorage {
        &self.local
    }

    fn stores(&self) -> [&dyn CredentialStore; 2] {
        [&self.cookies, &self.local]
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write `value` as JSON via a temp file and rename, owner-only on Unix.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), SessionError> {
    let io_err = |source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec_pretty(value).map_err(|e| SessionError::Corrupt {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }

    std::fs::rename(&tmp, path).map_err(io_err)
}

/// Read a JSON file; a missing file yields `T::default()`.
fn read_json_or_default<T>(path: &Path) -> Result<T, SessionError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(T::default()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| SessionError::Corrupt {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(SessionError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> SessionConfig {
        SessionConfig {
            data_dir: dir.to_string_lossy().to_string(),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_empty_store_has_no_token() {
        let session = SessionStore::in_memory();
        assert_eq!(session.token().unwrap(), None);
    }

    #[test]
    fn test_persistent_token_survives_reopen() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        SessionStore::open(&config).unwrap().set_token("durable", true).unwrap();

        let reopened = SessionStore::open(&config).unwrap();
        assert_eq!(reopened.token().unwrap().as_deref(), Some("durable"));

        let cookie = reopened.cookies().cookie("token").unwrap();
        let days = (cookie.expires.unwrap() - Utc::now()).num_days();
        assert!((6..=7).contains(&days));
    }

    #[test]
    fn test_session_token_ends_with_process() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let session = SessionStore::open(&config).unwrap();
        session.set_token("ephemeral", false).unwrap();
        assert_eq!(session.token().unwrap().as_deref(), Some("ephemeral"));

        let reopened = SessionStore::open(&config).unwrap();
        assert_eq!(reopened.token().unwrap(), None);
    }

    #[test]
    fn test_legacy_fallback_is_read() {
        let session = SessionStore::in_memory();
        session.local_storage().set("token", "legacy").unwrap();
        assert_eq!(session.token().unwrap().as_deref(), Some("legacy"));
    }

    #[test]
    fn test_cookie_wins_over_legacy_and_replaces_it() {
        let session = SessionStore::in_memory();
        session.local_storage().set("token", "legacy").unwrap();
        session.set_token("fresh", false).unwrap();

        assert_eq!(session.token().unwrap().as_deref(), Some("fresh"));
        assert_eq!(session.local_storage().get("token").unwrap(), None);
    }

    #[test]
    fn test_clear_all_clears_every_store() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());

        let session = SessionStore::open(&config).unwrap();
        session.set_token("durable", true).unwrap();
        session.local_storage().set("token", "legacy").unwrap();

        session.clear_all().unwrap();

        assert_eq!(session.token().unwrap(), None);
        assert_eq!(session.cookies().get("token").unwrap(), None);
        assert_eq!(session.local_storage().get("token").unwrap(), None);

        // Nothing left on disk either
        let reopened = SessionStore::open(&config).unwrap();
        assert_eq!(reopened.token().unwrap(), None);
        let cookies = std::fs::read_to_string(config.cookie_path()).unwrap();
        let local = std::fs::read_to_string(config.local_storage_path()).unwrap();
        assert!(!cookies.contains("durable"));
        assert!(!local.contains("legacy"));
    }

    #[test]
    fn test_empty_token_reads_as_absent() {
        let session = SessionStore::in_memory();
        session.set_token("", false).unwrap();
        assert_eq!(session.token().unwrap(), None);
    }

    #[test]
    fn test_corrupt_jar_is_reported() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        std::fs::write(config.cookie_path(), b"{not json").unwrap();

        let err = SessionStore::open(&config).err().unwrap();
        assert!(matches!(err, SessionError::Corrupt { .. }));
    }
}
