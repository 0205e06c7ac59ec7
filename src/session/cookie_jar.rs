//! Cookie Jar
//!
//! Named cookies with optional expiry. Only cookies carrying an expiry are
//! written to disk; session cookies stay in memory and end with the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{lock, read_json_or_default, write_json_atomic, CredentialStore, SessionError};

/// A stored cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    pub fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(false, |expires| expires <= now)
    }
}

/// Cookie storage, optionally backed by a JSON file
pub struct CookieJar {
    path: Option<PathBuf>,
    cookies: Mutex<BTreeMap<String, Cookie>>,
}

impl CookieJar {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            cookies: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load durable cookies from `path`, dropping any that have expired.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let mut cookies: BTreeMap<String, Cookie> = read_json_or_default(&path)?;

        let now = Utc::now();
        let before = cookies.len();
        cookies.retain(|_, cookie| !cookie.is_session() && !cookie.is_expired_at(now));
        if cookies.len() != before {
            tracing::debug!("Dropped {} expired cookie(s) from {:?}", before - cookies.len(), path);
        }

        Ok(Self {
            path: Some(path),
            cookies: Mutex::new(cookies),
        })
    }

    pub fn set(
        &self,
        name: &str,
        value: &str,
        expires: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError> {
        self.update(|cookies| {
            cookies.insert(
                name.to_string(),
                Cookie {
                    value: value.to_string(),
                    expires,
                },
            );
        })
    }

    /// Full cookie, if present and not expired
    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        let cookies = lock(&self.cookies);
        cookies
            .get(name)
            .filter(|cookie| !cookie.is_expired_at(Utc::now()))
            .cloned()
    }

    pub fn get(&self, name: &str) -> Result<Option<String>, SessionError> {
        match lock(&self.cookies).get(name) {
            None => return Ok(None),
            Some(cookie) if !cookie.is_expired_at(Utc::now()) => {
                return Ok(Some(cookie.value.clone()));
            }
            Some(_) => {}
        }

        self.update(|cookies| {
            let now = Utc::now();
            cookies.retain(|key, cookie| key != name || !cookie.is_expired_at(now));
        })?;
        tracing::debug!("Cookie '{}' expired", name);
        Ok(None)
    }

    pub fn remove(&self, name: &str) -> Result<(), SessionError> {
        self.update(|cookies| {
            cookies.remove(name);
        })
    }

    /// Apply `change` to a copy, write it, and only then keep it.
    ///
    /// A failed write leaves memory matching the file.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, Cookie>)) -> Result<(), SessionError> {
        let mut cookies = lock(&self.cookies);
        let mut next = cookies.clone();
        change(&mut next);
        self.persist(&next)?;
        *cookies = next;
        Ok(())
    }

    fn persist(&self, cookies: &BTreeMap<String, Cookie>) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let durable: BTreeMap<&String, &Cookie> = cookies
            .iter()
            .filter(|(_, cookie)| !cookie.is_session())
            .collect();

        write_json_atomic(path, &durable)
    }
}

impl CredentialStore for CookieJar {
    fn name(&self) -> &'static str {
        "cookie jar"
    }

    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        CookieJar::get(self, key)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        CookieJar::remove(self, key)
    }
}
