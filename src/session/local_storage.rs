//! Local Storage
//!
//! Plain string key/value storage. Earlier clients kept the token here, so
//! it is still read as a fallback and always cleared on logout.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{lock, read_json_or_default, write_json_atomic, CredentialStore, SessionError};

pub struct LocalStorage {
    path: Option<PathBuf>,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let items = read_json_or_default(&path)?;
        Ok(Self {
            path: Some(path),
            items: Mutex::new(items),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(lock(&self.items).get(key).cloned())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut items = lock(&self.items);
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut items = lock(&self.items);
        if !items.contains_key(key) {
            return Ok(());
        }
        let mut next = items.clone();
        next.remove(key);
        self.persist(&next)?;
        *items = next;
        Ok(())
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), SessionError> {
        match &self.path {
            Some(path) => write_json_atomic(path, items),
            None => Ok(()),
        }
    }
}

impl CredentialStore for LocalStorage {
    fn name(&self) -> &'static str {
        "local storage"
    }

    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        LocalStorage::get(self, key)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        LocalStorage::remove(self, key)
    }
}
