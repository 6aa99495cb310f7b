//! Key/value store port
//!
//! Raw string storage under string keys. Envelope and versioning policy
//! live in [`PersistedState`](crate::persistence::PersistedState).

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by a [`StateStore`] backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent string storage
///
/// Writes replace the whole value. Each key is owned by one writer; last
/// write wins.
pub trait StateStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store poisoned".to_string()))
    }
}

impl StateStore for InMemoryStateStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        self.entries()?.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries()?.remove(key);
        Ok(())
    }
}
