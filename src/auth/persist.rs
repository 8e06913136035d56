//! Persisted client-side auth storage
//!
//! A single key holds `{ "token": ..., "model": ... }`. It is written on every
//! auth change that leaves both a token and a record, and removed otherwise.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::auth::models::AuthRecord;
use crate::auth::store::{AuthStore, Subscription};
use crate::error::Result;

/// String key-value storage, shaped like a browser's `localStorage`
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Storage backed by a JSON object file. The file is created on first write.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Non-string values come back as raw JSON so callers can reject them
        Ok(self.read_all()?.get(key).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A corrupt file is replaced rather than blocking every future write
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.read_all() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    self.write_all(&entries)?;
                }
            }
            Err(e) => {
                warn!("Resetting unreadable storage file {}: {}", self.path.display(), e);
                self.write_all(&Map::new())?;
            }
        }
        Ok(())
    }
}

/// In-process storage
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Value stored under the persisted auth key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub token: String,
    #[serde(default, alias = "record")]
    pub model: Option<AuthRecord>,
}

/// Glue between a token store and a [`KeyValueStorage`]
pub struct PersistedAuth;

impl PersistedAuth {
    /// Load a persisted session into the store.
    ///
    /// Returns whether a session was restored. An entry that cannot be read or
    /// parsed is treated as no session and deleted.
    pub fn restore(storage: &dyn KeyValueStorage, key: &str, store: &AuthStore) -> Result<bool> {
        let raw = match storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(false),
            Err(e) => {
                warn!("Failed to read persisted auth: {}", e);
                storage.remove(key)?;
                return Ok(false);
            }
        };

        match serde_json::from_str::<PersistedSession>(&raw) {
            Ok(session) => {
                debug!("Restored persisted session");
                store.save(session.token, session.model);
                Ok(true)
            }
            Err(e) => {
                warn!("Failed to restore auth: {}", e);
                storage.remove(key)?;
                Ok(false)
            }
        }
    }

    /// Mirror every store change into storage
    pub fn attach(storage: Arc<dyn KeyValueStorage>, key: &str, store: &AuthStore) -> Subscription {
        let key = key.to_string();
        store.on_change(move |snapshot| {
            let result = match (&snapshot.record, snapshot.has_token()) {
                (Some(record), true) => {
                    let session = PersistedSession {
                        token: snapshot.token.clone(),
                        model: Some(record.clone()),
                    };
                    serde_json::to_string(&session)
                        .map_err(Into::into)
                        .and_then(|value| storage.set(&key, &value))
                }
                _ => storage.remove(&key),
            };

            if let Err(e) = result {
                warn!("Failed to persist auth state: {}", e);
            }
        })
    }
}
