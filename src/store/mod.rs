//! Typed persistent settings
//!
//! Values are stored as JSON, one entry per key, through a
//! [`SettingsBackend`]. Reads never fail: an absent or undecodable entry
//! yields the caller's default. Writing a value whose JSON form is `null`
//! (an empty `Option`) removes the key instead of storing `null`.

pub mod backend;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PersistenceError;

pub use backend::{MemoryBackend, SettingsBackend, SqliteBackend};

type Result<T> = std::result::Result<T, PersistenceError>;

/// Serialized access to a settings backend.
///
/// Every operation takes the same lock, so the remove-versus-write decision
/// in [`set`](Self::set) cannot interleave with a concurrent read.
pub struct SettingsStore {
    backend: Mutex<Box<dyn SettingsBackend>>,
}

impl SettingsStore {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Mutex::new(Box::new(backend)),
        }
    }

    /// Open the SQLite-backed store inside `dir`
    pub fn open_in(dir: &Path) -> Result<Self> {
        Ok(Self::new(SqliteBackend::open_in(dir)?))
    }

    /// Non-durable store
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn SettingsBackend>> {
        self.backend
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Read and decode `key`, falling back to `default`
    pub fn get<V: DeserializeOwned>(&self, key: &str, default: V) -> V {
        let raw = match self.lock().read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                warn!("Failed to read setting `{}`: {}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Stored setting `{}` could not be decoded: {}", key, e);
                default
            }
        }
    }

    /// Encode and store `value`; a `null` encoding removes the key
    pub fn set<V: Serialize + ?Sized>(&self, key: &str, value: &V) -> Result<()> {
        let encoded = serde_json::to_value(value).map_err(|e| PersistenceError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let mut backend = self.lock();
        if encoded.is_null() {
            backend.delete(key)?;
        } else {
            backend.write(key, &encoded.to_string())?;
        }
        Ok(())
    }

    /// Remove `key`. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.lock().delete(key)
    }

    /// Remove every key. Returns how many were removed.
    pub fn remove_all(&self) -> Result<usize> {
        self.lock().clear()
    }

    /// Whether `key` holds a stored value
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.lock().read(key)?.is_some())
    }

    /// Every stored key with its raw JSON, sorted by key
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let backend = self.lock();
        let mut entries = Vec::new();
        for key in backend.keys()? {
            if let Some(raw) = backend.read(&key)? {
                entries.push((key, raw));
            }
        }
        Ok(entries)
    }
}

/// Accessor for one logical setting: a key, its type and its default
pub struct Setting<V> {
    store: Arc<SettingsStore>,
    key: String,
    default: V,
}

impl<V> Setting<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    pub fn new(store: Arc<SettingsStore>, key: impl Into<String>, default: V) -> Self {
        Self {
            store,
            key: key.into(),
            default,
        }
    }

    pub fn get(&self) -> V {
        self.store.get(&self.key, self.default.clone())
    }

    pub fn set(&self, value: &V) -> Result<()> {
        self.store.set(&self.key, value)
    }

    pub fn remove(&self) -> Result<bool> {
        self.store.remove(&self.key)
    }
}
