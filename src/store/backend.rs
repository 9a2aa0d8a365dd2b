//! Durable backends for the settings store
//!
//! A backend stores opaque JSON text per key. Typing and default handling
//! live in [`SettingsStore`](super::SettingsStore).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::info;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::PersistenceError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

const DB_FILE_NAME: &str = "settings.db";

type Result<T> = std::result::Result<T, PersistenceError>;

/// Key/value storage that survives process restarts
pub trait SettingsBackend: Send {
    /// Raw stored value for `key`, if any
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns whether it existed.
    fn delete(&mut self, key: &str) -> Result<bool>;

    /// Remove every key. Returns how many were removed.
    fn clear(&mut self) -> Result<usize>;

    /// All stored keys, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// SQLite-backed settings storage
pub struct SqliteBackend {
    conn: Connection,
    path: PathBuf,
}

impl SqliteBackend {
    /// Open or create the settings database inside `dir`
    pub fn open_in(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| PersistenceError::Io(format!("Failed to create settings dir: {}", e)))?;

        let path = dir.join(DB_FILE_NAME);
        let conn = Connection::open(&path)?;

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            info!(
                "Settings schema version mismatch ({} != {}), rebuilding",
                version, SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(&path).map_err(|e| {
                PersistenceError::Io(format!("Failed to remove settings DB: {}", e))
            })?;
            return Self::open_in(dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self { conn, path })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for SqliteBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    fn clear(&mut self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM settings", [])?;
        Ok(deleted)
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM settings ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Process-local backend, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<bool> {
        Ok(self.values.remove(key).is_some())
    }

    fn clear(&mut self) -> Result<usize> {
        let count = self.values.len();
        self.values.clear();
        Ok(count)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}
