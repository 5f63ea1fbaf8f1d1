//! SQLite storage for the work-time ledger.
//!
//! The ledger only needs a key-value store of opaque strings (see
//! [`wlog_core::Store`]); this crate keeps them in a single `kv` table.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization.
//!
//! # Schema
//!
//! ```sql
//! kv(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)
//! ```
//!
//! `updated_at` is an RFC 3339 UTC timestamp of the last write. Values are JSON
//! documents owned by `wlog-core`; this crate never inspects them.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use wlog_core::{Store, StoreError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The database directory could not be created.
    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Opens a database at the given path, creating it and its parent
    /// directory if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), DbError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.conn.execute(
            "
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        Ok(())
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key ASC")?;
        let rows = stmt.query_map(params![prefix], |row| row.get(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

impl Store for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_value(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.set_value(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wlog_core::storage::{ENTRIES_KEY, holiday_cache_key, load_settings, save_settings};
    use wlog_core::Settings;

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(table_columns(&db.conn, "kv"), vec!["key", "value", "updated_at"]);
    }

    #[test]
    fn set_overwrites_and_get_reads_back() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get(ENTRIES_KEY).unwrap(), None);

        db.set(ENTRIES_KEY, "[]").unwrap();
        db.set(ENTRIES_KEY, r#"[{"id":"a"}]"#).unwrap();
        assert_eq!(db.get(ENTRIES_KEY).unwrap().as_deref(), Some(r#"[{"id":"a"}]"#));

        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn values_survive_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("wlog.db");

        let settings = Settings {
            hours_per_day: 6.0,
            ..Settings::default()
        };
        {
            let db = Database::open(&path).unwrap();
            save_settings(&db, &settings).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(load_settings(&db), settings);
    }

    #[test]
    fn keys_with_prefix_lists_holiday_cache() {
        let db = Database::open_in_memory().unwrap();
        db.set(&holiday_cache_key("BY", 2026), "[]").unwrap();
        db.set(&holiday_cache_key("BY", 2025), "[]").unwrap();
        db.set(&holiday_cache_key("NW", 2025), "[]").unwrap();
        db.set(ENTRIES_KEY, "[]").unwrap();

        let keys = db.keys_with_prefix("wlog.holidays.v1.BY.").unwrap();
        assert_eq!(
            keys,
            vec!["wlog.holidays.v1.BY.2025", "wlog.holidays.v1.BY.2026"]
        );
    }
}
