//! Key-value preference storage.
//!
//! # Responsibility
//! - Provide the minimal `get`/`set` contract consumed by the day flow.
//! - Back it with the `app_prefs` table.
//!
//! # Invariants
//! - `set` overwrites any previous value for the key.
//! - A missing key reads as `None`, never as an empty string.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PreferenceResult<T> = Result<T, PreferenceError>;

/// Failure of the underlying preference storage.
#[derive(Debug)]
pub enum PreferenceError {
    Db(DbError),
    Unavailable(String),
}

impl Display for PreferenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "preference storage unavailable: {message}"),
        }
    }
}

impl Error for PreferenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for PreferenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string key-value store.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> PreferenceResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PreferenceResult<()>;
}

/// SQLite-backed preference store that owns its connection.
pub struct SqlitePreferenceStore {
    conn: Connection,
}

impl SqlitePreferenceStore {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: &str) -> PreferenceResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_prefs WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> PreferenceResult<()> {
        self.conn.execute(
            "INSERT INTO app_prefs (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PreferenceStore, SqlitePreferenceStore};
    use crate::db::open_db_in_memory;

    #[test]
    fn missing_key_reads_as_none_and_set_overwrites() {
        let mut store = SqlitePreferenceStore::new(open_db_in_memory().unwrap());
        assert_eq!(store.get("last_run_date").unwrap(), None);

        store.set("last_run_date", "2025-01-01").unwrap();
        store.set("last_run_date", "2025-01-02").unwrap();
        assert_eq!(
            store.get("last_run_date").unwrap().as_deref(),
            Some("2025-01-02")
        );
    }
}
