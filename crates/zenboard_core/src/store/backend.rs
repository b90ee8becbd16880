//! Key/value document backends.
//!
//! # Responsibility
//! - Provide the local-storage contract the state store persists through.
//! - Keep SQL details inside the SQLite implementation.
//!
//! # Invariants
//! - `write` replaces the whole value stored under a key.
//! - `read` of a never-written key returns `Ok(None)`.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend failure while reading or writing a document.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backend refused the write (quota, read-only medium, ...).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Local-storage style string document backend.
pub trait DocumentBackend {
    /// Reads the raw text stored under `key`.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the raw text stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-process backend. Contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a backend with pre-existing entries, e.g. legacy documents.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl DocumentBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// SQLite-backed local storage table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) a storage file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DocumentBackend for SqliteBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO local_storage (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

impl<B: DocumentBackend + ?Sized> DocumentBackend for Box<B> {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentBackend, MemoryBackend, SqliteBackend};

    #[test]
    fn memory_backend_overwrites_values() {
        let mut backend = MemoryBackend::new();
        assert_eq!(backend.read("k").unwrap(), None);
        backend.write("k", "one").unwrap();
        backend.write("k", "two").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn sqlite_backend_upserts_by_key() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        assert_eq!(backend.read("doc").unwrap(), None);
        backend.write("doc", "{}").unwrap();
        backend.write("doc", "{\"tasks\":[]}").unwrap();
        assert_eq!(
            backend.read("doc").unwrap().as_deref(),
            Some("{\"tasks\":[]}")
        );

        let rows: i64 = backend
            .connection()
            .query_row("SELECT COUNT(*) FROM local_storage;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
