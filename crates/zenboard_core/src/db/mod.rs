//! SQLite-backed local storage bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections standing in for browser local
//!   storage.
//! - Apply the key/value table schema in deterministic order.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No document is read or written before schema setup succeeds.
//! - A file claiming a schema version must actually hold the storage table.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Key/value table every schema version provides.
pub const STORAGE_TABLE: &str = "local_storage";

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// `user_version` is current but the storage table is absent, e.g. a
    /// foreign SQLite file at the widget path.
    MissingStorageTable {
        table: &'static str,
        db_version: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "local storage schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingStorageTable { table, db_version } => write!(
                f,
                "local storage table `{table}` is missing at schema version {db_version}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingStorageTable { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
