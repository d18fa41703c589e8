//! SQLite backing for batch snapshots.
//!
//! # Responsibility
//! - Open connections for the sqlite snapshot store.
//! - Keep the snapshot schema current.
//!
//! # Invariants
//! - No snapshot is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure of the sqlite snapshot backend.
#[derive(Debug)]
pub enum DbError {
    /// The connection could not be opened or configured.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// A schema step failed; the whole upgrade was rolled back.
    Migration { version: u32, source: rusqlite::Error },
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A snapshot statement failed.
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => {
                write!(f, "failed to open {mode} snapshot database: {source}")
            }
            Self::Migration { version, source } => {
                write!(f, "snapshot schema step v{version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "snapshot database is at schema v{db_version}; this build reads up to v{latest_supported}"
            ),
            Self::Sqlite(err) => write!(f, "snapshot database statement failed: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn newer_schema_message_names_both_versions() {
        let err = DbError::UnsupportedSchemaVersion {
            db_version: 7,
            latest_supported: 1,
        };

        assert_eq!(
            err.to_string(),
            "snapshot database is at schema v7; this build reads up to v1"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn migration_failure_keeps_the_sqlite_cause() {
        let err = DbError::Migration {
            version: 1,
            source: rusqlite::Error::InvalidQuery,
        };

        assert!(err.to_string().starts_with("snapshot schema step v1 failed"));
        assert!(err.source().is_some());
    }
}
