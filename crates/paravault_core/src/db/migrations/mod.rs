//! Snapshot schema migrations.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps and apply the pending ones.
//!
//! # Invariants
//! - Versions are strictly increasing.
//! - The applied version is stored in `PRAGMA user_version`.
//! - All pending steps commit in one transaction or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_snapshots.sql"),
}];

/// Newest schema version this build understands.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|migration| migration.version > from) {
        let step_failed = |source: rusqlite::Error| DbError::Migration {
            version: migration.version,
            source,
        };
        tx.execute_batch(migration.sql).map_err(step_failed)?;
        tx.pragma_update(None, "user_version", migration.version)
            .map_err(step_failed)?;
    }
    tx.commit().map_err(|source| DbError::Migration {
        version: latest,
        source,
    })?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        from, latest
    );
    Ok(())
}

/// Schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
