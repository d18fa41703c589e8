//! Batch snapshot persistence.
//!
//! # Responsibility
//! - Load and save named note batches between stages.
//! - Keep storage details (JSON files, SQLite rows) out of the pipeline.
//!
//! # Invariants
//! - `load(save(name, notes))` returns `notes` in the same order.
//! - Saving a name replaces the previous snapshot of that name as a whole.
//! - A missing snapshot is `SnapshotError::NotFound`, not an I/O error.

use crate::db::DbError;
use crate::model::note::Note;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// File name of the batch document inside a snapshot folder.
pub const SNAPSHOT_FILE_NAME: &str = "_notes.json";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug)]
pub enum SnapshotError {
    NotFound(String),
    Io {
        location: String,
        source: io::Error,
    },
    Json {
        location: String,
        source: serde_json::Error,
    },
    Db(DbError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "snapshot not found: {name}"),
            Self::Io { location, source } => write!(f, "snapshot I/O failed at `{location}`: {source}"),
            Self::Json { location, source } => {
                write!(f, "invalid snapshot data at `{location}`: {source}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SnapshotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for named batches.
pub trait SnapshotRepository {
    fn load(&self, name: &str) -> SnapshotResult<Vec<Note>>;
    fn save(&self, name: &str, notes: &[Note]) -> SnapshotResult<()>;
    fn exists(&self, name: &str) -> SnapshotResult<bool>;
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    notes: &'a [Note],
    count: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSnapshot {
    Document { notes: Vec<Note> },
    Bare(Vec<Note>),
}

impl StoredSnapshot {
    fn into_notes(self) -> Vec<Note> {
        match self {
            Self::Document { notes } | Self::Bare(notes) => notes,
        }
    }
}

/// Snapshots stored as `<root>/<name>/_notes.json`.
#[derive(Debug, Clone)]
pub struct JsonSnapshotRepository {
    root: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn snapshot_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn snapshot_file(&self, name: &str) -> PathBuf {
        self.snapshot_dir(name).join(SNAPSHOT_FILE_NAME)
    }
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load(&self, name: &str) -> SnapshotResult<Vec<Note>> {
        let path = self.snapshot_file(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(SnapshotError::NotFound(name.to_string()))
            }
            Err(source) => return Err(io_error(&path, source)),
        };
        let stored: StoredSnapshot =
            serde_json::from_str(&text).map_err(|source| SnapshotError::Json {
                location: path.display().to_string(),
                source,
            })?;
        let notes = stored.into_notes();
        info!(
            "event=snapshot_load module=repo status=ok store=json name={} notes={}",
            name,
            notes.len()
        );
        Ok(notes)
    }

    fn save(&self, name: &str, notes: &[Note]) -> SnapshotResult<()> {
        let dir = self.snapshot_dir(name);
        fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;

        let path = self.snapshot_file(name);
        let document = SnapshotDocument {
            notes,
            count: notes.len(),
        };
        let text = serde_json::to_string_pretty(&document).map_err(|source| SnapshotError::Json {
            location: path.display().to_string(),
            source,
        })?;

        let temp = path.with_extension("json.tmp");
        if let Err(source) = fs::write(&temp, text).and_then(|()| fs::rename(&temp, &path)) {
            let _ = fs::remove_file(&temp);
            error!(
                "event=snapshot_save module=repo status=error store=json name={} error={}",
                name, source
            );
            return Err(io_error(&path, source));
        }
        info!(
            "event=snapshot_save module=repo status=ok store=json name={} notes={}",
            name,
            notes.len()
        );
        Ok(())
    }

    fn exists(&self, name: &str) -> SnapshotResult<bool> {
        Ok(self.snapshot_file(name).is_file())
    }
}

/// Snapshots stored as rows of a migrated SQLite database.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// `conn` must come from `db::open_db` or `db::open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn load(&self, name: &str) -> SnapshotResult<Vec<Note>> {
        if !self.exists(name)? {
            return Err(SnapshotError::NotFound(name.to_string()));
        }

        let mut stmt = self.conn.prepare(
            "SELECT payload
             FROM snapshot_notes
             WHERE snapshot_name = ?1
             ORDER BY position ASC;",
        )?;
        let payloads = stmt
            .query_map([name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let notes = payloads
            .iter()
            .enumerate()
            .map(|(position, payload)| {
                serde_json::from_str::<Note>(payload).map_err(|source| SnapshotError::Json {
                    location: format!("{name}#{position}"),
                    source,
                })
            })
            .collect::<SnapshotResult<Vec<_>>>()?;

        info!(
            "event=snapshot_load module=repo status=ok store=sqlite name={} notes={}",
            name,
            notes.len()
        );
        Ok(notes)
    }

    fn save(&self, name: &str, notes: &[Note]) -> SnapshotResult<()> {
        let payloads = notes
            .iter()
            .enumerate()
            .map(|(position, note)| {
                serde_json::to_string(note).map_err(|source| SnapshotError::Json {
                    location: format!("{name}#{position}"),
                    source,
                })
            })
            .collect::<SnapshotResult<Vec<_>>>()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM snapshots WHERE name = ?1;", [name])?;
        tx.execute(
            "INSERT INTO snapshots (name, note_count, created_at) VALUES (?1, ?2, ?3);",
            params![name, notes.len() as i64, now_epoch_ms()],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO snapshot_notes (snapshot_name, position, note_id, title, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
            )?;
            for (position, (note, payload)) in notes.iter().zip(&payloads).enumerate() {
                insert.execute(params![
                    name,
                    position as i64,
                    note.id.as_str(),
                    note.title.as_str(),
                    payload.as_str()
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "event=snapshot_save module=repo status=ok store=sqlite name={} notes={}",
            name,
            notes.len()
        );
        Ok(())
    }

    fn exists(&self, name: &str) -> SnapshotResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM snapshots WHERE name = ?1;", [name], |row| {
                row.get::<_, i64>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}

fn io_error(path: &Path, source: io::Error) -> SnapshotError {
    SnapshotError::Io {
        location: path.display().to_string(),
        source,
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}
