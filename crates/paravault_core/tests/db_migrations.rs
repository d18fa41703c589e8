use paravault_core::db::migrations::{latest_version, schema_version};
use paravault_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn in_memory_database_has_snapshot_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "snapshots");
    assert_table_exists(&conn, "snapshot_notes");
}

#[test]
fn reopening_a_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paravault.db");

    let first = open_db(&path).unwrap();
    first
        .execute(
            "INSERT INTO snapshots (name, note_count, created_at) VALUES ('Export', 0, 0);",
            [],
        )
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second).unwrap(), latest_version());
    let kept: i64 = second
        .query_row("SELECT COUNT(*) FROM snapshots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kept, 1);
}

#[test]
fn deleting_a_snapshot_cascades_to_its_notes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO snapshots (name, note_count, created_at) VALUES ('Export', 1, 0);
         INSERT INTO snapshot_notes (snapshot_name, position, note_id, title, payload)
         VALUES ('Export', 0, '1', 'Home', '{}');
         DELETE FROM snapshots WHERE name = 'Export';",
    )
    .unwrap();

    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM snapshot_notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(left, 0);
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
