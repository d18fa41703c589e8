use paravault_core::db::open_db_in_memory;
use paravault_core::repo::snapshot_repo::SNAPSHOT_FILE_NAME;
use paravault_core::{
    Category, JsonSnapshotRepository, Note, ParentRef, SnapshotError, SnapshotRepository,
    SqliteSnapshotRepository,
};
use serde_json::json;

fn sample_notes() -> Vec<Note> {
    let mut home = Note::with_id("1", "Home").tagged(["Area"]);
    home.category = Some(Category::Area);
    home.parents = vec![ParentRef::category(Category::Area)];
    home.content = "# Home\n".to_string();

    let mut groceries = Note::with_id("2", "Groceries").tagged(["Home"]);
    groceries.parents = vec![ParentRef::note(&home)];
    groceries.output_path = Some("Areas/Home".to_string());
    groceries
        .extra
        .insert("created".to_string(), json!("2024-03-01T10:00:00Z"));

    vec![home, groceries]
}

fn assert_round_trip(repo: &dyn SnapshotRepository) {
    let notes = sample_notes();
    assert!(!repo.exists("Export").unwrap());

    repo.save("Export", &notes).unwrap();

    assert!(repo.exists("Export").unwrap());
    assert_eq!(repo.load("Export").unwrap(), notes);
}

fn assert_save_replaces(repo: &dyn SnapshotRepository) {
    repo.save("Export", &sample_notes()).unwrap();
    let only = vec![Note::with_id("9", "Only")];

    repo.save("Export", &only).unwrap();

    assert_eq!(repo.load("Export").unwrap(), only);
}

#[test]
fn json_store_round_trips_and_keeps_extra_fields() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::new(dir.path());
    assert_round_trip(&repo);

    let raw = std::fs::read_to_string(dir.path().join("Export").join(SNAPSHOT_FILE_NAME)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["count"], json!(2));
    assert_eq!(value["notes"][1]["created"], json!("2024-03-01T10:00:00Z"));
    assert_eq!(value["notes"][1]["parents"][0]["kind"], json!("note"));
}

#[test]
fn json_store_replaces_whole_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    assert_save_replaces(&JsonSnapshotRepository::new(dir.path()));
}

#[test]
fn json_store_accepts_bare_array() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("Legacy");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(
        folder.join(SNAPSHOT_FILE_NAME),
        r#"[{"id": "1", "title": "Inbox", "tags": ["Area"], "source": "import"}]"#,
    )
    .unwrap();

    let notes = JsonSnapshotRepository::new(dir.path()).load("Legacy").unwrap();

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Inbox");
    assert!(notes[0].parents.is_empty());
    assert_eq!(notes[0].category, None);
    assert_eq!(notes[0].extra.get("source"), Some(&json!("import")));
}

#[test]
fn json_store_reports_missing_and_corrupt_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::new(dir.path());

    assert!(matches!(
        repo.load("Nope").unwrap_err(),
        SnapshotError::NotFound(name) if name == "Nope"
    ));

    let folder = dir.path().join("Broken");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join(SNAPSHOT_FILE_NAME), "{ not json").unwrap();
    assert!(matches!(
        repo.load("Broken").unwrap_err(),
        SnapshotError::Json { .. }
    ));
}

#[test]
fn sqlite_store_round_trips_in_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::new(&conn);
    assert_round_trip(&repo);

    let count: i64 = conn
        .query_row(
            "SELECT note_count FROM snapshots WHERE name = 'Export';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn sqlite_store_replaces_whole_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::new(&conn);
    assert_save_replaces(&repo);

    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM snapshot_notes WHERE snapshot_name = 'Export';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn sqlite_store_reports_missing_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::new(&conn);

    let err = repo.load("Nope").unwrap_err();

    assert!(matches!(err, SnapshotError::NotFound(_)));
    assert_eq!(err.to_string(), "snapshot not found: Nope");
}
