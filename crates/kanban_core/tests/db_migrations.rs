use kanban_core::db::migrations::latest_version;
use kanban_core::db::{open_db, open_db_in_dir, open_db_in_memory, DbError, DEFAULT_DB_FILE_NAME};
use kanban_core::{KanbanContext, RepoError, SqliteTagRepository, TagCreate, TagRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["Tags", "Users", "Items", "WorkItemTags"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn open_db_enables_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn opening_same_database_twice_is_idempotent_and_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kanban.db");

    {
        let context = KanbanContext::open(&path).unwrap();
        let outcome = context.tags().unwrap().create(&TagCreate::new("persisted"));
        assert_eq!(outcome.id, Some(1));
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    assert_eq!(repo.find(1).unwrap().unwrap().name, "persisted");
}

#[test]
fn open_db_in_dir_uses_default_file_name() {
    let dir = tempfile::tempdir().unwrap();

    let conn = open_db_in_dir(dir.path()).unwrap();
    drop(conn);

    assert!(dir.path().join(DEFAULT_DB_FILE_NAME).exists());
    assert_eq!(DEFAULT_DB_FILE_NAME, "App.db");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
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

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTagRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let context = KanbanContext::from_connection(conn);
    assert!(matches!(
        context.tags(),
        Err(RepoError::MissingRequiredTable("Tags"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY, Name TEXT NOT NULL);
         CREATE TABLE Items (Id INTEGER PRIMARY KEY);",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let context = KanbanContext::from_connection(conn);
    assert!(matches!(
        context.users(),
        Err(RepoError::MissingRequiredColumn {
            table: "Users",
            column: "Email"
        })
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
