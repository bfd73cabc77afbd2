use rusqlite::Connection;
use teamnotes_core::db::migrations::latest_version;
use teamnotes_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["folders", "notes", "folder_shares", "note_shares", "teams", "rosters"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("teamnotes.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "note_shares");
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
fn opening_store_in_missing_directory_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("store.db");

    let err = open_db(&path).unwrap_err();
    match &err {
        DbError::OpenFailed { path: failed, .. } => assert_eq!(failed, &path),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("store.db"));
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO notes (id, title, body, folder_id, owner_id)
             VALUES ('n1', 't', '', 'missing-folder', 'alice');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn share_rows_are_unique_per_resource_and_user() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO folders (id, name, owner_id) VALUES ('f1', 'Plans', 'alice');
         INSERT INTO folder_shares (folder_id, user_id, access) VALUES ('f1', 'bob', 'read');",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO folder_shares (folder_id, user_id, access) VALUES ('f1', 'bob', 'write');",
        [],
    );
    assert!(duplicate.is_err());

    let bad_access = conn.execute(
        "INSERT INTO folder_shares (folder_id, user_id, access) VALUES ('f1', 'carol', 'admin');",
        [],
    );
    assert!(bad_access.is_err());
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
