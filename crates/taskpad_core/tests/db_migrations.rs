use rusqlite::Connection;
use taskpad_core::db::migrations::{apply_migrations, latest_version};
use taskpad_core::db::{open_task_db_in_memory, DbError};

#[test]
fn fresh_connection_lands_on_latest_version() {
    let conn = open_task_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn reapplying_migrations_is_idempotent() {
    let mut conn = open_task_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn newer_schema_than_supported_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        }
    ));
}

#[test]
fn migrated_schema_contains_the_todos_table() {
    let conn = open_task_db_in_memory().unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'todos';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}
