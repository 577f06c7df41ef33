use emmylog_core::db::{ensure_schema, open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_events_table() {
    let conn = open_db_in_memory().unwrap();

    assert_table_exists(&conn, "events");
    assert_eq!(
        table_columns(&conn, "events"),
        vec!["eid", "source_ip", "created_utc", "ts_utc", "event"]
    );
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("emmylog.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO events (source_ip, created_utc, ts_utc, event)
             VALUES ('10.0.0.1', '2019-05-01T06:00:00Z', '2019-05-01T06:00:00Z', 'sleep');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn ensure_schema_accepts_existing_table() {
    let conn = open_db_in_memory().unwrap();
    ensure_schema(&conn).unwrap();
    ensure_schema(&conn).unwrap();
    assert_table_exists(&conn, "events");
}

#[test]
fn ensure_schema_reports_genuine_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readonly.sqlite3");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE unrelated (id INTEGER);")
        .unwrap();

    let conn = Connection::open_with_flags(&path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
        .unwrap();
    let err = ensure_schema(&conn).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
}

#[test]
fn opening_path_in_missing_directory_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("emmylog.sqlite3");

    assert!(open_db(&path).is_err());
}

fn table_columns(conn: &Connection, table_name: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table_name});"))
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<_, _>>()
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
