//! Event table definition.

use crate::db::DbResult;
use rusqlite::Connection;

const CREATE_EVENTS_SQL: &str = "CREATE TABLE IF NOT EXISTS events (
    eid INTEGER PRIMARY KEY,
    source_ip VARCHAR NOT NULL,
    created_utc TIMESTAMP NOT NULL,
    ts_utc TIMESTAMP NOT NULL,
    event VARCHAR NOT NULL
);";

/// Creates the `events` table unless it already exists.
///
/// Safe to call on every open. Errors other than "already exists"
/// (read-only file, corrupt database, locked schema) are returned.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_EVENTS_SQL)?;
    Ok(())
}
