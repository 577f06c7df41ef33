//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the append and recent-listing APIs over `events` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - `insert_event` commits before returning the assigned id.
//! - Listed timestamps are returned exactly as stored.

use crate::db::DbError;
use crate::model::event::{Event, EventId, EventSummary, EventValidationError, NewEvent};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of events returned by the `list` action.
pub const RECENT_EVENTS_LIMIT: u32 = 30;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for event persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EventValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the append-only event log.
pub trait EventRepository {
    fn insert_event(&self, event: &NewEvent) -> RepoResult<EventId>;
    fn list_recent(&self, limit: u32) -> RepoResult<Vec<EventSummary>>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn insert_event(&self, event: &NewEvent) -> RepoResult<EventId> {
        event.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO events (source_ip, created_utc, ts_utc, event)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                event.source_ip.as_str(),
                event.created_utc_text(),
                event.ts_utc_text(),
                event.event.as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    fn list_recent(&self, limit: u32) -> RepoResult<Vec<EventSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT ts_utc, event
             FROM events
             ORDER BY ts_utc DESC, eid DESC
             LIMIT ?1;",
        )?;

        let mut rows = stmt.query([i64::from(limit)])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(EventSummary {
                ts_utc: row.get("ts_utc")?,
                event: row.get("event")?,
            });
        }

        Ok(events)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let event = self
            .conn
            .query_row(
                "SELECT eid, source_ip, created_utc, ts_utc, event
                 FROM events
                 WHERE eid = ?1;",
                [id],
                parse_event_row,
            )
            .optional()?;

        match event {
            Some(event) if event.source_ip.is_empty() => Err(RepoError::InvalidData(format!(
                "empty source_ip in events.eid={id}"
            ))),
            other => Ok(other),
        }
    }
}

fn parse_event_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get("eid")?,
        source_ip: row.get("source_ip")?,
        created_utc: row.get("created_utc")?,
        ts_utc: row.get("ts_utc")?,
        event: row.get("event")?,
    })
}
