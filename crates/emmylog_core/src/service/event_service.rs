//! Event use-case service.
//!
//! # Responsibility
//! - Provide list/add entry points for request handling.
//! - Resolve the nominal event time before delegating to the repository.
//!
//! # Invariants
//! - The receipt instant is captured by the caller once and reused for
//!   `created_utc` and the fallback `ts_utc`.
//! - A timestamp parse failure never reaches the repository.

use crate::model::event::{EventId, EventSummary, NewEvent};
use crate::repo::event_repo::{EventRepository, RepoError, RepoResult, RECENT_EVENTS_LIMIT};
use crate::time::{parse_local_timestamp, TimestampError};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validated input of the `add` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddEventRequest {
    /// Free-text event label.
    pub event: String,
    /// Optional local wall-clock time; `None` or empty means "now".
    pub ts: Option<String>,
}

#[derive(Debug)]
pub enum AddEventError {
    Timestamp(TimestampError),
    Repo(RepoError),
}

impl Display for AddEventError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timestamp(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AddEventError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Timestamp(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TimestampError> for AddEventError {
    fn from(value: TimestampError) -> Self {
        Self::Timestamp(value)
    }
}

impl From<RepoError> for AddEventError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for event operations.
pub struct EventService<R: EventRepository> {
    repo: R,
    zone: Tz,
}

impl<R: EventRepository> EventService<R> {
    /// Creates a service interpreting client local times in `zone`.
    pub fn new(repo: R, zone: Tz) -> Self {
        Self { repo, zone }
    }

    /// Returns the most recent events by nominal time, newest first.
    pub fn recent_events(&self) -> RepoResult<Vec<EventSummary>> {
        self.repo.list_recent(RECENT_EVENTS_LIMIT)
    }

    /// Appends one event received at `now` from `source_ip`.
    ///
    /// # Contract
    /// - `ts` absent or empty: nominal time is `now`.
    /// - `ts` present: parsed as local time in the service zone.
    /// - Returns the storage-assigned id after commit.
    pub fn add_event(
        &self,
        source_ip: &str,
        request: &AddEventRequest,
        now: DateTime<Utc>,
    ) -> Result<EventId, AddEventError> {
        let ts_utc = match request.ts.as_deref() {
            None | Some("") => now,
            Some(local) => parse_local_timestamp(local, self.zone)?,
        };

        let event = NewEvent::received(source_ip, request.event.as_str(), now).at(ts_utc);
        Ok(self.repo.insert_event(&event)?)
    }
}
