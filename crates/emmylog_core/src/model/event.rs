//! Event domain model.
//!
//! # Responsibility
//! - Define the stored event row, the insert payload and the list projection.
//!
//! # Invariants
//! - `source_ip`, `created_utc`, `ts_utc` and `event` are never null.
//! - `id` is assigned by storage exactly once and never reused.
//! - Stored timestamps use the `YYYY-MM-DDTHH:MM:SSZ` text form.

use crate::time::format_utc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned, monotonically increasing event identifier.
pub type EventId = i64;

/// One persisted event row, timestamps kept in their stored text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    /// Caller network address captured at write time.
    pub source_ip: String,
    /// Server-side receipt time.
    pub created_utc: String,
    /// Nominal event time.
    pub ts_utc: String,
    /// Free-text label, e.g. `nurse_left` or `sleep`.
    pub event: String,
}

/// Insert payload for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub source_ip: String,
    pub created_utc: DateTime<Utc>,
    pub ts_utc: DateTime<Utc>,
    pub event: String,
}

impl NewEvent {
    /// Creates an event whose nominal time equals its receipt time.
    pub fn received(
        source_ip: impl Into<String>,
        event: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            source_ip: source_ip.into(),
            created_utc: now,
            ts_utc: now,
            event: event.into(),
        }
    }

    /// Overrides the nominal event time.
    pub fn at(mut self, ts_utc: DateTime<Utc>) -> Self {
        self.ts_utc = ts_utc;
        self
    }

    /// Checks the non-null column invariants before persistence.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.source_ip.trim().is_empty() {
            return Err(EventValidationError::EmptySourceIp);
        }
        Ok(())
    }

    pub(crate) fn created_utc_text(&self) -> String {
        format_utc(self.created_utc)
    }

    pub(crate) fn ts_utc_text(&self) -> String {
        format_utc(self.ts_utc)
    }
}

/// Row shape returned by the `list` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub ts_utc: String,
    pub event: String,
}

/// Rejections raised by `NewEvent::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptySourceIp,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySourceIp => write!(f, "event source_ip cannot be empty"),
        }
    }
}

impl Error for EventValidationError {}

#[cfg(test)]
mod tests {
    use super::{EventValidationError, NewEvent};
    use chrono::{TimeZone, Utc};

    #[test]
    fn received_uses_receipt_time_for_both_timestamps() {
        let now = Utc.with_ymd_and_hms(2019, 5, 1, 6, 0, 0).unwrap();
        let event = NewEvent::received("10.0.0.7", "sleep", now);

        assert_eq!(event.created_utc, now);
        assert_eq!(event.ts_utc, now);
        assert_eq!(event.ts_utc_text(), "2019-05-01T06:00:00Z");
    }

    #[test]
    fn at_overrides_only_nominal_time() {
        let now = Utc.with_ymd_and_hms(2019, 5, 1, 6, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2019, 5, 1, 5, 30, 0).unwrap();
        let event = NewEvent::received("10.0.0.7", "awake", now).at(earlier);

        assert_eq!(event.created_utc_text(), "2019-05-01T06:00:00Z");
        assert_eq!(event.ts_utc_text(), "2019-05-01T05:30:00Z");
    }

    #[test]
    fn validate_rejects_blank_source_ip() {
        let event = NewEvent::received("  ", "sleep", Utc::now());
        assert_eq!(event.validate(), Err(EventValidationError::EmptySourceIp));
    }
}
