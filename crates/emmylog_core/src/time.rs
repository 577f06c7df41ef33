//! Timestamp parsing and rendering.
//!
//! # Invariants
//! - Client-supplied local times use `YYYY-MM-DD HH:MM:SS` with no offset.
//! - Stored UTC timestamps use `YYYY-MM-DDTHH:MM:SSZ`.
//! - Wall-clock times around DST transitions resolve to standard time:
//!   repeated times take the later instant, skipped times take the
//!   standard offset.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format of client-supplied local timestamps.
pub const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Format of stored UTC timestamps.
pub const UTC_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// Input does not match `LOCAL_TIMESTAMP_FORMAT`.
    Malformed { input: String, reason: String },
}

impl Display for TimestampError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { input, reason } => {
                write!(f, "cannot parse timestamp `{input}`: {reason}")
            }
        }
    }
}

impl Error for TimestampError {}

/// Parses a local wall-clock time in `zone` and converts it to UTC.
///
/// Any well-formed wall time converts, including times skipped by a
/// spring-forward transition.
///
/// # Errors
/// - `Malformed` when the text does not match `YYYY-MM-DD HH:MM:SS`.
pub fn parse_local_timestamp(input: &str, zone: Tz) -> Result<DateTime<Utc>, TimestampError> {
    let naive = NaiveDateTime::parse_from_str(input, LOCAL_TIMESTAMP_FORMAT).map_err(|err| {
        TimestampError::Malformed {
            input: input.to_string(),
            reason: err.to_string(),
        }
    })?;

    let utc = match zone.from_local_datetime(&naive) {
        LocalResult::Single(local) => local.with_timezone(&Utc),
        // Repeated hour after fall-back: the later instant is standard time.
        LocalResult::Ambiguous(first, second) => first.max(second).with_timezone(&Utc),
        // Skipped hour after spring-forward: read it with the standard offset.
        LocalResult::None => {
            let standard = zone.offset_from_utc_datetime(&naive).base_utc_offset();
            Utc.from_utc_datetime(&(naive - standard))
        }
    };

    Ok(utc)
}

/// Renders a UTC instant in stored text form.
pub fn format_utc(value: DateTime<Utc>) -> String {
    value.format(UTC_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_utc, parse_local_timestamp, TimestampError, LOCAL_TIMESTAMP_FORMAT};
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::New_York;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn summer_time_converts_with_two_hour_offset() {
        let utc = parse_local_timestamp("2019-05-01 08:00:00", Berlin).unwrap();
        assert_eq!(format_utc(utc), "2019-05-01T06:00:00Z");
    }

    #[test]
    fn winter_time_converts_with_one_hour_offset() {
        let utc = parse_local_timestamp("2019-01-15 08:00:00", Berlin).unwrap();
        assert_eq!(format_utc(utc), "2019-01-15T07:00:00Z");
    }

    #[test]
    fn conversion_round_trips_to_original_local_time() {
        for input in [
            "2019-03-30 23:59:59",
            "2019-03-31 03:00:00",
            "2019-10-27 04:00:00",
            "2019-12-31 23:30:00",
        ] {
            let utc = parse_local_timestamp(input, Berlin).unwrap();
            let back = utc.with_timezone(&Berlin).format(LOCAL_TIMESTAMP_FORMAT);
            assert_eq!(back.to_string(), input);
        }
    }

    #[test]
    fn ambiguous_fall_back_time_resolves_to_standard_time() {
        let utc = parse_local_timestamp("2019-10-27 02:30:00", Berlin).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2019, 10, 27, 1, 30, 0).unwrap());
    }

    #[test]
    fn spring_forward_gap_uses_standard_offset() {
        let utc = parse_local_timestamp("2019-03-31 02:30:00", Berlin).unwrap();
        assert_eq!(format_utc(utc), "2019-03-31T01:30:00Z");

        let utc = parse_local_timestamp("2019-03-31 02:00:00", Berlin).unwrap();
        assert_eq!(format_utc(utc), "2019-03-31T01:00:00Z");
    }

    #[test]
    fn spring_forward_gap_in_other_zone_uses_its_standard_offset() {
        let utc = parse_local_timestamp("2019-03-10 02:30:00", New_York).unwrap();
        assert_eq!(format_utc(utc), "2019-03-10T07:30:00Z");
    }

    #[test]
    fn malformed_input_is_rejected() {
        for input in ["yesterday", "2019-05-01T08:00:00", "2019-05-01 08:00", "2019-13-01 08:00:00"] {
            let err = parse_local_timestamp(input, Berlin).unwrap_err();
            assert!(
                matches!(err, TimestampError::Malformed { .. }),
                "expected malformed error for {input}"
            );
        }
    }
}
