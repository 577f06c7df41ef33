//! Request-level error taxonomy.

use crate::time::TimestampError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures reported to the caller inside an error envelope.
///
/// `errcode` tokens are stable. Earlier deployments of the log backend sent
/// `jsondecodeerror` where this sends `malformed_input`, and `valueerror`
/// where this sends `bad_timestamp`; clients matching on `errcode` must
/// accept the new tokens. `noaction`, `missingdata` and
/// `unsupported_action` are unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Body is not valid JSON.
    MalformedInput(String),
    /// Body has no `action` key.
    MissingAction,
    /// `add` without a string `event`.
    MissingData,
    /// `add` with a `ts` that cannot be converted.
    BadTimestamp(TimestampError),
    /// `action` names no known operation.
    UnsupportedAction(String),
}

impl ApiError {
    /// Stable lowercase token for the `errcode` field.
    pub fn errcode(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::MissingAction => "noaction",
            Self::MissingData => "missingdata",
            Self::BadTimestamp(_) => "bad_timestamp",
            Self::UnsupportedAction(_) => "unsupported_action",
        }
    }

    /// Human-readable message for the `errtext` field.
    pub fn errtext(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "Cannot read input data",
            Self::MissingAction => "No action given",
            Self::MissingData => "No 'event' property present or not a string value",
            Self::BadTimestamp(_) => "Cannot parse timestamp",
            Self::UnsupportedAction(_) => "Missing action or unsupported action requested.",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput(reason) => write!(f, "malformed request body: {reason}"),
            Self::MissingAction => write!(f, "request has no action"),
            Self::MissingData => write!(f, "request has no string event"),
            Self::BadTimestamp(err) => write!(f, "{err}"),
            Self::UnsupportedAction(action) => write!(f, "unsupported action `{action}`"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BadTimestamp(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TimestampError> for ApiError {
    fn from(value: TimestampError) -> Self {
        Self::BadTimestamp(value)
    }
}
