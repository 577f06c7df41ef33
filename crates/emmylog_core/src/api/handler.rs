//! Request decoding and action dispatch.
//!
//! # Responsibility
//! - Turn one raw request body into one `Envelope`.
//! - Keep caller address and receipt time explicit per request.
//!
//! # Invariants
//! - Only `add` writes; `list` only reads; rejected requests touch nothing.
//! - Store failures are returned as `Err` instead of an envelope.

use super::envelope::Envelope;
use super::error::ApiError;
use crate::repo::event_repo::{RepoError, RepoResult, SqliteEventRepository};
use crate::service::event_service::{AddEventError, AddEventRequest, EventService};
use crate::time::TimestampError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{info, warn};
use rusqlite::Connection;
use serde_json::{Map, Value};

/// Per-request inputs supplied by the hosting layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Network address of the caller.
    pub source_ip: String,
    /// Receipt instant, captured once per request.
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(source_ip: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            source_ip: source_ip.into(),
            now,
        }
    }
}

/// Operations reachable through the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Add,
}

impl Action {
    pub fn parse(value: &Value) -> Result<Self, ApiError> {
        match value.as_str() {
            Some("list") => Ok(Self::List),
            Some("add") => Ok(Self::Add),
            Some(other) => Err(ApiError::UnsupportedAction(other.to_string())),
            None => Err(ApiError::UnsupportedAction(value.to_string())),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add => "add",
        }
    }
}

/// Handles one request body against an open store.
///
/// # Errors
/// - Returns `Err` only for store-layer failures; every request-level
///   rejection is reported as an error envelope.
pub fn handle_request(
    body: &str,
    ctx: &RequestContext,
    conn: &Connection,
    zone: Tz,
) -> RepoResult<Envelope> {
    let request = match decode_request(body) {
        Ok(request) => request,
        Err(err) => return Ok(reject(None, &err)),
    };
    let action = match request.get("action").map(Action::parse) {
        Some(Ok(action)) => action,
        Some(Err(err)) => return Ok(reject(None, &err)),
        None => return Ok(reject(None, &ApiError::MissingAction)),
    };

    let service = EventService::new(SqliteEventRepository::new(conn), zone);
    match action {
        Action::List => {
            let events = service.recent_events()?;
            info!(
                "event=request_handled module=api status=ok action=list count={}",
                events.len()
            );
            let data = serde_json::to_value(events)
                .map_err(|err| RepoError::InvalidData(err.to_string()))?;
            Ok(Envelope::success("success", Some(data)))
        }
        Action::Add => {
            let add_request = match parse_add_request(&request) {
                Ok(add_request) => add_request,
                Err(err) => return Ok(reject(Some(action), &err)),
            };
            match service.add_event(&ctx.source_ip, &add_request, ctx.now) {
                Ok(id) => {
                    info!(
                        "event=request_handled module=api status=ok action=add event_id={} event_len={} explicit_ts={}",
                        id,
                        add_request.event.chars().count(),
                        add_request.ts.as_deref().is_some_and(|ts| !ts.is_empty())
                    );
                    Ok(Envelope::success("data_added", None))
                }
                Err(AddEventError::Timestamp(err)) => {
                    Ok(reject(Some(action), &ApiError::BadTimestamp(err)))
                }
                Err(AddEventError::Repo(err)) => Err(err),
            }
        }
    }
}

fn decode_request(body: &str) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        // A JSON value without keys cannot carry an action.
        Ok(_) => Err(ApiError::MissingAction),
        Err(err) => Err(ApiError::MalformedInput(err.to_string())),
    }
}

fn parse_add_request(request: &Map<String, Value>) -> Result<AddEventRequest, ApiError> {
    let event = request
        .get("event")
        .and_then(Value::as_str)
        .ok_or(ApiError::MissingData)?;

    let ts = match request.get("ts") {
        None | Some(Value::Null) => None,
        Some(Value::String(ts)) => Some(ts.clone()),
        Some(other) => {
            return Err(ApiError::BadTimestamp(TimestampError::Malformed {
                input: other.to_string(),
                reason: "expected a string".to_string(),
            }))
        }
    };

    Ok(AddEventRequest {
        event: event.to_string(),
        ts,
    })
}

fn reject(action: Option<Action>, err: &ApiError) -> Envelope {
    warn!(
        "event=request_rejected module=api status=error action={} error_code={} error={}",
        action.map_or("none", Action::as_str),
        err.errcode(),
        err
    );
    Envelope::from(err)
}
