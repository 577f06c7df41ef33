//! Core domain logic for emmylog.
//! This crate is the single source of truth for event-log invariants.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod time;

pub use api::{handle_request, write_cgi_response, ApiError, Envelope, RequestContext};
pub use config::{Config, ConfigError, CONFIG_ENV_VAR};
pub use logging::{default_log_level, init_logging, LogGuard, LoggingError};
pub use model::event::{Event, EventId, EventSummary, NewEvent};
pub use repo::event_repo::{
    EventRepository, RepoError, RepoResult, SqliteEventRepository, RECENT_EVENTS_LIMIT,
};
pub use service::event_service::{AddEventError, AddEventRequest, EventService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
