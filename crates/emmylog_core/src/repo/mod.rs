//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for events.
//! - Isolate SQLite query details from request handling.
//!
//! # Invariants
//! - Repository writes must enforce `NewEvent::validate()` before persistence.
//! - All SQL uses parameter binding; values are never interpolated.

pub mod event_repo;
