//! Domain model for logged life events.
//!
//! # Responsibility
//! - Define the canonical event record and its insert/list projections.
//!
//! # Invariants
//! - Every persisted event is identified by a stable `EventId`.
//! - Events are append-only: no update or delete shape exists.

pub mod event;
