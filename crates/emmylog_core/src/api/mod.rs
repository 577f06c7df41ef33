//! JSON request handling for the CGI surface.
//!
//! # Responsibility
//! - Decode one request body, dispatch on its `action`, produce one envelope.
//! - Frame the envelope as a CGI response.
//!
//! # Invariants
//! - Exactly one envelope is produced per request.
//! - Request-level failures are reported in-band and have no side effects.

pub mod envelope;
pub mod error;
pub mod handler;

pub use envelope::{write_cgi_response, Envelope, CONTENT_TYPE_HEADER};
pub use error::ApiError;
pub use handler::{handle_request, Action, RequestContext};
