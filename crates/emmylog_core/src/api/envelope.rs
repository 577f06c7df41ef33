//! Response envelope and CGI framing.
//!
//! # Invariants
//! - `errcode` is always lowercase.
//! - `data` is omitted from the JSON body unless supplied.

use super::error::ApiError;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

pub const CONTENT_TYPE_HEADER: &str = "Content-Type: application/json";

/// Fixed-shape response body for every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub errcode: String,
    pub errtext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn success(errcode: &str, data: Option<Value>) -> Self {
        Self {
            success: true,
            errcode: errcode.to_lowercase(),
            errtext: "Success".to_string(),
            data,
        }
    }

    pub fn error(errcode: &str, errtext: impl Into<String>) -> Self {
        Self {
            success: false,
            errcode: errcode.to_lowercase(),
            errtext: errtext.into(),
            data: None,
        }
    }
}

impl From<&ApiError> for Envelope {
    fn from(value: &ApiError) -> Self {
        Self::error(value.errcode(), value.errtext())
    }
}

/// Writes header, blank line and JSON body as one CGI response.
pub fn write_cgi_response<W: Write>(writer: &mut W, envelope: &Envelope) -> io::Result<()> {
    writeln!(writer, "{CONTENT_TYPE_HEADER}")?;
    writeln!(writer)?;
    serde_json::to_writer(&mut *writer, envelope)?;
    writeln!(writer)?;
    writer.flush()
}
