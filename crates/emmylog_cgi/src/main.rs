//! CGI entry point.
//!
//! # Responsibility
//! - Collect per-request inputs from the host: stdin body, `REMOTE_ADDR`.
//! - Hand one request to `emmylog_core` and write exactly one framed response.
//!
//! # Invariants
//! - stdout carries only the CGI response; diagnostics go to the logger.
//! - A response is written on every exit path.

use chrono::Utc;
use emmylog_core::db::open_db;
use emmylog_core::{
    core_version, handle_request, init_logging, write_cgi_response, ApiError, Config, Envelope,
    LogGuard, RequestContext, CONFIG_ENV_VAR,
};
use log::{error, info, warn};
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

const REMOTE_ADDR_VAR: &str = "REMOTE_ADDR";
const UNKNOWN_SOURCE_IP: &str = "unknown";

fn main() -> ExitCode {
    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let config = Config::load(config_path.as_deref());
    // Held until the response is written so late errors still reach the log.
    let log_guard = config.as_ref().ok().and_then(start_logging);

    let result = config
        .map_err(|err| -> Box<dyn Error> { Box::new(err) })
        .and_then(|config| serve(&config));
    let (envelope, exit_code) = match result {
        Ok(envelope) => (envelope, ExitCode::SUCCESS),
        Err(err) => {
            if log_guard.is_none() {
                eprintln!("emmylog: request failed: {err}");
            }
            error!(
                "event=request_failed module=cgi status=error error_code=internal_error error={}",
                err
            );
            (
                Envelope::error("internal_error", "Internal error while handling request"),
                ExitCode::FAILURE,
            )
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = write_cgi_response(&mut out, &envelope) {
        error!(
            "event=response_write module=cgi status=error error={}",
            err
        );
        return ExitCode::FAILURE;
    }
    exit_code
}

fn start_logging(config: &Config) -> Option<LogGuard> {
    match init_logging(&config.log_level, config.log_dir.as_deref()) {
        Ok(guard) => Some(guard),
        Err(err) => {
            // No logger to report through; stderr ends up in the web server log.
            eprintln!("emmylog: logging disabled: {err}");
            None
        }
    }
}

fn serve(config: &Config) -> Result<Envelope, Box<dyn Error>> {
    info!(
        "event=request_start module=cgi status=start version={}",
        core_version()
    );

    let mut raw = Vec::new();
    io::stdin().read_to_end(&mut raw)?;
    let now = Utc::now();

    let body = match String::from_utf8(raw) {
        Ok(body) => body,
        Err(err) => {
            let err = ApiError::MalformedInput(err.to_string());
            warn!(
                "event=request_rejected module=cgi status=error error_code={} error={}",
                err.errcode(),
                err
            );
            return Ok(Envelope::from(&err));
        }
    };

    let source_ip = std::env::var(REMOTE_ADDR_VAR).unwrap_or_else(|_| {
        warn!("event=request_start module=cgi status=warn missing_env={REMOTE_ADDR_VAR}");
        UNKNOWN_SOURCE_IP.to_string()
    });

    let zone = config.zone()?;
    let conn = open_db(&config.dbfile)?;
    let ctx = RequestContext::new(source_ip, now);
    Ok(handle_request(&body, &ctx, &conn, zone)?)
}
