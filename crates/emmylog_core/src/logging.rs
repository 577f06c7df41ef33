//! Logging setup for one CGI invocation.
//!
//! # Responsibility
//! - Route `log` records away from stdout, which carries the CGI response:
//!   to stderr (the web server's error log) or to rotating files.
//! - Record panics, which otherwise end the request without a response.
//!
//! # Invariants
//! - The returned `LogGuard` must outlive the request; dropping it flushes.
//! - A process starts at most one logger; a second `init_logging` fails.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "emmylog";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

/// Keeps the logger alive; buffered file output is flushed on drop.
pub struct LogGuard {
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    RelativeLogDir(PathBuf),
    CreateLogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::RelativeLogDir(path) => {
                write!(f, "log_dir must be absolute, got `{}`", path.display())
            }
            Self::CreateLogDir { path, source } => {
                write!(f, "failed to create log dir `{}`: {source}", path.display())
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateLogDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            Self::InvalidLevel(_) | Self::RelativeLogDir(_) => None,
        }
    }
}

/// Starts the process logger for this request.
///
/// `log_dir = None` logs to stderr.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LogGuard, LoggingError> {
    let filter: LevelFilter = level
        .trim()
        .parse()
        .map_err(|_| LoggingError::InvalidLevel(level.to_string()))?;
    let spec = LogSpecification::builder().default(filter).build();

    let logger = match log_dir {
        Some(dir) => file_logger(Logger::with(spec), dir)?,
        None => Logger::with(spec)
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
    };
    let handle = logger.start().map_err(LoggingError::Backend)?;

    install_panic_logger();
    info!(
        "event=logging_init module=core status=ok level={} target={} version={}",
        filter,
        log_dir.map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string()),
        env!("CARGO_PKG_VERSION")
    );

    Ok(LogGuard { _handle: handle })
}

/// Returns the default log level for current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn file_logger(logger: Logger, dir: &Path) -> Result<Logger, LoggingError> {
    if !dir.is_absolute() {
        return Err(LoggingError::RelativeLogDir(dir.to_path_buf()));
    }
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateLogDir {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(logger
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format))
}

fn install_panic_logger() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        // Payloads may echo request text: one line, bounded length.
        let message: String = payload
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(MAX_PANIC_MESSAGE_CHARS)
            .collect();
        error!(
            "event=panic_captured module=core status=error location={} message={}",
            location, message
        );
        previous_hook(panic_info);
    }));
}
