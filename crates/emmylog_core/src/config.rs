//! Runtime configuration for the event store.
//!
//! # Responsibility
//! - Describe where events are stored and how local times are read.
//! - Load overrides from an optional TOML file.
//!
//! # Invariants
//! - Unknown keys are rejected.
//! - `timezone` must name an IANA zone known to `chrono-tz`.

use crate::logging::default_log_level;
use chrono_tz::Tz;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV_VAR: &str = "EMMYLOG_CONFIG";

const DEFAULT_DBFILE: &str = "/home/shared/emmymon/emmymon.sqlite3";
const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path of the SQLite database file.
    pub dbfile: PathBuf,
    /// IANA zone used to interpret client-supplied local timestamps.
    pub timezone: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dbfile: PathBuf::from(DEFAULT_DBFILE),
            timezone: DEFAULT_TIMEZONE.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Loads the file at `path`, or returns defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        config.zone()?;
        Ok(config)
    }

    /// Parses TOML text; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Resolves the configured timezone name.
    pub fn zone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidTimezone(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidTimezone(name) => write!(f, "unknown timezone `{name}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidTimezone(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};
    use std::path::{Path, PathBuf};

    #[test]
    fn missing_path_yields_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.zone().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = Config::from_toml_str("dbfile = \"/tmp/events.sqlite3\"\n").unwrap();
        assert_eq!(config.dbfile, PathBuf::from("/tmp/events.sqlite3"));
        assert_eq!(config.timezone, "Europe/Berlin");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("listen = \"0.0.0.0:80\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = Config::from_toml_str("timezone = \"Mars/Olympus_Mons\"\n").unwrap();
        let err = config.zone().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = Config::load(Some(Path::new("/nonexistent/emmylog.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/emmylog.toml"));
    }
}
