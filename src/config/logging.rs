//! Logging configuration types.
//!
//! Logs always go to stderr, so `list --json` and `config show` on stdout
//! stay machine-readable whatever the level.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FleetError;

/// `logging:` section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Starting level; `-v`/`-q` replace it and `RUST_LOG` directives are
    /// layered on top.
    pub level: LogLevel,

    /// `text` for a terminal, `json` when stderr is collected by a log shipper.
    pub format: LogFormat,
}

/// Minimum severity written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug output plus anything dependencies emit.
    Trace,
    /// Runner invocations and resolved configuration (`-v`).
    Debug,
    /// One line per service step.
    #[default]
    Info,
    /// Skipped services and non-fatal failures only.
    Warn,
    /// Failures only (`-q`).
    Error,
}

impl FromStr for LogLevel {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(FleetError::config(format!(
                "logging.level must be one of trace, debug, info, warn, error (got '{}')",
                s
            ))),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Shape of each stderr log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line, with `service` and `exit_code` as fields.
    Json,
}

impl FromStr for LogFormat {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            _ => Err(FleetError::config(format!(
                "logging.format must be text or json (got '{}')",
                s
            ))),
        }
    }
}
