//! Supervision configuration types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FleetError;

/// How built services are turned into running processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisionStrategy {
    /// Each service is launched detached and left alone.
    Direct,
    /// Each service is registered with a process manager daemon.
    Managed,
}

impl std::fmt::Display for SupervisionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupervisionStrategy::Direct => write!(f, "direct"),
            SupervisionStrategy::Managed => write!(f, "managed"),
        }
    }
}

impl FromStr for SupervisionStrategy {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(SupervisionStrategy::Direct),
            "managed" | "pm2" => Ok(SupervisionStrategy::Managed),
            _ => Err(FleetError::config(format!(
                "Unknown supervision strategy: {}",
                s
            ))),
        }
    }
}

/// Supervision configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisionConfig {
    /// Strategy used when `--strategy` is not given; prompts when unset.
    pub default: Option<SupervisionStrategy>,

    /// Terminal launcher wrapped around Direct run commands
    /// (e.g. `x-terminal-emulator -e`).
    pub terminal: Option<String>,

    /// Directory receiving `<service>.log` for Direct launches without a
    /// terminal; output is discarded when unset.
    pub log_dir: Option<String>,

    /// Process manager program used by the Managed strategy.
    pub process_manager: String,

    /// Command installing the process manager when it is not on PATH.
    pub process_manager_install: String,
}

impl Default for SupervisionConfig {
    fn default() -> Self {
        Self {
            default: None,
            terminal: None,
            log_dir: None,
            process_manager: "pm2".to_string(),
            process_manager_install: "npm install -g pm2".to_string(),
        }
    }
}
