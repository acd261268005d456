//! Workspace layout and toolchain configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{FleetError, Result};

/// Where working copies live, relative to the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding one working copy per service.
    pub services_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            services_dir: "services".to_string(),
        }
    }
}

/// Commands used to fetch, build and run services.
///
/// Every command is a shell-style command line; it is split into a program
/// and its arguments, never handed to a shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Version control program.
    pub git: String,

    /// Dependency installation command, run inside the working copy.
    pub install: String,

    /// Build command, run inside the working copy.
    pub build: String,

    /// Run command used in production.
    pub start: String,

    /// Run command used with `--dev`.
    pub start_dev: String,

    /// Directory inside a working copy whose presence marks it as built.
    pub artifact_dir: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            install: "npm install".to_string(),
            build: "npm run build".to_string(),
            start: "npm run start".to_string(),
            start_dev: "npm run start:dev".to_string(),
            artifact_dir: "dist".to_string(),
        }
    }
}

impl ToolchainConfig {
    /// Returns the run command for the given mode.
    pub fn run_command(&self, dev: bool) -> &str {
        if dev {
            &self.start_dev
        } else {
            &self.start
        }
    }
}

/// Splits a configured command line into program and arguments.
///
/// `field` names the configuration key and only appears in error messages.
pub fn split_command(line: &str, field: &str) -> Result<Vec<String>> {
    let parts = shell_words::split(line).map_err(|e| {
        FleetError::config_with_source(format!("{} is not a valid command line: '{}'", field, line), e)
    })?;
    if parts.is_empty() {
        return Err(FleetError::config(format!("{} must not be empty", field)));
    }
    Ok(parts)
}
