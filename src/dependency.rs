//! Dependency controller - lifecycle of the shared database containers.
//!
//! The database state lives in the container runtime, not here. Every
//! transition is issued as an idempotent compose command, whatever state the
//! containers are currently in.

use crate::config::{ComposeConfig, DatabaseConfig};
use crate::error::{FleetError, Result};
use crate::runner::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, warn};

/// Target state of the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    /// Containers removed together with their data volumes.
    Down,
    /// Containers stopped, data preserved.
    Stopped,
    /// Containers running.
    Up,
}

impl std::fmt::Display for DependencyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyState::Down => write!(f, "down"),
            DependencyState::Stopped => write!(f, "stopped"),
            DependencyState::Up => write!(f, "up"),
        }
    }
}

impl FromStr for DependencyState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "start" => Ok(DependencyState::Up),
            "stop" | "stopped" => Ok(DependencyState::Stopped),
            "down" => Ok(DependencyState::Down),
            _ => Err(format!(
                "Invalid database state '{}'. Valid states: up, stop, down",
                s
            )),
        }
    }
}

/// Controller for the database containers.
pub struct DependencyController<'a> {
    program: &'a str,
    dir: PathBuf,
    file: Option<&'a str>,
    service: Option<&'a str>,
    runner: &'a dyn CommandRunner,
}

impl<'a> DependencyController<'a> {
    /// Creates a controller for the configured database.
    pub fn new(
        root: &Path,
        compose: &'a ComposeConfig,
        database: &'a DatabaseConfig,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        let dir = match &database.dir {
            Some(dir) => root.join(dir),
            None => compose.dir_in(root),
        };
        Self {
            program: &compose.program,
            dir,
            file: database.file.as_deref(),
            service: database.service.as_deref(),
            runner,
        }
    }

    /// Builds the compose command for a transition.
    fn command(&self, target: DependencyState) -> CommandSpec {
        let mut cmd = CommandSpec::new(self.program).current_dir(&self.dir);
        if let Some(file) = self.file {
            cmd = cmd.args(["-f", file]);
        }
        match target {
            DependencyState::Up => {
                cmd = cmd.args(["up", "-d"]);
                if let Some(service) = self.service {
                    cmd = cmd.arg(service);
                }
            }
            DependencyState::Stopped => {
                cmd = cmd.arg("stop");
                if let Some(service) = self.service {
                    cmd = cmd.arg(service);
                }
            }
            // down is project-wide; -v removes the data volumes
            DependencyState::Down => {
                cmd = cmd.args(["down", "-v"]);
            }
        }
        cmd
    }

    /// Moves the database to `target` with a single compose invocation.
    pub async fn transition(&self, target: DependencyState) -> Result<()> {
        if !self.dir.is_dir() {
            return Err(FleetError::ComposeDirectoryNotFound {
                path: self.dir.clone(),
            });
        }

        if target == DependencyState::Down {
            warn!("Removing database containers and data volumes");
        }
        info!(target = %target, "Transitioning database");

        let cmd = self.command(target);
        let result = self.runner.run_blocking(&cmd).await?;
        if !result.succeeded {
            error!(
                target = %target,
                exit_code = result.exit_code,
                "Database transition failed"
            );
            return Err(FleetError::DependencyControlFailed {
                target: target.to_string(),
                exit_code: result.exit_code,
            });
        }

        info!(target = %target, "Database transition complete");
        Ok(())
    }
}
