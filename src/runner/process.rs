//! Process runner implementation.
//!
//! Spawns real subprocesses with `tokio::process`. Blocking commands inherit
//! the orchestrator's stdio so their output appears live and untouched.

use crate::error::{FleetError, Result};
use crate::runner::{CommandResult, CommandRunner, CommandSpec, ExecMode, RunOutcome};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runner that executes commands as operating system processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a new process runner.
    pub fn new() -> Self {
        Self
    }

    fn build(command: &CommandSpec) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Opens the detached output destination.
    fn detached_stdio(command: &CommandSpec) -> Result<(Stdio, Stdio)> {
        match &command.log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                let stderr = file.try_clone()?;
                Ok((Stdio::from(file), Stdio::from(stderr)))
            }
            None => Ok((Stdio::null(), Stdio::null())),
        }
    }
}

/// Maps a spawn failure, telling a missing program apart from other errors.
fn spawn_error(program: &str, error: std::io::Error) -> FleetError {
    if error.kind() == std::io::ErrorKind::NotFound && which::which(program).is_err() {
        FleetError::ExecutableNotFound {
            program: program.to_string(),
        }
    } else {
        FleetError::Spawn {
            program: program.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec, mode: ExecMode) -> Result<RunOutcome> {
        debug!(
            command = %command,
            working_dir = ?command.working_dir,
            mode = ?mode,
            "Executing command"
        );

        let mut cmd = Self::build(command);

        match mode {
            ExecMode::Blocking => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());

                let status = cmd
                    .status()
                    .await
                    .map_err(|e| spawn_error(&command.program, e))?;

                let result = CommandResult::from_exit_code(status.code().unwrap_or(-1));
                debug!(
                    command = %command,
                    exit_code = result.exit_code,
                    "Command completed"
                );
                Ok(RunOutcome::Completed(result))
            }
            ExecMode::Detached => {
                let (stdout, stderr) = Self::detached_stdio(command)?;
                cmd.stdin(Stdio::null())
                    .stdout(stdout)
                    .stderr(stderr)
                    .kill_on_drop(false);

                // Own process group, so a Ctrl-C aimed at us does not reach it
                #[cfg(unix)]
                cmd.process_group(0);

                let child = cmd
                    .spawn()
                    .map_err(|e| spawn_error(&command.program, e))?;
                let pid = child.id();
                debug!(command = %command, pid = ?pid, "Command detached");
                Ok(RunOutcome::Detached { pid })
            }
        }
    }
}
