//! Command runner - the single seam through which every external program runs.
//!
//! Operations describe what to run with a [`CommandSpec`] and how with an
//! [`ExecMode`]; the [`CommandRunner`] implementation decides how to spawn it.
//! All callers share one error-mapping path.

pub mod process;

#[cfg(test)]
pub(crate) mod recording;

use crate::error::{FleetError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

pub use process::ProcessRunner;

/// How a command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Wait for exit, forwarding output live.
    Blocking,
    /// Launch, disown and return immediately.
    Detached,
}

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
    /// Working directory; inherited when unset.
    pub working_dir: Option<PathBuf>,
    /// Output destination for detached launches; discarded when unset.
    pub log_file: Option<PathBuf>,
}

impl CommandSpec {
    /// Creates a command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            log_file: None,
        }
    }

    /// Creates a command from an already split command line.
    ///
    /// Returns `None` for an empty command line.
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (program, args) = parts.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the log file for detached output.
    pub fn log_to(mut self, file: impl AsRef<Path>) -> Self {
        self.log_file = Some(file.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(self.program.as_str());
        words.extend(self.args.iter().map(String::as_str));
        write!(f, "{}", shell_words::join(words))
    }
}

/// Result of a blocking invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Whether the exit code is zero.
    pub succeeded: bool,
}

impl CommandResult {
    /// Creates a result from an exit code.
    pub fn from_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            succeeded: exit_code == 0,
        }
    }

    /// Converts a non-zero exit into [`FleetError::CommandFailed`].
    pub fn check(&self, command: &CommandSpec) -> Result<()> {
        if self.succeeded {
            Ok(())
        } else {
            Err(FleetError::CommandFailed {
                command: command.to_string(),
                exit_code: self.exit_code,
            })
        }
    }
}

/// Outcome of [`CommandRunner::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A blocking command ran to completion.
    Completed(CommandResult),
    /// A detached command was launched and disowned.
    Detached {
        /// Process id, when the platform reports one.
        pid: Option<u32>,
    },
}

/// Trait for command runners.
///
/// There is no timeout: a blocking command that never exits blocks the
/// caller forever.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command in the given mode.
    async fn run(&self, command: &CommandSpec, mode: ExecMode) -> Result<RunOutcome>;

    /// Looks a program up on the execution path.
    fn resolve(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    /// Runs a command to completion and returns its result.
    async fn run_blocking(&self, command: &CommandSpec) -> Result<CommandResult> {
        match self.run(command, ExecMode::Blocking).await? {
            RunOutcome::Completed(result) => Ok(result),
            RunOutcome::Detached { .. } => Err(FleetError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "runner detached a blocking command",
                ),
            }),
        }
    }

    /// Launches a command without waiting for it.
    async fn spawn_detached(&self, command: &CommandSpec) -> Result<Option<u32>> {
        match self.run(command, ExecMode::Detached).await? {
            RunOutcome::Detached { pid } => Ok(pid),
            RunOutcome::Completed(result) => {
                result.check(command)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_builder() {
        let cmd = CommandSpec::new("git")
            .arg("clone")
            .args(["--branch", "main"])
            .current_dir("/tmp");

        assert_eq!(cmd.program, "git");
        assert_eq!(cmd.args, vec!["clone", "--branch", "main"]);
        assert_eq!(cmd.working_dir, Some(PathBuf::from("/tmp")));
        assert!(cmd.log_file.is_none());
    }

    #[test]
    fn test_command_spec_from_parts() {
        let parts = vec!["npm".to_string(), "run".to_string(), "build".to_string()];
        let cmd = CommandSpec::from_parts(&parts).unwrap();
        assert_eq!(cmd.program, "npm");
        assert_eq!(cmd.args, vec!["run", "build"]);

        assert!(CommandSpec::from_parts(&[]).is_none());
    }

    #[test]
    fn test_command_spec_display_quotes() {
        let cmd = CommandSpec::new("npm").args(["run", "start dev"]);
        assert_eq!(cmd.to_string(), "npm run 'start dev'");
    }

    #[test]
    fn test_command_result() {
        let ok = CommandResult::from_exit_code(0);
        assert!(ok.succeeded);
        assert!(ok.check(&CommandSpec::new("true")).is_ok());

        let failed = CommandResult::from_exit_code(3);
        assert!(!failed.succeeded);
        let err = failed.check(&CommandSpec::new("false")).unwrap_err();
        assert!(matches!(
            err,
            FleetError::CommandFailed { exit_code: 3, .. }
        ));
    }
}
