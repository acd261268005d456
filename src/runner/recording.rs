//! Recording runner used by operation tests.
//!
//! Records every invocation in order and answers with scripted exit codes
//! instead of spawning anything.

use crate::error::{FleetError, Result};
use crate::runner::{CommandResult, CommandRunner, CommandSpec, ExecMode, RunOutcome};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

type ExitRule = Box<dyn Fn(&CommandSpec) -> Option<i32> + Send + Sync>;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: CommandSpec,
    pub mode: ExecMode,
}

impl Invocation {
    /// The command line, without working directory.
    pub fn line(&self) -> String {
        self.command.to_string()
    }
}

#[derive(Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<Invocation>>,
    rules: Vec<ExitRule>,
    unresolved: HashSet<String>,
    not_found: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exit-code rule; the first rule returning `Some` wins,
    /// unmatched commands exit 0.
    pub fn with_exit_code<F>(mut self, rule: F) -> Self
    where
        F: Fn(&CommandSpec) -> Option<i32> + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Makes `program` invisible to `resolve` while still runnable.
    pub fn unresolved(mut self, program: &str) -> Self {
        self.unresolved.insert(program.to_string());
        self
    }

    /// Makes every invocation of `program` fail with `ExecutableNotFound`.
    pub fn not_found(mut self, program: &str) -> Self {
        self.unresolved.insert(program.to_string());
        self.not_found.insert(program.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Recorded command lines in order.
    pub fn lines(&self) -> Vec<String> {
        self.invocations().iter().map(Invocation::line).collect()
    }

    pub fn count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec, mode: ExecMode) -> Result<RunOutcome> {
        if self.not_found.contains(&command.program) {
            return Err(FleetError::ExecutableNotFound {
                program: command.program.clone(),
            });
        }

        self.invocations.lock().unwrap().push(Invocation {
            command: command.clone(),
            mode,
        });

        let exit_code = self
            .rules
            .iter()
            .find_map(|rule| rule(command))
            .unwrap_or(0);

        match mode {
            ExecMode::Blocking => Ok(RunOutcome::Completed(CommandResult::from_exit_code(
                exit_code,
            ))),
            ExecMode::Detached if exit_code == 0 => Ok(RunOutcome::Detached { pid: Some(4242) }),
            ExecMode::Detached => Err(FleetError::Spawn {
                program: command.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "scripted"),
            }),
        }
    }

    fn resolve(&self, program: &str) -> Option<PathBuf> {
        if self.unresolved.contains(program) {
            None
        } else {
            Some(PathBuf::from("/usr/bin").join(program))
        }
    }
}
