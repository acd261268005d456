//! Supervision - turning built services into running processes.
//!
//! Two strategies share the [`Supervisor`] trait. Both launch every service
//! they can and record per-service outcomes in a [`LaunchReport`]; services
//! without a working copy are skipped, not failed.

pub mod direct;
pub mod managed;


use crate::config::{split_command, SupervisionConfig, ToolchainConfig};
use crate::dependency::{DependencyController, DependencyState};
use crate::error::{FleetError, Result};
use crate::lifecycle::Workspace;
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

pub use crate::config::SupervisionStrategy;
pub use direct::DirectSupervisor;
pub use managed::ManagedSupervisor;

/// What happened to one service during a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Launched detached.
    Launched {
        /// Process id, when known.
        pid: Option<u32>,
    },
    /// Registered with the process manager.
    Registered,
    /// Not launched, without counting as a failure.
    Skipped { reason: String },
    /// Launch or registration failed.
    Failed { reason: String },
}

impl std::fmt::Display for LaunchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchOutcome::Launched { pid: Some(pid) } => write!(f, "launched (pid {})", pid),
            LaunchOutcome::Launched { pid: None } => write!(f, "launched"),
            LaunchOutcome::Registered => write!(f, "registered"),
            LaunchOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
            LaunchOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-service outcomes of one launch, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    /// Strategy that produced the report.
    pub strategy: SupervisionStrategy,
    /// Outcome per service.
    pub entries: Vec<(String, LaunchOutcome)>,
}

impl LaunchReport {
    /// Creates an empty report.
    pub fn new(strategy: SupervisionStrategy) -> Self {
        Self {
            strategy,
            entries: Vec::new(),
        }
    }

    /// Records the outcome for a service.
    pub fn record(&mut self, service: impl Into<String>, outcome: LaunchOutcome) {
        self.entries.push((service.into(), outcome));
    }

    /// Returns the outcome recorded for a service.
    pub fn outcome(&self, service: &str) -> Option<&LaunchOutcome> {
        self.entries
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, outcome)| outcome)
    }

    /// Names of services whose launch failed.
    pub fn failed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, outcome)| matches!(outcome, LaunchOutcome::Failed { .. }))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Errors with [`FleetError::RegistrationIncomplete`] when any service failed.
    pub fn ensure_complete(&self) -> Result<()> {
        let failed = self.failed();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(FleetError::RegistrationIncomplete {
                failed: failed.into_iter().map(String::from).collect(),
            })
        }
    }
}

/// Trait for supervision strategies.
#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Returns the strategy this supervisor implements.
    fn strategy(&self) -> SupervisionStrategy;

    /// Launches the given services in order.
    async fn launch(&self, services: &[&ServiceDescriptor]) -> Result<LaunchReport>;
}

/// Everything a supervisor needs to build run commands.
#[derive(Clone, Copy)]
pub struct SupervisionContext<'a> {
    /// Workspace holding the working copies.
    pub workspace: &'a Workspace,
    /// Run commands.
    pub toolchain: &'a ToolchainConfig,
    /// Supervision settings.
    pub supervision: &'a SupervisionConfig,
    /// Workspace root, for resolving relative paths.
    pub root: &'a Path,
    /// Use the development run command.
    pub dev: bool,
    /// Runner for every command.
    pub runner: &'a dyn CommandRunner,
}

impl SupervisionContext<'_> {
    /// Splits the run command for the selected mode.
    pub fn run_command(&self) -> Result<Vec<String>> {
        let field = if self.dev {
            "toolchain.start_dev"
        } else {
            "toolchain.start"
        };
        split_command(self.toolchain.run_command(self.dev), field)
    }
}

/// Creates the supervisor for a strategy.
pub fn create_supervisor<'a>(
    strategy: SupervisionStrategy,
    context: SupervisionContext<'a>,
) -> Box<dyn Supervisor + 'a> {
    match strategy {
        SupervisionStrategy::Direct => Box::new(DirectSupervisor::new(context)),
        SupervisionStrategy::Managed => Box::new(ManagedSupervisor::new(context)),
    }
}

/// Brings the database up, then launches every service with `supervisor`.
///
/// A database that fails to come up aborts the start before any service is
/// touched.
pub async fn start(
    registry: &ServiceRegistry,
    dependency: &DependencyController<'_>,
    supervisor: &dyn Supervisor,
) -> Result<LaunchReport> {
    dependency.transition(DependencyState::Up).await?;

    let services: Vec<&ServiceDescriptor> = registry.entries().collect();
    info!(
        strategy = %supervisor.strategy(),
        services = ?registry.names().collect::<Vec<_>>(),
        "Launching services"
    );
    supervisor.launch(&services).await
}
