//! Direct supervision.
//!
//! Each service is launched detached, optionally inside a new terminal, and
//! left to run on its own. Nothing watches it afterwards, and one service
//! failing to launch does not hold back the rest.

use super::{LaunchOutcome, LaunchReport, SupervisionContext, SupervisionStrategy, Supervisor};
use crate::config::split_command;
use crate::error::{FleetError, Result};
use crate::lifecycle::LifecycleState;
use crate::registry::ServiceDescriptor;
use crate::runner::CommandSpec;
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Launches services as independent detached processes.
pub struct DirectSupervisor<'a> {
    context: SupervisionContext<'a>,
}

impl<'a> DirectSupervisor<'a> {
    /// Creates a direct supervisor.
    pub fn new(context: SupervisionContext<'a>) -> Self {
        Self { context }
    }

    /// Builds the detached command for a service.
    fn command(&self, service: &ServiceDescriptor, run: &[String]) -> Result<CommandSpec> {
        let supervision = self.context.supervision;

        let mut parts = match &supervision.terminal {
            Some(terminal) => split_command(terminal, "supervision.terminal")?,
            None => Vec::new(),
        };
        parts.extend(run.iter().cloned());

        let mut cmd = CommandSpec::from_parts(&parts)
            .ok_or_else(|| FleetError::config("run command must not be empty"))?
            .current_dir(self.context.workspace.working_copy(service));

        // A terminal shows the output itself
        if supervision.terminal.is_none() {
            if let Some(log_dir) = &supervision.log_dir {
                cmd = cmd.log_to(
                    self.context
                        .root
                        .join(log_dir)
                        .join(format!("{}.log", service.name)),
                );
            }
        }
        Ok(cmd)
    }
}

#[async_trait]
impl<'a> Supervisor for DirectSupervisor<'a> {
    fn strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::Direct
    }

    async fn launch(&self, services: &[&ServiceDescriptor]) -> Result<LaunchReport> {
        let run = self.context.run_command()?;
        let mut report = LaunchReport::new(SupervisionStrategy::Direct);

        for service in services {
            match self.context.workspace.inspect(service) {
                LifecycleState::Absent => {
                    warn!(
                        service = %service.name,
                        "Working copy not found, skipping (run `fleetctl pull` first)"
                    );
                    report.record(
                        &service.name,
                        LaunchOutcome::Skipped {
                            reason: "working copy not found".to_string(),
                        },
                    );
                    continue;
                }
                LifecycleState::Present => {
                    warn!(
                        service = %service.name,
                        "No build artifacts found, launching anyway"
                    );
                }
                LifecycleState::Built => {}
            }

            let cmd = self.command(service, &run)?;
            info!(service = %service.name, command = %cmd, "Launching service");
            let outcome = match self.context.runner.spawn_detached(&cmd).await {
                Ok(pid) => {
                    info!(service = %service.name, pid = ?pid, "Service launched");
                    LaunchOutcome::Launched { pid }
                }
                Err(e) => {
                    error!(service = %service.name, error = %e, "Failed to launch service");
                    LaunchOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.record(&service.name, outcome);
        }

        Ok(report)
    }
}
