//! Managed supervision.
//!
//! Services are registered as named processes with a process manager daemon
//! (pm2 by default) so they can later be inspected, stopped and tailed by
//! name. Registration is best-effort across the fleet: a service that fails
//! to register is reported and the next one is still registered.

use super::{LaunchOutcome, LaunchReport, SupervisionContext, SupervisionStrategy, Supervisor};
use crate::config::split_command;
use crate::error::{FleetError, Result};
use crate::registry::ServiceDescriptor;
use crate::runner::CommandSpec;
use async_trait::async_trait;
use tracing::{error, info, warn};

/// Registers services with a process manager.
pub struct ManagedSupervisor<'a> {
    context: SupervisionContext<'a>,
}

impl<'a> ManagedSupervisor<'a> {
    /// Creates a managed supervisor.
    pub fn new(context: SupervisionContext<'a>) -> Self {
        Self { context }
    }

    fn program(&self) -> &str {
        &self.context.supervision.process_manager
    }

    /// Installs the process manager when it is not on PATH.
    async fn ensure_process_manager(&self) -> Result<()> {
        if let Some(path) = self.context.runner.resolve(self.program()) {
            info!(path = %path.display(), "Process manager found");
            return Ok(());
        }

        info!(program = %self.program(), "Process manager not found, installing");
        let parts = split_command(
            &self.context.supervision.process_manager_install,
            "supervision.process_manager_install",
        )?;
        let cmd = CommandSpec::from_parts(&parts)
            .ok_or_else(|| FleetError::config("process manager install command is empty"))?;

        // An installer that cannot even be started counts as a failed install
        let exit_code = match self.context.runner.run_blocking(&cmd).await {
            Ok(result) if result.succeeded => return Ok(()),
            Ok(result) => result.exit_code,
            Err(e) => {
                error!(command = %cmd, error = %e, "Could not run process manager installer");
                -1
            }
        };

        error!(exit_code, "Failed to install process manager");
        Err(FleetError::ProcessManagerInstallFailed {
            program: self.program().to_string(),
            exit_code,
        })
    }

    /// `<pm> start <program> --name <service> -- <args...>`
    fn register_command(&self, service: &ServiceDescriptor, run: &[String]) -> Option<CommandSpec> {
        let (program, args) = run.split_first()?;
        Some(
            CommandSpec::new(self.program())
                .arg("start")
                .arg(program)
                .args(["--name", service.name.as_str(), "--"])
                .args(args.iter().cloned())
                .current_dir(self.context.workspace.working_copy(service)),
        )
    }

    async fn register(&self, service: &ServiceDescriptor, run: &[String]) -> LaunchOutcome {
        if !self.context.workspace.inspect(service).has_working_copy() {
            warn!(
                service = %service.name,
                "Working copy not found, skipping (run `fleetctl pull` first)"
            );
            return LaunchOutcome::Skipped {
                reason: "working copy not found".to_string(),
            };
        }

        let Some(cmd) = self.register_command(service, run) else {
            return LaunchOutcome::Failed {
                reason: "run command is empty".to_string(),
            };
        };

        info!(service = %service.name, command = %cmd, "Registering service");
        match self.context.runner.run_blocking(&cmd).await {
            Ok(result) if result.succeeded => {
                info!(service = %service.name, "Service registered");
                LaunchOutcome::Registered
            }
            Ok(result) => {
                error!(
                    service = %service.name,
                    exit_code = result.exit_code,
                    "Failed to register service"
                );
                LaunchOutcome::Failed {
                    reason: format!("exit code {}", result.exit_code),
                }
            }
            Err(e) => {
                error!(service = %service.name, error = %e, "Failed to register service");
                LaunchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Shows the daemon's view of every managed process.
    async fn show_status(&self) {
        let cmd = CommandSpec::new(self.program()).arg("status");
        match self.context.runner.run_blocking(&cmd).await {
            Ok(result) if result.succeeded => {}
            Ok(result) => warn!(exit_code = result.exit_code, "Process manager status failed"),
            Err(e) => warn!(error = %e, "Process manager status failed"),
        }
    }
}

#[async_trait]
impl<'a> Supervisor for ManagedSupervisor<'a> {
    fn strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::Managed
    }

    async fn launch(&self, services: &[&ServiceDescriptor]) -> Result<LaunchReport> {
        let run = self.context.run_command()?;
        self.ensure_process_manager().await?;

        let mut report = LaunchReport::new(SupervisionStrategy::Managed);
        for service in services {
            let outcome = self.register(service, &run).await;
            report.record(&service.name, outcome);
        }

        self.show_status().await;
        Ok(report)
    }
}
