//! Pull operation.

use super::Lifecycle;
use crate::error::{FleetError, Result};
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::runner::CommandSpec;
use tracing::{error, info};

/// What Pull did to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullAction {
    /// The working copy was cloned.
    Cloned,
    /// The existing working copy was updated.
    Updated,
}

impl std::fmt::Display for PullAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullAction::Cloned => write!(f, "cloned"),
            PullAction::Updated => write!(f, "updated"),
        }
    }
}

impl Lifecycle<'_> {
    /// Clones missing working copies and updates existing ones, in registry
    /// order.
    pub async fn pull(&self, registry: &ServiceRegistry) -> Result<Vec<(String, PullAction)>> {
        let services_dir = self.workspace.services_dir();
        if !services_dir.exists() {
            tokio::fs::create_dir_all(services_dir).await?;
            info!(path = %services_dir.display(), "Created services directory");
        }

        let mut report = Vec::with_capacity(registry.len());
        for service in registry.entries() {
            let action = self.pull_service(service).await?;
            report.push((service.name.clone(), action));
        }
        Ok(report)
    }

    async fn pull_service(&self, service: &ServiceDescriptor) -> Result<PullAction> {
        let path = self.workspace.working_copy(service);

        if self.workspace.inspect(service).has_working_copy() {
            info!(
                service = %service.name,
                source = %service.source_location,
                "Updating service"
            );
            let cmd = CommandSpec::new(&self.toolchain.git)
                .arg("pull")
                .current_dir(&path);
            let result = self.runner.run_blocking(&cmd).await?;
            if !result.succeeded {
                error!(service = %service.name, exit_code = result.exit_code, "Failed to update service");
                return Err(FleetError::UpdateFailed {
                    service: service.name.clone(),
                    exit_code: result.exit_code,
                });
            }
            info!(service = %service.name, "Service updated");
            Ok(PullAction::Updated)
        } else {
            info!(
                service = %service.name,
                source = %service.source_location,
                branch = %service.branch,
                "Cloning service"
            );
            let cmd = CommandSpec::new(&self.toolchain.git)
                .args(["clone", "--branch"])
                .arg(&service.branch)
                .arg(&service.source_location)
                .arg(path.to_string_lossy());
            let result = self.runner.run_blocking(&cmd).await?;
            if !result.succeeded {
                error!(service = %service.name, exit_code = result.exit_code, "Failed to clone service");
                return Err(FleetError::CloneFailed {
                    service: service.name.clone(),
                    exit_code: result.exit_code,
                });
            }
            info!(service = %service.name, "Service cloned");
            Ok(PullAction::Cloned)
        }
    }
}
