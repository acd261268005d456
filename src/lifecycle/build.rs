//! Install+Build operation.

use super::Lifecycle;
use crate::config::split_command;
use crate::error::{FleetError, Result};
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::runner::CommandSpec;
use tracing::{error, info};

/// Which steps Install+Build runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVariant {
    /// Install dependencies, then build.
    Prepare,
    /// Build only.
    BuildOnly,
}

impl Lifecycle<'_> {
    /// Installs (for [`BuildVariant::Prepare`]) and builds every service, in
    /// registry order. Never pulls.
    pub async fn install_build(
        &self,
        registry: &ServiceRegistry,
        variant: BuildVariant,
    ) -> Result<Vec<String>> {
        let install = split_command(&self.toolchain.install, "toolchain.install")?;
        let build = split_command(&self.toolchain.build, "toolchain.build")?;

        let mut built = Vec::with_capacity(registry.len());
        for service in registry.entries() {
            if !self.workspace.inspect(service).has_working_copy() {
                error!(service = %service.name, "Working copy not found");
                return Err(FleetError::ServiceNotPulled {
                    service: service.name.clone(),
                });
            }

            if variant == BuildVariant::Prepare {
                info!(service = %service.name, "Installing dependencies");
                let exit_code = self.run_step(service, &install).await?;
                if exit_code != 0 {
                    return Err(FleetError::InstallFailed {
                        service: service.name.clone(),
                        exit_code,
                    });
                }
            }

            info!(service = %service.name, "Building service");
            let exit_code = self.run_step(service, &build).await?;
            if exit_code != 0 {
                return Err(FleetError::BuildFailed {
                    service: service.name.clone(),
                    exit_code,
                });
            }

            info!(service = %service.name, "Service built");
            built.push(service.name.clone());
        }
        Ok(built)
    }

    /// Runs one step inside the working copy and returns its exit code.
    async fn run_step(&self, service: &ServiceDescriptor, parts: &[String]) -> Result<i32> {
        let cmd = CommandSpec::from_parts(parts)
            .ok_or_else(|| FleetError::config("toolchain command must not be empty"))?
            .current_dir(self.workspace.working_copy(service));

        let result = self.runner.run_blocking(&cmd).await?;
        if !result.succeeded {
            error!(
                service = %service.name,
                command = %cmd,
                exit_code = result.exit_code,
                "Step failed"
            );
        }
        Ok(result.exit_code)
    }
}
