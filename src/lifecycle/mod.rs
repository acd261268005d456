//! Service lifecycle - working copies, derived state and the fetch/build
//! operations over the registry.
//!
//! Lifecycle state is never stored. It is derived from the filesystem every
//! time it is needed, so an operation always sees the effect of the previous
//! one.

mod build;
mod pull;


pub use build::BuildVariant;
pub use pull::PullAction;

use crate::config::{Config, ToolchainConfig};
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::runner::CommandRunner;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Lifecycle state of a service, derived from its working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// No working copy.
    Absent,
    /// Working copy exists, build status unknown.
    Present,
    /// Working copy exists and contains build artifacts.
    Built,
}

impl LifecycleState {
    /// Returns true when a working copy exists.
    pub fn has_working_copy(&self) -> bool {
        !matches!(self, LifecycleState::Absent)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Absent => write!(f, "absent"),
            LifecycleState::Present => write!(f, "present"),
            LifecycleState::Built => write!(f, "built"),
        }
    }
}

/// On-disk layout of the fleet.
#[derive(Debug, Clone)]
pub struct Workspace {
    services_dir: PathBuf,
    artifact_dir: String,
}

impl Workspace {
    /// Creates a workspace rooted at `services_dir`.
    pub fn new(services_dir: impl Into<PathBuf>, artifact_dir: impl Into<String>) -> Self {
        Self {
            services_dir: services_dir.into(),
            artifact_dir: artifact_dir.into(),
        }
    }

    /// Creates the workspace described by the configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.services_dir(), config.toolchain.artifact_dir.clone())
    }

    /// Directory holding every working copy.
    pub fn services_dir(&self) -> &Path {
        &self.services_dir
    }

    /// Working copy path of a service.
    pub fn working_copy(&self, service: &ServiceDescriptor) -> PathBuf {
        self.services_dir.join(&service.name)
    }

    /// Derives the lifecycle state of a service from the filesystem.
    pub fn inspect(&self, service: &ServiceDescriptor) -> LifecycleState {
        let path = self.working_copy(service);
        if !path.is_dir() {
            LifecycleState::Absent
        } else if path.join(&self.artifact_dir).exists() {
            LifecycleState::Built
        } else {
            LifecycleState::Present
        }
    }

    /// Derives the state of every service, in registry order.
    pub fn snapshot<'r>(
        &self,
        registry: &'r ServiceRegistry,
    ) -> Vec<(&'r ServiceDescriptor, LifecycleState)> {
        registry
            .entries()
            .map(|service| (service, self.inspect(service)))
            .collect()
    }
}

/// Fetch and build operations over a registry.
///
/// Both operations are fail-fast: the first service that fails stops the
/// whole run, and later services are not touched.
pub struct Lifecycle<'a> {
    workspace: &'a Workspace,
    toolchain: &'a ToolchainConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Lifecycle<'a> {
    /// Creates the lifecycle operations for a workspace.
    pub fn new(
        workspace: &'a Workspace,
        toolchain: &'a ToolchainConfig,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            workspace,
            toolchain,
            runner,
        }
    }
}
