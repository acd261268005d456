//! Error types and error handling for fleetctl.
//!
//! This module defines the error taxonomy shared by every operation,
//! together with the CLI exit codes each error maps to.

use thiserror::Error;

/// CLI exit codes.
pub mod exit_code {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error (any failed operation)
    pub const GENERAL_ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 2;
}

/// The main error type for fleetctl.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Configuration file is invalid or cannot be loaded.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A registry entry could not be parsed.
    #[error("Invalid descriptor for service '{service}': {reason}")]
    InvalidDescriptor { service: String, reason: String },

    /// The program is not resolvable on the execution path.
    #[error("Executable not found: {program}")]
    ExecutableNotFound { program: String },

    /// The program was found but could not be spawned.
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited with a non-zero status.
    #[error("Command '{command}' failed with exit code {exit_code}")]
    CommandFailed { command: String, exit_code: i32 },

    /// The service has no working copy yet.
    #[error("Service '{service}' has not been pulled (run `fleetctl pull` first)")]
    ServiceNotPulled { service: String },

    /// Cloning a service failed.
    #[error("Failed to clone service '{service}' (exit code {exit_code})")]
    CloneFailed { service: String, exit_code: i32 },

    /// Updating an existing working copy failed.
    #[error("Failed to update service '{service}' (exit code {exit_code})")]
    UpdateFailed { service: String, exit_code: i32 },

    /// Installing a service's dependencies failed.
    #[error("Failed to install dependencies for service '{service}' (exit code {exit_code})")]
    InstallFailed { service: String, exit_code: i32 },

    /// Building a service failed.
    #[error("Failed to build service '{service}' (exit code {exit_code})")]
    BuildFailed { service: String, exit_code: i32 },

    /// The database could not be moved to the requested state.
    #[error("Failed to bring database to state '{target}' (exit code {exit_code})")]
    DependencyControlFailed { target: String, exit_code: i32 },

    /// The compose directory for the database does not exist.
    #[error("Compose directory not found: {}", path.display())]
    ComposeDirectoryNotFound { path: std::path::PathBuf },

    /// On-demand installation of the process manager failed.
    #[error("Failed to install process manager '{program}' (exit code {exit_code})")]
    ProcessManagerInstallFailed { program: String, exit_code: i32 },

    /// One or more services could not be launched or registered.
    #[error("Failed to launch services: {}", failed.join(", "))]
    RegistrationIncomplete { failed: Vec<String> },

    /// The environment action is not recognised.
    #[error("Unknown action '{action}' (expected one of: status, logs, stop, restart, down, clean)")]
    UnknownAction { action: String },

    /// The compose file for the selected profile does not exist.
    #[error("Compose file for profile '{profile}' not found: {}", path.display())]
    ProfileFileNotFound {
        profile: String,
        path: std::path::PathBuf,
    },

    /// The interactive prompt could not be completed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FleetError {
    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            FleetError::Config { .. }
            | FleetError::Yaml(_)
            | FleetError::InvalidDescriptor { .. } => exit_code::CONFIG_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }

    /// Returns the service this error is about, when there is one.
    pub fn service(&self) -> Option<&str> {
        match self {
            FleetError::InvalidDescriptor { service, .. }
            | FleetError::ServiceNotPulled { service }
            | FleetError::CloneFailed { service, .. }
            | FleetError::UpdateFailed { service, .. }
            | FleetError::InstallFailed { service, .. }
            | FleetError::BuildFailed { service, .. } => Some(service),
            _ => None,
        }
    }

    /// Returns the exit code of the subprocess behind this error, if any.
    pub fn subprocess_exit_code(&self) -> Option<i32> {
        match self {
            FleetError::CommandFailed { exit_code, .. }
            | FleetError::CloneFailed { exit_code, .. }
            | FleetError::UpdateFailed { exit_code, .. }
            | FleetError::InstallFailed { exit_code, .. }
            | FleetError::BuildFailed { exit_code, .. }
            | FleetError::DependencyControlFailed { exit_code, .. }
            | FleetError::ProcessManagerInstallFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Creates a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        FleetError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with a message and source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FleetError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an invalid descriptor error.
    pub fn invalid_descriptor(service: impl Into<String>, reason: impl Into<String>) -> Self {
        FleetError::InvalidDescriptor {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for fleetctl operations.
pub type Result<T> = std::result::Result<T, FleetError>;
