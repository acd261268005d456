//! Configuration module for fleetctl.
//!
//! This module provides all configuration types and loading functionality.
//! Configuration is read from a YAML file whose directory becomes the
//! workspace root; every relative path in it is resolved against that root.

mod compose;
mod logging;
mod supervision;
mod workspace;

pub use compose::{ComposeConfig, DatabaseConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use supervision::{SupervisionConfig, SupervisionStrategy};
pub use workspace::{split_command, ToolchainConfig, WorkspaceConfig};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::FleetError;
use crate::registry::ServiceRegistry;

/// Environment variable for configuration file path.
pub const ENV_CONFIG_PATH: &str = "FLEETCTL_CONFIG";

/// Configuration files searched in the current directory when no path is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["fleet.yaml", "fleet.yml"];

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace root; the directory of the loaded file.
    #[serde(skip)]
    pub root: PathBuf,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Workspace layout.
    pub workspace: WorkspaceConfig,

    /// Fetch, build and run commands.
    pub toolchain: ToolchainConfig,

    /// Compose engine configuration.
    pub compose: ComposeConfig,

    /// Database container configuration.
    pub database: DatabaseConfig,

    /// Supervision configuration.
    pub supervision: SupervisionConfig,

    /// Service declaration, `name: location[#branch]`, in execution order.
    pub services: IndexMap<String, String>,
}

impl Config {
    /// Loads configuration from an optional path.
    /// If path is None, uses default search paths.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, FleetError> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => {
                match DEFAULT_CONFIG_PATHS
                    .into_iter()
                    .find(|p| Path::new(p).exists())
                {
                    Some(p) => Self::load_from_path(p)?,
                    // No config file found, use defaults
                    None => Self::with_root(PathBuf::from(".")),
                }
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, FleetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FleetError::config_with_source(
                format!("Failed to read config file '{}'", path.display()),
                e,
            )
        })?;

        let mut config = Self::load_from_str(&content)?;
        config.root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(config)
    }

    /// Loads configuration from a YAML string.
    pub fn load_from_str(content: &str) -> Result<Self, FleetError> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| FleetError::config_with_source("Failed to parse config", e))?;
        config.root = PathBuf::from(".");

        config.validate()?;
        Ok(config)
    }

    fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("FLEETCTL_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.logging.level = level;
            }
        }
        if let Ok(format) = env::var("FLEETCTL_LOG_FORMAT") {
            if let Ok(format) = format.parse() {
                self.logging.format = format;
            }
        }
        if let Ok(strategy) = env::var("FLEETCTL_STRATEGY") {
            if let Ok(strategy) = strategy.parse() {
                self.supervision.default = Some(strategy);
            }
        }
    }

    /// Validates configuration.
    fn validate(&self) -> Result<(), FleetError> {
        if self.workspace.services_dir.trim().is_empty() {
            return Err(FleetError::config("workspace.services_dir must not be empty"));
        }
        if self.toolchain.git.trim().is_empty() {
            return Err(FleetError::config("toolchain.git must not be empty"));
        }
        if self.toolchain.artifact_dir.trim().is_empty() {
            return Err(FleetError::config("toolchain.artifact_dir must not be empty"));
        }

        split_command(&self.toolchain.install, "toolchain.install")?;
        split_command(&self.toolchain.build, "toolchain.build")?;
        split_command(&self.toolchain.start, "toolchain.start")?;
        split_command(&self.toolchain.start_dev, "toolchain.start_dev")?;
        split_command(
            &self.supervision.process_manager_install,
            "supervision.process_manager_install",
        )?;
        if let Some(terminal) = &self.supervision.terminal {
            split_command(terminal, "supervision.terminal")?;
        }

        if self.compose.program.trim().is_empty() {
            return Err(FleetError::config("compose.program must not be empty"));
        }
        if self.supervision.process_manager.trim().is_empty() {
            return Err(FleetError::config(
                "supervision.process_manager must not be empty",
            ));
        }

        // Surfaces malformed service sources at load time
        self.registry()?;

        Ok(())
    }

    /// Builds the service registry from the declaration.
    pub fn registry(&self) -> Result<ServiceRegistry, FleetError> {
        ServiceRegistry::load(&self.services)
    }

    /// Returns the directory holding the working copies.
    pub fn services_dir(&self) -> PathBuf {
        self.root.join(&self.workspace.services_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.workspace.services_dir, "services");
        assert_eq!(config.toolchain.git, "git");
        assert_eq!(config.compose.program, "docker-compose");
        assert_eq!(config.supervision.process_manager, "pm2");
        assert!(config.services.is_empty());
    }

    #[test]
    fn test_load_from_yaml() {
        let yaml = r#"
logging:
  level: debug
  format: json

workspace:
  services_dir: "checkouts"

toolchain:
  install: "pnpm install"
  build: "pnpm build"

supervision:
  default: managed

services:
  web: "git@example.com:acme/web.git#release"
  backend: "git@example.com:acme/backend.git"
  app: "git@example.com:acme/app.git"
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = Config::load_from_path(file.path()).unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.workspace.services_dir, "checkouts");
        assert_eq!(config.toolchain.install, "pnpm install");
        assert_eq!(
            config.supervision.default,
            Some(SupervisionStrategy::Managed)
        );
        assert_eq!(config.root, file.path().parent().unwrap());

        // Declaration order is preserved, not sorted
        let names: Vec<&String> = config.services.keys().collect();
        assert_eq!(names, vec!["web", "backend", "app"]);
    }

    #[test]
    fn test_services_dir_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.yaml");
        std::fs::write(&path, "services: {}\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.services_dir(), dir.path().join("services"));
    }

    #[test]
    fn test_validation_empty_branch_is_lenient() {
        let yaml = r#"
services:
  web: "git://x/web#"
"#;
        let config = Config::load_from_str(yaml).unwrap();
        let registry = config.registry().unwrap();
        assert_eq!(registry.entries().next().unwrap().branch, "main");
    }

    #[test]
    fn test_validation_empty_source() {
        let yaml = r#"
services:
  web: "  "
"#;
        let result = Config::load_from_str(yaml);
        assert!(matches!(result, Err(FleetError::InvalidDescriptor { .. })));
    }

    #[test]
    fn test_validation_bad_command_line() {
        let yaml = r#"
toolchain:
  build: "npm run 'build"
"#;
        let result = Config::load_from_str(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("toolchain.build"));
    }

    #[test]
    fn test_validation_empty_process_manager() {
        let yaml = r#"
supervision:
  process_manager: ""
"#;
        let result = Config::load_from_str(yaml);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("supervision.process_manager"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = Config::load(Some("/nonexistent/fleet.yaml"));
        assert!(matches!(result, Err(FleetError::Config { .. })));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::load_from_str("services: [unterminated");
        assert!(matches!(result, Err(FleetError::Config { .. })));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = Config::load_from_str(include_str!("../../fleet.example.yaml")).unwrap();
        let registry = config.registry().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["backend", "app"]);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        assert!(yaml.contains("services_dir:"));
        assert!(yaml.contains("process_manager:"));
        assert!(!yaml.contains("root:"));
    }
}
