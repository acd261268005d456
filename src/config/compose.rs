//! Container runtime configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::environment::Profile;

/// Compose engine configuration shared by the environment controller and
/// the database controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Compose program.
    pub program: String,

    /// Container runtime program, used for system-wide pruning.
    pub docker: String,

    /// Directory holding the compose declaration files.
    pub dir: String,

    /// Declaration file for the production profile.
    pub production_file: String,

    /// Declaration file for the development profile.
    pub development_file: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            program: "docker-compose".to_string(),
            docker: "docker".to_string(),
            dir: "docker".to_string(),
            production_file: "docker-compose.yaml".to_string(),
            development_file: "docker-compose.dev.yaml".to_string(),
        }
    }
}

impl ComposeConfig {
    /// Returns the declaration file name for a profile.
    pub fn file_for(&self, profile: Profile) -> &str {
        match profile {
            Profile::Development => &self.development_file,
            Profile::Production => &self.production_file,
        }
    }

    /// Returns the compose directory resolved against the workspace root.
    pub fn dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.dir)
    }
}

/// Database container configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Compose directory for the database; defaults to `compose.dir`.
    pub dir: Option<String>,

    /// Compose file; the engine's default file is used when unset.
    pub file: Option<String>,

    /// Compose service name; the whole project is targeted when unset.
    pub service: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file: None,
            service: Some("db".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_defaults() {
        let compose = ComposeConfig::default();
        assert_eq!(compose.program, "docker-compose");
        assert_eq!(compose.file_for(Profile::Production), "docker-compose.yaml");
        assert_eq!(
            compose.file_for(Profile::Development),
            "docker-compose.dev.yaml"
        );
    }

    #[test]
    fn test_compose_dir_in_root() {
        let compose = ComposeConfig::default();
        assert_eq!(
            compose.dir_in(Path::new("/srv/fleet")),
            PathBuf::from("/srv/fleet/docker")
        );
    }

    #[test]
    fn test_database_defaults() {
        let db = DatabaseConfig::default();
        assert!(db.dir.is_none());
        assert!(db.file.is_none());
        assert_eq!(db.service, Some("db".to_string()));
    }
}
