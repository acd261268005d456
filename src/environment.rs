//! Environment controller - operational commands against the compose stack.
//!
//! Every action runs `<compose> -f <profile file> <verb>` inside the compose
//! directory. The action is parsed and the profile file checked before
//! anything is spawned.

use crate::config::ComposeConfig;
use crate::error::{FleetError, Result};
use crate::runner::{CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, warn};

/// Deployment profile, selecting the compose declaration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Development stack.
    Development,
    /// Production stack.
    Production,
}

impl Profile {
    /// Maps the `--dev` flag to a profile.
    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            Profile::Development
        } else {
            Profile::Production
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
        }
    }
}

/// Operational action on the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvAction {
    /// Show container status.
    Status,
    /// Show container logs.
    Logs,
    /// Stop containers.
    Stop,
    /// Restart containers.
    Restart,
    /// Remove containers.
    Down,
    /// Remove containers, images and volumes, then prune the runtime.
    Clean,
}

impl EnvAction {
    /// The compose verb for single-step actions.
    fn verb(self) -> &'static [&'static str] {
        match self {
            EnvAction::Status => &["ps"],
            EnvAction::Logs => &["logs"],
            EnvAction::Stop => &["stop"],
            EnvAction::Restart => &["restart"],
            EnvAction::Down => &["down"],
            EnvAction::Clean => &["down", "--rmi", "all", "--volumes"],
        }
    }
}

impl std::fmt::Display for EnvAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EnvAction::Status => "status",
            EnvAction::Logs => "logs",
            EnvAction::Stop => "stop",
            EnvAction::Restart => "restart",
            EnvAction::Down => "down",
            EnvAction::Clean => "clean",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EnvAction {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "status" => Ok(EnvAction::Status),
            "logs" => Ok(EnvAction::Logs),
            "stop" => Ok(EnvAction::Stop),
            "restart" => Ok(EnvAction::Restart),
            "down" => Ok(EnvAction::Down),
            "clean" => Ok(EnvAction::Clean),
            _ => Err(FleetError::UnknownAction {
                action: s.to_string(),
            }),
        }
    }
}

/// Runs environment actions against the compose stack.
pub struct EnvironmentController<'a> {
    dir: PathBuf,
    compose: &'a ComposeConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> EnvironmentController<'a> {
    /// Creates a controller rooted at the workspace root.
    pub fn new(root: &Path, compose: &'a ComposeConfig, runner: &'a dyn CommandRunner) -> Self {
        Self {
            dir: compose.dir_in(root),
            compose,
            runner,
        }
    }

    /// Returns the profile file name after checking that it exists.
    fn profile_file(&self, profile: Profile) -> Result<&'a str> {
        let file = self.compose.file_for(profile);
        let path = self.dir.join(file);
        if !path.is_file() {
            return Err(FleetError::ProfileFileNotFound {
                profile: profile.to_string(),
                path,
            });
        }
        Ok(file)
    }

    fn compose_command(&self, file: &str, verb: &[&str]) -> CommandSpec {
        CommandSpec::new(self.compose.program.as_str())
            .args(["-f", file])
            .args(verb.iter().copied())
            .current_dir(&self.dir)
    }

    async fn run_checked(&self, cmd: &CommandSpec) -> Result<()> {
        info!(command = %cmd, "Running");
        let result = self.runner.run_blocking(cmd).await?;
        if !result.succeeded {
            error!(command = %cmd, exit_code = result.exit_code, "Command failed");
        }
        result.check(cmd)
    }

    /// Parses `action` and runs it against the profile's compose file.
    pub async fn control(&self, action: &str, profile: Profile) -> Result<()> {
        let action: EnvAction = action.parse()?;
        let file = self.profile_file(profile)?;
        info!(action = %action, profile = %profile, "Environment action");

        if action != EnvAction::Clean {
            return self
                .run_checked(&self.compose_command(file, action.verb()))
                .await;
        }

        warn!(profile = %profile, "Removing containers, images and volumes");
        let teardown = self
            .run_checked(&self.compose_command(file, action.verb()))
            .await;
        let prune = CommandSpec::new(self.compose.docker.as_str()).args(["system", "prune", "-f"]);
        let pruned = self.run_checked(&prune).await;

        teardown.and(pruned)
    }

    /// Builds, starts and lists the stack for a profile.
    pub async fn deploy(&self, profile: Profile) -> Result<()> {
        let file = self.profile_file(profile)?;
        info!(profile = %profile, "Deploying");

        self.run_checked(&self.compose_command(file, &["build"]))
            .await?;
        self.run_checked(&self.compose_command(file, &["up", "-d"]))
            .await?;

        if let Err(e) = self
            .run_checked(&self.compose_command(file, &["ps"]))
            .await
        {
            warn!(error = %e, "Could not list containers after deploy");
        }

        info!(profile = %profile, "Deploy complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::recording::RecordingRunner;
    use tempfile::TempDir;

    fn setup(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let docker = dir.path().join("docker");
        std::fs::create_dir_all(&docker).unwrap();
        for file in files {
            std::fs::write(docker.join(file), "services: {}\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("status".parse::<EnvAction>().unwrap(), EnvAction::Status);
        assert_eq!("clean".parse::<EnvAction>().unwrap(), EnvAction::Clean);
        let err = "explode".parse::<EnvAction>().unwrap_err();
        assert!(matches!(err, FleetError::UnknownAction { ref action } if action == "explode"));
    }

    #[test]
    fn test_profile() {
        assert_eq!(Profile::from_dev_flag(true), Profile::Development);
        assert_eq!(Profile::from_dev_flag(false), Profile::Production);
        assert_eq!(Profile::Development.to_string(), "development");
    }

    #[tokio::test]
    async fn test_verbs() {
        let dir = setup(&["docker-compose.yaml"]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new();
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        for action in ["status", "logs", "stop", "restart", "down"] {
            controller.control(action, Profile::Production).await.unwrap();
        }

        assert_eq!(
            runner.lines(),
            vec![
                "docker-compose -f docker-compose.yaml ps",
                "docker-compose -f docker-compose.yaml logs",
                "docker-compose -f docker-compose.yaml stop",
                "docker-compose -f docker-compose.yaml restart",
                "docker-compose -f docker-compose.yaml down",
            ]
        );
        let docker_dir = dir.path().join("docker");
        assert!(runner
            .invocations()
            .iter()
            .all(|i| i.command.working_dir.as_deref() == Some(docker_dir.as_path())));
    }

    #[tokio::test]
    async fn test_missing_profile_file() {
        let dir = setup(&["docker-compose.yaml"]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new();
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        let err = controller
            .control("status", Profile::Development)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FleetError::ProfileFileNotFound { ref profile, .. } if profile == "development"
        ));
        assert_eq!(err.exit_code(), crate::error::exit_code::GENERAL_ERROR);
        assert_eq!(runner.count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_action_runs_nothing() {
        let dir = setup(&[]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new();
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        // action is checked before the profile file
        let err = controller
            .control("explode", Profile::Production)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::UnknownAction { .. }));
        assert_eq!(runner.count(), 0);
    }

    #[tokio::test]
    async fn test_failing_verb() {
        let dir = setup(&["docker-compose.yaml"]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new().with_exit_code(|_| Some(2));
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        let err = controller
            .control("restart", Profile::Production)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::CommandFailed { exit_code: 2, .. }));
    }

    #[tokio::test]
    async fn test_clean_always_prunes() {
        let dir = setup(&["docker-compose.dev.yaml"]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new()
            .with_exit_code(|cmd| (cmd.program == "docker-compose").then_some(1));
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        let err = controller
            .control("clean", Profile::Development)
            .await
            .unwrap_err();

        assert!(matches!(err, FleetError::CommandFailed { exit_code: 1, .. }));
        assert_eq!(
            runner.lines(),
            vec![
                "docker-compose -f docker-compose.dev.yaml down --rmi all --volumes",
                "docker system prune -f",
            ]
        );
        assert!(runner.invocations()[1].command.working_dir.is_none());
    }

    #[tokio::test]
    async fn test_clean_reports_prune_failure() {
        let dir = setup(&["docker-compose.yaml"]);
        let compose = ComposeConfig::default();
        let runner =
            RecordingRunner::new().with_exit_code(|cmd| (cmd.program == "docker").then_some(125));
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        let err = controller
            .control("clean", Profile::Production)
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::CommandFailed { exit_code: 125, .. }));
        assert_eq!(runner.count(), 2);
    }

    #[tokio::test]
    async fn test_deploy() {
        let dir = setup(&["docker-compose.yaml"]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new()
            .with_exit_code(|cmd| cmd.args.iter().any(|a| a == "ps").then_some(1));
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        controller.deploy(Profile::Production).await.unwrap();

        assert_eq!(
            runner.lines(),
            vec![
                "docker-compose -f docker-compose.yaml build",
                "docker-compose -f docker-compose.yaml up -d",
                "docker-compose -f docker-compose.yaml ps",
            ]
        );
    }

    #[tokio::test]
    async fn test_deploy_build_failure_stops() {
        let dir = setup(&["docker-compose.yaml"]);
        let compose = ComposeConfig::default();
        let runner = RecordingRunner::new().with_exit_code(|_| Some(1));
        let controller = EnvironmentController::new(dir.path(), &compose, &runner);

        assert!(controller.deploy(Profile::Production).await.is_err());
        assert_eq!(runner.count(), 1);
    }
}
