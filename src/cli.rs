//! Command-line interface definition for fleetctl.
//!
//! This module defines the CLI structure using clap derive macros,
//! including all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{LogLevel, SupervisionStrategy};
use crate::dependency::DependencyState;

/// fleetctl - Service fleet orchestrator
///
/// Fetches, builds and runs a declared set of services, together with the
/// database and container environment they depend on.
#[derive(Debug, Parser)]
#[command(name = "fleetctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "FLEETCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level requested by `-v`/`-q`, if any.
    ///
    /// `None` leaves the configured level in effect.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            return Some(LogLevel::Error);
        }

        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone missing services and update present ones
    Pull,

    /// Build every pulled service
    Build,

    /// Install dependencies and build every pulled service
    Prepare,

    /// Bring the database up and launch every service
    Start(StartArgs),

    /// Operate on the container environment
    Env(EnvArgs),

    /// Build and start the container environment
    Deploy(DevArgs),

    /// Control the database containers
    Db(DbArgs),

    /// List services and their lifecycle state
    List(ListArgs),

    /// Configuration file operations
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Arguments for the `start` subcommand.
#[derive(Debug, Args)]
pub struct StartArgs {
    /// Use the development run command
    #[arg(long, env = "FLEETCTL_DEV")]
    pub dev: bool,

    /// Supervision strategy (direct, managed); prompts when unset
    #[arg(short, long, value_parser = parse_strategy)]
    pub strategy: Option<SupervisionStrategy>,
}

/// Arguments for the `env` subcommand.
#[derive(Debug, Args)]
pub struct EnvArgs {
    /// Action: status, logs, stop, restart, down, clean
    pub action: String,

    /// Use the development profile
    #[arg(long, env = "FLEETCTL_DEV")]
    pub dev: bool,
}

/// Profile selection shared by commands that only take `--dev`.
#[derive(Debug, Args)]
pub struct DevArgs {
    /// Use the development profile
    #[arg(long, env = "FLEETCTL_DEV")]
    pub dev: bool,
}

/// Arguments for the `db` subcommand.
#[derive(Debug, Args)]
pub struct DbArgs {
    /// Target state: up, stop, down
    #[arg(value_parser = parse_db_state)]
    pub state: DependencyState,
}

/// Arguments for the `list` subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Validate the configuration file
    Validate,

    /// Show the current configuration
    Show,
}

/// Parse supervision strategy from string.
fn parse_strategy(s: &str) -> Result<SupervisionStrategy, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid strategy '{}'. Valid strategies: direct, managed",
            s
        )
    })
}

/// Parse database state from string.
fn parse_db_state(s: &str) -> Result<DependencyState, String> {
    s.parse()
}
