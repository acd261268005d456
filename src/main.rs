//! fleetctl - Service fleet orchestrator
//!
//! Entry point for the fleetctl application.

use clap::Parser;
use fleetctl::cli::{Cli, Commands, ConfigCommands, DbArgs, DevArgs, EnvArgs, ListArgs, StartArgs};
use fleetctl::config::{Config, LogFormat, LoggingConfig};
use fleetctl::dependency::DependencyController;
use fleetctl::environment::{EnvironmentController, Profile};
use fleetctl::error::exit_code;
use fleetctl::lifecycle::{BuildVariant, LifecycleState, Lifecycle, Workspace};
use fleetctl::registry::ServiceDescriptor;
use fleetctl::runner::{CommandRunner, ProcessRunner};
use fleetctl::supervision::{create_supervisor, SupervisionContext};
use fleetctl::{prompt, supervision, FleetError};
use serde::Serialize;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging settings come from the config file, so load it first. A broken
    // config is reported after logging is up.
    let config = Config::load(cli.config.as_deref());
    let logging = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();

    if let Err(e) = init_logging(&cli, &logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(exit_code::GENERAL_ERROR as u8);
    }

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(
                service = e.service(),
                exit_code = e.subprocess_exit_code(),
                "{}",
                e
            );
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Initialize the tracing subscriber from the logging config and CLI flags.
fn init_logging(
    cli: &Cli,
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = cli.log_level().unwrap_or(logging.level);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.into()).into())
        .from_env_lossy();

    // stdout belongs to the commands being run
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}

/// Main application logic.
fn run(cli: &Cli, config: fleetctl::Result<Config>) -> fleetctl::Result<()> {
    if let Commands::Config(subcmd) = &cli.command {
        return cmd_config(subcmd, config);
    }

    let config = config?;
    tracing::debug!(root = %config.root.display(), "Loaded configuration");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let runner = ProcessRunner::new();

    runtime.block_on(async {
        match &cli.command {
            Commands::Pull => cmd_pull(&config, &runner).await,
            Commands::Build => cmd_build(&config, &runner, BuildVariant::BuildOnly).await,
            Commands::Prepare => cmd_build(&config, &runner, BuildVariant::Prepare).await,
            Commands::Start(args) => cmd_start(&config, &runner, args).await,
            Commands::Env(args) => cmd_env(&config, &runner, args).await,
            Commands::Deploy(args) => cmd_deploy(&config, &runner, args).await,
            Commands::Db(args) => cmd_db(&config, &runner, args).await,
            Commands::List(args) => cmd_list(&config, args),
            Commands::Config(_) => Ok(()),
        }
    })
}

/// Handle the `pull` command.
async fn cmd_pull(config: &Config, runner: &dyn CommandRunner) -> fleetctl::Result<()> {
    let registry = config.registry()?;
    let workspace = Workspace::from_config(config);
    let lifecycle = Lifecycle::new(&workspace, &config.toolchain, runner);

    for (name, action) in lifecycle.pull(&registry).await? {
        println!("✓ {}: {}", name, action);
    }
    Ok(())
}

/// Handle the `build` and `prepare` commands.
async fn cmd_build(
    config: &Config,
    runner: &dyn CommandRunner,
    variant: BuildVariant,
) -> fleetctl::Result<()> {
    let registry = config.registry()?;
    let workspace = Workspace::from_config(config);
    let lifecycle = Lifecycle::new(&workspace, &config.toolchain, runner);

    for name in lifecycle.install_build(&registry, variant).await? {
        println!("✓ {}: built", name);
    }
    Ok(())
}

/// Handle the `start` command.
async fn cmd_start(
    config: &Config,
    runner: &dyn CommandRunner,
    args: &StartArgs,
) -> fleetctl::Result<()> {
    let registry = config.registry()?;
    let strategy = prompt::resolve_strategy(
        args.strategy,
        config.supervision.default,
        prompt::choose_strategy,
    )?;

    tracing::info!(
        strategy = %strategy,
        dev = args.dev,
        services = registry.len(),
        "Starting fleet"
    );

    let workspace = Workspace::from_config(config);
    let dependency =
        DependencyController::new(&config.root, &config.compose, &config.database, runner);
    let supervisor = create_supervisor(
        strategy,
        SupervisionContext {
            workspace: &workspace,
            toolchain: &config.toolchain,
            supervision: &config.supervision,
            root: &config.root,
            dev: args.dev,
            runner,
        },
    );

    let report = supervision::start(&registry, &dependency, supervisor.as_ref()).await?;

    println!("Fleet started ({})", report.strategy);
    for (name, outcome) in &report.entries {
        let mark = match outcome {
            supervision::LaunchOutcome::Failed { .. } => "✗",
            supervision::LaunchOutcome::Skipped { .. } => "-",
            _ => "✓",
        };
        println!("{} {}: {}", mark, name, outcome);
    }

    report.ensure_complete()
}

/// Handle the `env` command.
async fn cmd_env(
    config: &Config,
    runner: &dyn CommandRunner,
    args: &EnvArgs,
) -> fleetctl::Result<()> {
    let controller = EnvironmentController::new(&config.root, &config.compose, runner);
    controller
        .control(&args.action, Profile::from_dev_flag(args.dev))
        .await
}

/// Handle the `deploy` command.
async fn cmd_deploy(
    config: &Config,
    runner: &dyn CommandRunner,
    args: &DevArgs,
) -> fleetctl::Result<()> {
    let profile = Profile::from_dev_flag(args.dev);
    let controller = EnvironmentController::new(&config.root, &config.compose, runner);
    controller.deploy(profile).await?;
    println!("✓ Deployed {} environment", profile);
    Ok(())
}

/// Handle the `db` command.
async fn cmd_db(config: &Config, runner: &dyn CommandRunner, args: &DbArgs) -> fleetctl::Result<()> {
    let controller =
        DependencyController::new(&config.root, &config.compose, &config.database, runner);
    controller.transition(args.state).await?;
    println!("✓ Database {}", args.state);
    Ok(())
}

#[derive(Serialize)]
struct ListEntry<'a> {
    #[serde(flatten)]
    service: &'a ServiceDescriptor,
    state: LifecycleState,
}

/// Handle the `list` command.
fn cmd_list(config: &Config, args: &ListArgs) -> fleetctl::Result<()> {
    let registry = config.registry()?;
    let workspace = Workspace::from_config(config);
    let entries: Vec<ListEntry<'_>> = workspace
        .snapshot(&registry)
        .into_iter()
        .map(|(service, state)| ListEntry { service, state })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No services declared");
        return Ok(());
    }

    println!("{:<20} {:<8} {:<12} SOURCE", "NAME", "STATE", "BRANCH");
    for entry in &entries {
        println!(
            "{:<20} {:<8} {:<12} {}",
            entry.service.name,
            entry.state.to_string(),
            entry.service.branch,
            entry.service.source_location
        );
    }
    Ok(())
}

/// Handle the `config` subcommand.
fn cmd_config(subcmd: &ConfigCommands, config: fleetctl::Result<Config>) -> fleetctl::Result<()> {
    match subcmd {
        ConfigCommands::Validate => match config {
            Ok(config) => {
                println!(
                    "✓ Configuration is valid ({} services)",
                    config.services.len()
                );
                tracing::debug!(?config, "Validated configuration");
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid: {}", e);
                Err(e)
            }
        },
        ConfigCommands::Show => {
            let config = config?;
            let yaml = serde_yaml::to_string(&config).map_err(|e| {
                FleetError::config_with_source("Failed to serialize configuration", e)
            })?;
            println!("{}", yaml);
            Ok(())
        }
    }
}
