//! fleetctl - Service fleet orchestrator
//!
//! This crate drives the development and deployment lifecycle of a small
//! fleet of independently versioned services: fetching their source, building
//! them, running them, and operating the container environment they share.
//!
//! # Overview
//!
//! Every operation walks the declared services in order and drives external
//! programs (git, the package manager, the compose engine, a process manager)
//! through a single [`runner::CommandRunner`] seam. No state is kept between
//! invocations; lifecycle state is re-derived from the filesystem each time.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Configuration file parsing and validation
//! - [`dependency`] - Database container control
//! - [`environment`] - Compose environment actions and deploy
//! - [`error`] - Error types and error handling
//! - [`lifecycle`] - Workspace inspection, pull and build
//! - [`prompt`] - Interactive strategy selection
//! - [`registry`] - Service declarations
//! - [`runner`] - External program execution
//! - [`supervision`] - Direct and managed launch strategies

pub mod cli;
pub mod config;
pub mod dependency;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod prompt;
pub mod registry;
pub mod runner;
pub mod supervision;

// Re-exports for convenience
pub use cli::Cli;
pub use config::Config;
pub use error::{FleetError, Result};
pub use registry::{ServiceDescriptor, ServiceRegistry};
pub use runner::{CommandRunner, ProcessRunner};
