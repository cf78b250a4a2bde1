//! Command-line interface and orchestration for planguard
//!
//! This module implements the CLI commands and ties the other modules together:
//! loading configuration and resource manifests, running the scan, and
//! rendering reports.
//!
//! # Implementation Model
//!
//! ## Commands
//!
//! - **scan**: Load the configuration, any extra rules files and the resource
//!   manifests, drop excluded files, scan, and write a report. Fails when an
//!   active violation reaches the failure threshold.
//! - **validate**: Load and check the configuration, printing warnings for
//!   likely mistakes such as exceptions naming unknown rules
//! - **init**: Generate a default configuration file with example rules
//!
//! ## Execution Flow
//!
//! The `run` function parses command-line arguments using clap and routes
//! to the appropriate command handler. All output goes through the [`Host`]
//! so the commands can be driven from tests.
//!
//! Configuration is a TOML file with a `[settings]` table and lists of
//! `[[rule]]` and `[[exception]]` tables.

mod common;
mod config;
mod host;
mod init;
mod manifest;
mod run;
mod scan;
mod validate;

pub use common::{ColorMode, LogLevel};
pub use config::{Config, DEFAULT_CONFIG_TOML, Settings};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use manifest::{exclude_paths, load_resources};
pub use run::run;
pub use scan::{ScanArgs, scan};
pub use validate::{ValidateArgs, validate_config};
