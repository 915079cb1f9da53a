//! canvas-probe CLI library
//!
//! Command-line front end for the canvas-probe calculator harness: layout
//! inspection, scenario runs against a real browser, and capture dumps for
//! tuning layout tables.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigSource, FormatArg, InspectArgs, LayoutArgs,
    ProfileArg, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{describe_outcome, render_dom, ProgressReporter};
