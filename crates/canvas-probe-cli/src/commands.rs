//! CLI command definitions using clap

use canvas_probe::ProfileName;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// canvas-probe: UI testing for canvas-rendered calculators
#[derive(Parser, Debug)]
#[command(name = "canvas-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the synthetic DOM of a profile for a canvas size
    Layout(LayoutArgs),

    /// Open the calculator in a browser and run scenarios
    Run(RunArgs),

    /// Save canvas, overlay and display captures for layout debugging
    Inspect(InspectArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Configuration source shared by the subcommands
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Calculator profile (overrides the configuration file)
    #[arg(short, long)]
    pub profile: Option<ProfileArg>,
}

/// Arguments for the layout command
#[derive(Parser, Debug)]
pub struct LayoutArgs {
    /// Where the layout comes from
    #[command(flatten)]
    pub source: ConfigSource,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: u32,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Where the configuration comes from
    #[command(flatten)]
    pub source: ConfigSource,

    /// Built-in scenario to run (repeatable; default: all)
    #[arg(short, long = "scenario")]
    pub scenarios: Vec<String>,

    /// YAML file with additional scenarios
    #[arg(long)]
    pub scenario_file: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Where the configuration comes from
    #[command(flatten)]
    pub source: ConfigSource,

    /// Output directory for the captures
    #[arg(short, long, default_value = "target/canvas-probe")]
    pub output: PathBuf,

    /// Disable the chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Where the configuration comes from
    #[command(flatten)]
    pub source: ConfigSource,

    /// Write the effective configuration to this file instead of stdout
    #[arg(long)]
    pub write: Option<PathBuf>,
}

/// Calculator profile argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileArg {
    /// online-calculator.com
    OnlineCalculator,
    /// livecode.com demo
    Livecode,
}

impl From<ProfileArg> for ProfileName {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::OnlineCalculator => Self::OnlineCalculator,
            ProfileArg::Livecode => Self::Livecode,
        }
    }
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() {
        let cli = Cli::try_parse_from([
            "canvas-probe",
            "layout",
            "--profile",
            "livecode",
            "--width",
            "320",
            "--height",
            "480",
        ])
        .unwrap();
        match cli.command {
            Commands::Layout(args) => {
                assert_eq!(args.source.profile, Some(ProfileArg::Livecode));
                assert_eq!((args.width, args.height), (320, 480));
                assert_eq!(args.format, FormatArg::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_repeated_scenarios() {
        let cli = Cli::try_parse_from([
            "canvas-probe",
            "-vv",
            "run",
            "-s",
            "clear",
            "-s",
            "one-plus-two",
            "--no-sandbox",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.scenarios, vec!["clear", "one-plus-two"]);
                assert!(args.no_sandbox);
                assert!(!args.headful);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_layout_requires_size() {
        assert!(Cli::try_parse_from(["canvas-probe", "layout", "--width", "10"]).is_err());
    }

    #[test]
    fn test_profile_arg_into_name() {
        assert_eq!(
            ProfileName::from(ProfileArg::OnlineCalculator),
            ProfileName::OnlineCalculator
        );
    }
}
