//! canvas-probe: drive canvas-rendered calculators through a synthetic DOM
//!
//! ## Usage
//!
//! ```bash
//! canvas-probe layout --profile livecode --width 320 --height 480
//! canvas-probe run --profile livecode -s one-plus-two
//! canvas-probe inspect --config probe.yaml --output captures/
//! canvas-probe config --profile livecode --write probe.yaml
//! ```

use canvas_probe_cli::{handlers, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::Layout(args) => handlers::layout(&args),
        Commands::Run(args) => handlers::run(&args, &config),
        Commands::Inspect(args) => handlers::inspect(&args, &config),
        Commands::Config(args) => handlers::config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
