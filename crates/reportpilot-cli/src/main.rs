//! ReportPilot CLI - weekly reporting pipeline.

mod cli;
mod commands;
mod input;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Clean {
            file,
            config,
            output,
        } => commands::clean::run(file, config, output, cli.verbose),

        Commands::Summarize {
            file,
            config,
            output,
        } => commands::summarize::run(file, config, output, cli.verbose),

        Commands::Run {
            file,
            config,
            output,
        } => commands::run::run(file, config, output, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
