//! updatego CLI
//!
//! Command-line interface for keeping a local Go toolchain current.

use anyhow::Result;
use clap::Parser;

use updatego::cli::{commands, context::CliContext, Cli, Commands};
use updatego::config::UpdateConfig;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    CliContext::set(CliContext {
        verbose: cli.verbose,
        quiet: cli.quiet,
        yes: cli.yes,
        non_interactive: !atty::is(atty::Stream::Stdin),
    });

    let config = match &cli.config {
        Some(path) => UpdateConfig::load_from(path)?,
        None => UpdateConfig::load()?,
    };

    // Execute the command
    match cli.command {
        Commands::Check { json, timeout } => commands::check::execute(&config, json, &timeout),
        Commands::Update {
            check,
            force,
            no_verify,
            json,
            timeout,
        } => commands::update::execute(&config, check, force, no_verify, json, &timeout),
        Commands::Completion { shell } => commands::completion::execute(shell),
    }
}
