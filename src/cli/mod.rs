//! Command-line interface for updatego

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;
pub mod context;

/// updatego - Go toolchain updater
#[derive(Parser)]
#[command(
    name = "updatego",
    version,
    about = "Keep a local Go toolchain current with verified, zero-downtime installs",
    long_about = "updatego resolves the newest stable Go release, downloads and checksum-verifies \
the archive, and swaps the local installation behind bin-directory symlinks."
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Auto-answer yes to all prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Path to an alternate configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether a newer stable release is available
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Overall deadline, e.g. "90s" or "2m"
        #[arg(long, default_value = "2m")]
        timeout: String,
    },

    /// Download, verify, and install the newest stable release
    Update {
        /// Only report what would happen; do not download or install
        #[arg(long)]
        check: bool,

        /// Install without asking for confirmation
        #[arg(short, long)]
        force: bool,

        /// Skip running the installed entry point after installing
        #[arg(long)]
        no_verify: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Overall deadline for the whole pipeline, e.g. "10m"
        #[arg(long, default_value = "10m")]
        timeout: String,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: Shell,
    },
}
