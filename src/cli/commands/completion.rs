//! Completion command implementation

use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

/// Generate shell completion scripts
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin_name = "updatego";

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
