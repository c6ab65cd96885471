//! Update command implementation

use crate::cli::context::CliContext;
use crate::config::UpdateConfig;
use crate::update::{Deadline, PipelineEvent, UpdateOutcome};
use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// Execute the update command
pub fn execute(
    config: &UpdateConfig,
    check_only: bool,
    force: bool,
    no_verify: bool,
    json: bool,
    timeout: &str,
) -> Result<()> {
    let deadline = Deadline::after(super::parse_timeout(timeout)?);

    if json {
        execute_json_mode(config, &deadline, check_only, no_verify)
    } else {
        execute_interactive_mode(config, &deadline, check_only, force, no_verify)
    }
}

/// Execute update in interactive mode
fn execute_interactive_mode(
    config: &UpdateConfig,
    deadline: &Deadline,
    check_only: bool,
    force: bool,
    no_verify: bool,
) -> Result<()> {
    let pipeline = super::build_pipeline(config, !no_verify)?;

    println!("{}", "Checking for updates...".bright_blue());
    let report = pipeline.check(deadline)?;

    if !report.needs_update {
        println!(
            "{} You're running the latest version: {}",
            "✓".green(),
            report.installed.bright_green()
        );
        return Ok(());
    }

    let from = if report.installed.is_empty() {
        "(none)".to_string()
    } else {
        report.installed.clone()
    };
    println!(
        "{} Update available: {} → {}",
        "→".bright_yellow(),
        from.dimmed(),
        report.latest.bright_green().bold()
    );

    if check_only {
        return Ok(());
    }

    let should_update = if force || CliContext::should_auto_accept() {
        true
    } else {
        Confirm::new()
            .with_prompt("Download and install this release?")
            .default(true)
            .interact()?
    };

    if !should_update {
        println!("Update cancelled.");
        return Ok(());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = pipeline.apply(deadline, &report, |event| match event {
        PipelineEvent::Downloading { version, url } => {
            spinner.set_message(format!("Downloading go{}... ({})", version, url));
        },
        PipelineEvent::Downloaded { path } => {
            spinner.println(format!(
                "  {} Downloaded to {}",
                "✓".green(),
                path.display().to_string().dimmed()
            ));
        },
        PipelineEvent::VerifyingChecksum => {
            spinner.set_message("Verifying checksum...");
        },
        PipelineEvent::ChecksumVerified => {
            spinner.println(format!("  {} Checksum verified", "✓".green()));
        },
        PipelineEvent::Installing => {
            spinner.set_message("Installing...");
        },
        PipelineEvent::Installed => {
            spinner.println(format!("  {} Toolchain installed", "✓".green()));
        },
        PipelineEvent::Verifying => {
            spinner.set_message("Verifying installation...");
        },
        PipelineEvent::Verified => {
            spinner.println(format!("  {} Installation verified", "✓".green()));
        },
    });
    spinner.finish_and_clear();

    match outcome? {
        UpdateOutcome::Updated {
            previous,
            installed,
            archive,
        } => {
            println!();
            println!("{}", "✓ Update completed successfully!".bright_green().bold());
            println!(
                "  {} Version {} is now installed",
                "→".cyan(),
                installed.bright_white()
            );
            if !previous.is_empty() {
                println!("  {} Replaced version {}", "→".cyan(), previous.dimmed());
            }
            println!(
                "  {} Downloaded archive kept at {}",
                "→".cyan(),
                archive.display().to_string().dimmed()
            );
            print_path_instructions(&pipeline.layout().bin_dir);
        },
        UpdateOutcome::UpToDate { .. } => {},
    }

    Ok(())
}

/// Execute update in JSON mode
fn execute_json_mode(
    config: &UpdateConfig,
    deadline: &Deadline,
    check_only: bool,
    no_verify: bool,
) -> Result<()> {
    let pipeline = super::build_pipeline(config, !no_verify)?;
    let report = pipeline.check(deadline)?;

    if check_only || !report.needs_update {
        let output = serde_json::json!({
            "installed_version": report.installed,
            "latest_version": report.latest,
            "update_available": report.needs_update,
            "action": if check_only { "check" } else { "no_update_needed" }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match pipeline.apply(deadline, &report, |_| {}) {
        Ok(UpdateOutcome::Updated {
            previous,
            installed,
            archive,
        }) => {
            let output = serde_json::json!({
                "action": "update_completed",
                "old_version": previous,
                "new_version": installed,
                "archive_path": archive,
                "status": "success"
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        },
        Ok(UpdateOutcome::UpToDate { installed }) => {
            let output = serde_json::json!({
                "action": "no_update_needed",
                "installed_version": installed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        },
        Err(e) => {
            let output = serde_json::json!({
                "action": "update_failed",
                "installed_version": report.installed,
                "latest_version": report.latest,
                "error": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        },
    }

    Ok(())
}

/// Print PATH setup instructions when the bin directory is not yet on PATH
fn print_path_instructions(bin_dir: &Path) {
    let on_path = std::env::var("PATH")
        .map(|path| path.split(':').any(|dir| Path::new(dir) == bin_dir))
        .unwrap_or(false);
    if on_path {
        return;
    }

    println!();
    println!(
        "{}",
        "To use Go, ensure the bin directory is in your PATH:".bright_yellow()
    );
    println!("  export PATH=\"$PATH:{}\"", bin_dir.display());
}
