//! Check command implementation

use crate::config::UpdateConfig;
use crate::update::Deadline;
use anyhow::Result;
use colored::Colorize;

/// Execute the check command
pub fn execute(config: &UpdateConfig, json: bool, timeout: &str) -> Result<()> {
    let deadline = Deadline::after(super::parse_timeout(timeout)?);
    let pipeline = super::build_pipeline(config, false)?;

    if !json {
        println!("{}", "Checking for updates...".bright_blue());
    }

    let report = pipeline.check(&deadline)?;

    if json {
        let output = serde_json::json!({
            "installed_version": report.installed,
            "latest_version": report.latest,
            "update_available": report.needs_update,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let installed_display = if report.installed.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        report.installed.bright_cyan().to_string()
    };
    println!("  Installed version: {}", installed_display);
    println!("  Latest version:    {}", report.latest.bright_cyan());

    if report.needs_update {
        println!(
            "{} Update available: {} → {}",
            "→".bright_yellow(),
            report.installed.dimmed(),
            report.latest.bright_green().bold()
        );
        println!("  Run {} to install it.", "updatego update".cyan());
    } else {
        println!(
            "{} You're running the latest version: {}",
            "✓".green(),
            report.installed.bright_green()
        );
    }

    Ok(())
}
