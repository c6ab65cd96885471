//! Command implementations

pub mod check;
pub mod completion;
pub mod update;

use crate::config::UpdateConfig;
use crate::update::{Checker, Downloader, Installer, UpdatePipeline};
use anyhow::{Context, Result};
use std::time::Duration;

/// Assemble the update pipeline from configuration.
///
/// One HTTP client is built here and shared by the resolver and the
/// downloader through cheap clones of its connection pool.
pub(crate) fn build_pipeline(config: &UpdateConfig, verify: bool) -> Result<UpdatePipeline> {
    let client = crate::update::http::build_client()?;
    let policy = config.poll_policy();

    let checker = Checker::with_feed_url(client.clone(), config.feed_url()).with_policy(policy);
    let downloader =
        Downloader::with_base_url(client, config.archive_base_url(), config.platform())
            .with_policy(policy);
    let installer = Installer::new(config.layout()?);

    Ok(UpdatePipeline::new(checker, downloader, installer).with_post_install_verify(verify))
}

/// Parse a human-friendly duration flag like "90s" or "10m"
pub(crate) fn parse_timeout(raw: &str) -> Result<Duration> {
    humantime::parse_duration(raw).with_context(|| format!("invalid --timeout value '{}'", raw))
}
