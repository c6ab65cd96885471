//! Version resolution against the Go release feed
//!
//! Fetches the published release list, picks the newest stable entry, and
//! compares it with whatever is installed locally.

use crate::core::error::{Result, UpdateError};
use crate::core::types::{InstallLayout, Release, Version};
use crate::update::poll::{self, Deadline, PollOutcome, PollPolicy};
use reqwest::StatusCode;

/// Default release feed location
pub const GO_FEED_URL: &str = "https://go.dev/dl/?mode=json";

/// Tag prefixed to every version in the feed
const VERSION_PREFIX: &str = "go";

/// Name of the extracted toolchain directory below the install root
pub(crate) const TOOLCHAIN_DIR: &str = "go";

/// Resolves installed and latest Go versions
pub struct Checker {
    feed_url: String,
    policy: PollPolicy,
    client: reqwest::blocking::Client,
}

impl Checker {
    /// Create a checker against the default feed URL
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self::with_feed_url(client, GO_FEED_URL)
    }

    /// Create a checker against a custom feed URL
    pub fn with_feed_url(client: reqwest::blocking::Client, feed_url: impl Into<String>) -> Self {
        Checker {
            feed_url: feed_url.into(),
            policy: PollPolicy::default(),
            client,
        }
    }

    /// Override the retry policy (shorter budgets in tests and config)
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Determine the locally installed toolchain version.
    ///
    /// Go distributions ship a `VERSION` file at the root of the extracted
    /// tree; its first line holds the tagged version (`go1.22.3`). A missing
    /// installation yields the empty string, which [`needs_update`] treats
    /// as a fresh install.
    pub fn installed_version(&self, layout: &InstallLayout) -> Result<String> {
        let path = layout.install_root.join(TOOLCHAIN_DIR).join("VERSION");
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let first_line = content.lines().next().unwrap_or("").trim();
                Ok(strip_version_prefix(first_line).to_string())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(UpdateError::fs("read version file", path, e)),
        }
    }

    /// Fetch the latest stable release version, prefix stripped.
    ///
    /// One GET against the feed URL, driven through the retry poller;
    /// transport errors and non-200 responses are retried until the budget
    /// runs out. The body is decoded only once the poller reports success.
    pub fn latest_version(&self, deadline: &Deadline) -> Result<String> {
        let releases = self.fetch_releases(deadline)?;
        select_stable(&releases).ok_or(UpdateError::NoStableRelease)
    }

    fn fetch_releases(&self, deadline: &Deadline) -> Result<Vec<Release>> {
        let mut response: Option<reqwest::blocking::Response> = None;

        poll::poll_until(deadline, &self.policy, "fetch release feed", || {
            match self.client.get(&self.feed_url).send() {
                Err(e) => PollOutcome::Retry(UpdateError::network(format!(
                    "failed to fetch release feed: {}",
                    e
                ))),
                Ok(resp) if resp.status() != StatusCode::OK => {
                    PollOutcome::Retry(UpdateError::UnexpectedStatus {
                        status: resp.status().as_u16(),
                        url: self.feed_url.clone(),
                    })
                },
                Ok(resp) => {
                    response = Some(resp);
                    PollOutcome::Done
                },
            }
        })?;

        // The successful response is consumed exactly once; failed attempts
        // were dropped (and their bodies closed) inside the loop.
        let response = response
            .ok_or_else(|| UpdateError::network("release feed poll finished without a response"))?;
        response
            .json::<Vec<Release>>()
            .map_err(|e| UpdateError::network(format!("failed to parse release feed: {}", e)))
    }
}

/// Pick the first stable, correctly prefixed release from the feed.
///
/// The feed is ordered newest-first; the first match wins and later stable
/// entries are ignored.
pub(crate) fn select_stable(releases: &[Release]) -> Option<String> {
    releases
        .iter()
        .find(|r| r.stable && r.version.starts_with(VERSION_PREFIX))
        .map(|r| strip_version_prefix(&r.version).to_string())
}

/// Strip any leading non-numeric tag from a version string
pub(crate) fn strip_version_prefix(version: &str) -> &str {
    version.trim_start_matches(|c: char| !c.is_ascii_digit())
}

/// Decide whether `installed` should be replaced by `latest`.
///
/// An empty `installed` means fresh install and always updates. Otherwise
/// both sides must parse as three-component versions; a parse failure on
/// either side is a hard error, never a guessed default.
pub fn needs_update(installed: &str, latest: &str) -> Result<bool> {
    if installed.is_empty() {
        return Ok(true);
    }

    let installed: Version = installed.parse()?;
    let latest: Version = latest.parse()?;

    Ok(installed < latest)
}
