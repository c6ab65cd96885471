//! Update pipeline orchestration
//!
//! Sequences resolve → compare → download → checksum → install under one
//! cancellation deadline. Stages are never retried here; retry lives inside
//! the resolver and downloader.

use crate::core::error::{Result, UpdateError};
use crate::core::types::InstallLayout;
use crate::update::download::Downloader;
use crate::update::installer::Installer;
use crate::update::poll::Deadline;
use crate::update::version_check::{self, Checker};
use std::path::PathBuf;

/// Result of resolving installed and latest versions
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Locally installed version, empty on a fresh machine
    pub installed: String,
    /// Newest stable version in the release feed
    pub latest: String,
    /// Whether the pipeline should replace the installation
    pub needs_update: bool,
}

/// Progress notifications emitted while applying an update
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Downloading { version: String, url: String },
    Downloaded { path: PathBuf },
    VerifyingChecksum,
    ChecksumVerified,
    Installing,
    Installed,
    Verifying,
    Verified,
}

/// Terminal state of one pipeline run
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// The installation was already current; nothing was touched
    UpToDate { installed: String },
    /// The toolchain was replaced. The downloaded archive is left on disk
    /// at `archive`; cleaning it up is the caller's responsibility.
    Updated {
        previous: String,
        installed: String,
        archive: PathBuf,
    },
}

/// The full update pipeline over one resolver, downloader, and installer
pub struct UpdatePipeline {
    checker: Checker,
    downloader: Downloader,
    installer: Installer,
    verify_after_install: bool,
}

impl UpdatePipeline {
    /// Assemble a pipeline; post-install verification is on by default
    pub fn new(checker: Checker, downloader: Downloader, installer: Installer) -> Self {
        UpdatePipeline {
            checker,
            downloader,
            installer,
            verify_after_install: true,
        }
    }

    /// Enable or disable running the installed entry point after install
    pub fn with_post_install_verify(mut self, enabled: bool) -> Self {
        self.verify_after_install = enabled;
        self
    }

    /// The directory layout the pipeline installs into
    pub fn layout(&self) -> &InstallLayout {
        self.installer.layout()
    }

    /// Resolve installed and latest versions and compare them
    pub fn check(&self, deadline: &Deadline) -> Result<CheckReport> {
        let installed = self.checker.installed_version(self.installer.layout())?;
        let latest = self.checker.latest_version(deadline)?;
        let needs_update = version_check::needs_update(&installed, &latest)?;

        tracing::info!(%installed, %latest, needs_update, "versions resolved");

        Ok(CheckReport {
            installed,
            latest,
            needs_update,
        })
    }

    /// Download, verify, and install the version named by `report`.
    ///
    /// Returns early with [`UpdateOutcome::UpToDate`] when the report says
    /// no update is needed. A checksum mismatch aborts the pipeline before
    /// any part of the installation is touched.
    pub fn apply<F>(
        &self,
        deadline: &Deadline,
        report: &CheckReport,
        mut notify: F,
    ) -> Result<UpdateOutcome>
    where
        F: FnMut(PipelineEvent),
    {
        if !report.needs_update {
            return Ok(UpdateOutcome::UpToDate {
                installed: report.installed.clone(),
            });
        }

        notify(PipelineEvent::Downloading {
            version: report.latest.clone(),
            url: self.downloader.archive_url(&report.latest),
        });
        let archive = self.downloader.download(deadline, &report.latest)?;
        notify(PipelineEvent::Downloaded {
            path: archive.local_path.clone(),
        });

        notify(PipelineEvent::VerifyingChecksum);
        let verified =
            self.downloader
                .verify_checksum(deadline, &archive.local_path, &report.latest)?;
        if !verified {
            return Err(UpdateError::ChecksumMismatch {
                version: report.latest.clone(),
            });
        }
        notify(PipelineEvent::ChecksumVerified);

        notify(PipelineEvent::Installing);
        self.installer.install(deadline, &archive.local_path)?;
        notify(PipelineEvent::Installed);

        if self.verify_after_install {
            notify(PipelineEvent::Verifying);
            self.installer.verify(deadline)?;
            notify(PipelineEvent::Verified);
        }

        tracing::info!(version = %report.latest, "toolchain installed");

        Ok(UpdateOutcome::Updated {
            previous: report.installed.clone(),
            installed: report.latest.clone(),
            archive: archive.local_path,
        })
    }

    /// Check then apply in one step, stopping early when already current
    pub fn run<F>(&self, deadline: &Deadline, notify: F) -> Result<UpdateOutcome>
    where
        F: FnMut(PipelineEvent),
    {
        let report = self.check(deadline)?;
        self.apply(deadline, &report, notify)
    }
}
