//! updatego - keep a local Go toolchain current
//!
//! updatego resolves the newest stable Go release from the published feed,
//! downloads the release archive with retry on transient failures, verifies
//! its SHA-256 checksum against the published digest, and swaps the local
//! installation behind bin-directory symlinks so the switch is atomic from
//! the caller's point of view.
//!
//! # Core Pieces
//!
//! - **Version resolution**: first stable entry of the newest-first release
//!   feed, compared against the installed tree's `VERSION` file
//! - **Resilient download**: fixed-interval retry polling under one
//!   pipeline-wide deadline, with the destination reset between attempts
//! - **Integrity**: streamed SHA-256 digest checked against the published
//!   checksum before anything touches the installation
//! - **Safe extraction**: every archive entry is containment-checked against
//!   the install root before it is written
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use updatego::update::{http, Checker, Deadline, Downloader, Installer, UpdatePipeline};
//!
//! let client = http::build_client()?;
//! let pipeline = UpdatePipeline::new(
//!     Checker::new(client.clone()),
//!     Downloader::new(client),
//!     Installer::new(Installer::default_layout()?),
//! );
//!
//! let deadline = Deadline::after(Duration::from_secs(600));
//! let outcome = pipeline.run(&deadline, |_event| {})?;
//! println!("{:?}", outcome);
//! # Ok::<(), updatego::UpdateError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod update;

// Re-export commonly used types
pub use crate::core::{
    error::{Result, UpdateError},
    types::{ChecksumDigest, DownloadedArchive, InstallLayout, Release, Version},
};

pub use crate::update::{
    needs_update, CheckReport, Checker, Deadline, Downloader, Installer, PipelineEvent,
    PollOutcome, PollPolicy, UpdateOutcome, UpdatePipeline,
};

/// Current version of updatego
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
