//! Go toolchain update pipeline
//!
//! Resolves the newest stable release, downloads and verifies the archive,
//! and swaps the local installation behind bin-directory symlinks.

pub mod download;
pub mod http;
pub mod installer;
pub mod pipeline;
pub mod poll;
pub mod version_check;

pub use download::Downloader;
pub use installer::Installer;
pub use pipeline::{CheckReport, PipelineEvent, UpdateOutcome, UpdatePipeline};
pub use poll::{Deadline, PollOutcome, PollPolicy};
pub use version_check::{needs_update, Checker};
