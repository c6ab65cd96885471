//! Error types for updatego

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for update pipeline operations
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Version parsing errors
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Network-level errors (connect, TLS, read)
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("unexpected status code {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The release feed contained no usable entry
    #[error("no stable Go release found in feed")]
    NoStableRelease,

    /// Retry budget exhausted without a successful attempt
    #[error("{operation} did not succeed within {budget:?}")]
    RetriesExhausted {
        operation: String,
        budget: Duration,
        #[source]
        last_error: Option<Box<UpdateError>>,
    },

    /// The shared cancellation deadline fired
    #[error("{operation} cancelled: deadline elapsed")]
    DeadlineElapsed { operation: String },

    /// Downloaded archive digest did not match the published one
    #[error("checksum mismatch for version {version}, refusing to install")]
    ChecksumMismatch { version: String },

    /// Archive entry resolved outside the install root
    #[error("invalid archive entry (path traversal attempt): {entry}")]
    PathTraversal { entry: String },

    #[error("failed to create symlink {link} -> {target}")]
    Symlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Expected entry-point binary is not present after install
    #[error("entry point not found at {path}")]
    EntryPointMissing { path: PathBuf },

    #[error("{command} timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("{command} failed with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    /// Filesystem errors with the operation and path attached
    #[error("failed to {action} {path}")]
    FileSystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("configuration error: {reason}")]
    ConfigurationError { reason: String },

    #[error("home directory not found")]
    HomeDirectoryNotFound,

    /// I/O errors without richer context
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpdateError {
    /// Create a new invalid version error
    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Create a new filesystem error with operation context
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for update pipeline operations
pub type Result<T> = std::result::Result<T, UpdateError>;
