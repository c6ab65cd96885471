//! Core data types for the update pipeline

use crate::core::error::{Result, UpdateError};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// One entry of the remote release feed.
///
/// The feed is a JSON array ordered newest-first; that ordering is trusted
/// as-is and never re-sorted.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release identifier as published, e.g. "go1.22.3"
    pub version: String,
    /// Whether the release is flagged production-quality
    pub stable: bool,
}

/// A three-component semantic version (major.minor.patch).
///
/// Parsing accepts exactly three dot-separated non-negative integers and
/// nothing else; pre-release tags, build metadata, and two- or four-part
/// versions are hard errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(UpdateError::invalid_version(
                s,
                "versions must be in the format X.Y.Z",
            ));
        }

        let component = |name: &str, raw: &str| -> Result<u64> {
            raw.parse::<u64>().map_err(|_| {
                UpdateError::invalid_version(s, format!("{} component '{}' is not a number", name, raw))
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A lowercase hex SHA-256 digest.
///
/// Equality is exact, case-sensitive string equality: a remote token in the
/// wrong case is a mismatch, never silently normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumDigest(String);

impl ChecksumDigest {
    /// Wrap a digest token as fetched from the checksum source, verbatim
    pub fn from_token(token: &str) -> Self {
        ChecksumDigest(token.to_string())
    }

    /// Wrap a digest computed locally (already lowercase hex)
    pub fn from_computed(hex: String) -> Self {
        ChecksumDigest(hex)
    }

    /// The digest as a hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChecksumDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully written release archive on local disk.
///
/// Owned by the downloader until handed to the installer; the installer
/// never re-derives the source URL.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    /// Path to the archive file inside the download directory
    pub local_path: PathBuf,
    /// URL the archive was fetched from
    pub source_url: String,
}

/// Directory layout one installer instance operates on.
///
/// Both directories must be writable by the running process; they are
/// created on demand. The install root receives the extracted toolchain
/// tree, the bin directory the entry-point symlinks.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    pub install_root: PathBuf,
    pub bin_dir: PathBuf,
}

impl InstallLayout {
    /// Create a layout, rejecting identical install and bin directories
    pub fn new(install_root: PathBuf, bin_dir: PathBuf) -> Result<Self> {
        if install_root == bin_dir {
            return Err(UpdateError::configuration(
                "install directory and bin directory must be distinct",
            ));
        }
        Ok(InstallLayout {
            install_root,
            bin_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v: Version = "1.22.3".parse().unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 22);
        assert_eq!(v.patch, 3);
        assert_eq!(v.to_string(), "1.22.3");
    }

    #[test]
    fn test_version_parsing_rejects_bad_input() {
        assert!("1.a.1".parse::<Version>().is_err());
        assert!("1.2".parse::<Version>().is_err());
        assert!("1.2.3.4".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
        assert!("1.2.-3".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        let parse = |s: &str| s.parse::<Version>().unwrap();
        assert!(parse("1.2.0") < parse("1.3.0"));
        assert!(parse("2.0.0") > parse("1.9.9"));
        assert!(parse("1.2.3") == parse("1.2.3"));
        assert!(parse("1.2.3") < parse("1.2.10"));
    }

    #[test]
    fn test_digest_equality_is_case_sensitive() {
        let lower = ChecksumDigest::from_token("abc123");
        let upper = ChecksumDigest::from_token("ABC123");
        assert_ne!(lower, upper);
        assert_eq!(lower, ChecksumDigest::from_token("abc123"));
    }

    #[test]
    fn test_layout_rejects_identical_directories() {
        let result = InstallLayout::new(PathBuf::from("/tmp/x"), PathBuf::from("/tmp/x"));
        assert!(result.is_err());
    }
}
