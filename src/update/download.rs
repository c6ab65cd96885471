//! Release archive download and integrity verification
//!
//! Fetches the versioned archive into a fresh temporary file, retrying
//! transient failures, then checks the streamed SHA-256 digest against the
//! published checksum.

use crate::core::error::{Result, UpdateError};
use crate::core::types::{ChecksumDigest, DownloadedArchive};
use crate::update::poll::{self, Deadline, PollOutcome, PollPolicy};
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Default base URL release archives are served from
pub const GO_DOWNLOAD_BASE_URL: &str = "https://dl.google.com/go";

/// OS/architecture string baked into archive filenames
pub const DEFAULT_PLATFORM: &str = "linux-amd64";

/// Downloads and verifies Go release archives
pub struct Downloader {
    base_url: String,
    platform: String,
    policy: PollPolicy,
    client: reqwest::blocking::Client,
}

impl Downloader {
    /// Create a downloader against the default archive source
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self::with_base_url(client, GO_DOWNLOAD_BASE_URL, DEFAULT_PLATFORM)
    }

    /// Create a downloader against a custom archive source
    pub fn with_base_url(
        client: reqwest::blocking::Client,
        base_url: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Downloader {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            platform: platform.into(),
            policy: PollPolicy::default(),
            client,
        }
    }

    /// Override the retry policy (shorter budgets in tests and config)
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Canonical archive filename for a version
    pub fn archive_filename(&self, version: &str) -> String {
        format!("go{}.{}.tar.gz", version, self.platform)
    }

    /// Canonical archive URL for a version
    pub fn archive_url(&self, version: &str) -> String {
        format!("{}/{}", self.base_url, self.archive_filename(version))
    }

    /// URL of the published checksum for a version
    pub fn checksum_url(&self, version: &str) -> String {
        format!("{}.sha256", self.archive_url(version))
    }

    /// Download the release archive for `version` into a fresh temporary
    /// directory and return its location.
    ///
    /// Every retry attempt resets the destination file to empty before
    /// copying, so a partial earlier attempt can never corrupt or be
    /// concatenated with a later one. The temporary directory is kept on
    /// disk; removing it after installation is the caller's responsibility.
    pub fn download(&self, deadline: &Deadline, version: &str) -> Result<DownloadedArchive> {
        let dir = tempfile::Builder::new()
            .prefix("updatego-")
            .tempdir()
            .map_err(|e| UpdateError::fs("create download directory", std::env::temp_dir(), e))?;
        let dir = dir.keep();

        let url = self.archive_url(version);
        let output_path = dir.join(self.archive_filename(version));
        let mut output = File::create(&output_path)
            .map_err(|e| UpdateError::fs("create download file", &output_path, e))?;

        tracing::info!(%url, dest = %output_path.display(), "downloading release archive");

        poll::poll_until(deadline, &self.policy, "download archive", || {
            // Reset the destination so this attempt starts from a clean file.
            if let Err(e) = output.seek(SeekFrom::Start(0)) {
                return PollOutcome::Fatal(UpdateError::fs(
                    "rewind download file",
                    &output_path,
                    e,
                ));
            }
            if let Err(e) = output.set_len(0) {
                return PollOutcome::Fatal(UpdateError::fs(
                    "truncate download file",
                    &output_path,
                    e,
                ));
            }

            let mut response = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    return PollOutcome::Retry(UpdateError::network(format!(
                        "failed to request archive: {}",
                        e
                    )))
                },
            };

            if response.status() != StatusCode::OK {
                return PollOutcome::Retry(UpdateError::UnexpectedStatus {
                    status: response.status().as_u16(),
                    url: url.clone(),
                });
            }

            match io::copy(&mut response, &mut output) {
                Ok(_) => PollOutcome::Done,
                Err(e) => PollOutcome::Retry(UpdateError::network(format!(
                    "failed to copy response body: {}",
                    e
                ))),
            }
        })?;

        Ok(DownloadedArchive {
            local_path: output_path,
            source_url: url,
        })
    }

    /// Check the archive at `archive_path` against the published checksum
    /// for `version`.
    ///
    /// A digest mismatch is reported as `Ok(false)`, not an error; the
    /// caller decides to refuse installation. Errors mean the comparison
    /// itself could not be carried out.
    pub fn verify_checksum(
        &self,
        deadline: &Deadline,
        archive_path: &Path,
        version: &str,
    ) -> Result<bool> {
        let expected = self.fetch_checksum(deadline, version)?;
        let actual = digest_file(archive_path)?;

        if expected != actual {
            tracing::warn!(
                expected = %expected,
                actual = %actual,
                "archive digest does not match published checksum"
            );
        }

        Ok(expected == actual)
    }

    /// Fetch the published digest for a version, with the same retry policy
    /// as the archive download.
    fn fetch_checksum(&self, deadline: &Deadline, version: &str) -> Result<ChecksumDigest> {
        let url = self.checksum_url(version);
        let mut body: Option<String> = None;

        poll::poll_until(deadline, &self.policy, "fetch checksum", || {
            let response = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    return PollOutcome::Retry(UpdateError::network(format!(
                        "failed to request checksum: {}",
                        e
                    )))
                },
            };

            if response.status() != StatusCode::OK {
                return PollOutcome::Retry(UpdateError::UnexpectedStatus {
                    status: response.status().as_u16(),
                    url: url.clone(),
                });
            }

            match response.text() {
                Ok(text) => {
                    body = Some(text);
                    PollOutcome::Done
                },
                Err(e) => PollOutcome::Retry(UpdateError::network(format!(
                    "failed to read checksum response: {}",
                    e
                ))),
            }
        })?;

        let body =
            body.ok_or_else(|| UpdateError::network("checksum poll finished without a response"))?;
        Ok(parse_checksum_body(&body))
    }
}

/// Extract the digest token from a checksum response body.
///
/// The common layout is `<hash>  <filename>`; the first whitespace-delimited
/// token wins. A body without whitespace is taken whole, trimmed.
pub(crate) fn parse_checksum_body(body: &str) -> ChecksumDigest {
    match body.split_whitespace().next() {
        Some(token) => ChecksumDigest::from_token(token),
        None => ChecksumDigest::from_token(body.trim()),
    }
}

/// Compute the SHA-256 digest of a file by streaming it through the hasher.
///
/// The file is never buffered whole; archives can be large.
pub fn digest_file(path: &Path) -> Result<ChecksumDigest> {
    let file = File::open(path).map_err(|e| UpdateError::fs("open file for checksum", path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|e| UpdateError::fs("read file for checksum", path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(ChecksumDigest::from_computed(hex::encode(hasher.finalize())))
}
