//! HTTP client construction
//!
//! One client with bounded timeouts and a shared connection pool is built at
//! startup and handed to every network-facing component. Nothing reaches for
//! an ambient global client.

use crate::core::error::{Result, UpdateError};
use std::time::Duration;

/// Time allowed to establish a TCP connection (TLS included)
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Time allowed between reads of the response; bounds stalls without
/// capping the total duration of a large archive download
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// How long idle connections stay in the pool
pub const IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum idle connections kept per host
const MAX_IDLE_PER_HOST: usize = 10;

/// Build the blocking HTTP client shared by resolver and downloader.
///
/// The client is immutable after construction and cheap to clone (it wraps
/// an internal connection pool), so callers pass clones freely.
pub fn build_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("updatego/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        // The blocking client defaults to a 30s whole-request timeout,
        // which would cap archive downloads; per-read stall protection
        // above is the bound that matters.
        .timeout(None)
        .pool_idle_timeout(IDLE_CONNECTION_TIMEOUT)
        .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
        .build()
        .map_err(|e| UpdateError::network(format!("failed to create HTTP client: {}", e)))
}
