//! Tool configuration
//!
//! Optional TOML configuration stored at `~/.updatego/config.toml`. Missing
//! file and missing keys fall back to built-in defaults; command-line flags
//! override both.

use crate::core::error::{Result, UpdateError};
use crate::core::types::InstallLayout;
use crate::update::download::{DEFAULT_PLATFORM, GO_DOWNLOAD_BASE_URL};
use crate::update::installer::Installer;
use crate::update::poll::{PollPolicy, DEFAULT_BUDGET, DEFAULT_INTERVAL};
use crate::update::version_check::GO_FEED_URL;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for updatego
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Remote endpoints
    #[serde(default)]
    pub network: NetworkConfig,
    /// Local directory layout
    #[serde(default)]
    pub install: InstallConfig,
    /// Retry timing
    #[serde(default)]
    pub poll: PollConfig,
}

/// Remote endpoint overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Release feed URL
    pub feed_url: Option<String>,
    /// Base URL archives are served from
    pub archive_base_url: Option<String>,
    /// OS/architecture string in archive filenames
    pub platform: Option<String>,
}

/// Directory layout overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Directory the toolchain tree is extracted into
    pub install_dir: Option<PathBuf>,
    /// Directory the entry-point symlinks are created in
    pub bin_dir: Option<PathBuf>,
}

/// Retry timing overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between retry attempts
    pub interval_secs: Option<u64>,
    /// Overall retry budget per network operation, in seconds
    pub budget_secs: Option<u64>,
}

impl UpdateConfig {
    /// Load configuration from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| UpdateError::fs("read config file", path, e))?;
        toml::from_str(&content).map_err(|e| {
            UpdateError::configuration(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Write configuration to an explicit path, creating parents
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| UpdateError::fs("create config directory", parent, e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| UpdateError::configuration(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| UpdateError::fs("write config file", path, e))
    }

    /// Path of the default configuration file
    pub fn config_path() -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or(UpdateError::HomeDirectoryNotFound)?;
        Ok(user_dirs.home_dir().join(".updatego").join("config.toml"))
    }

    /// Release feed URL with default applied
    pub fn feed_url(&self) -> String {
        self.network
            .feed_url
            .clone()
            .unwrap_or_else(|| GO_FEED_URL.to_string())
    }

    /// Archive base URL with default applied
    pub fn archive_base_url(&self) -> String {
        self.network
            .archive_base_url
            .clone()
            .unwrap_or_else(|| GO_DOWNLOAD_BASE_URL.to_string())
    }

    /// Platform string with default applied
    pub fn platform(&self) -> String {
        self.network
            .platform
            .clone()
            .unwrap_or_else(|| DEFAULT_PLATFORM.to_string())
    }

    /// Retry policy with defaults applied
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: self
                .poll
                .interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_INTERVAL),
            budget: self
                .poll
                .budget_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_BUDGET),
            immediate: true,
        }
    }

    /// Resolve the install layout, filling gaps from the user default
    pub fn layout(&self) -> Result<InstallLayout> {
        match (&self.install.install_dir, &self.install.bin_dir) {
            (Some(install_dir), Some(bin_dir)) => {
                InstallLayout::new(install_dir.clone(), bin_dir.clone())
            },
            _ => {
                let defaults = Installer::default_layout()?;
                InstallLayout::new(
                    self.install
                        .install_dir
                        .clone()
                        .unwrap_or(defaults.install_root),
                    self.install.bin_dir.clone().unwrap_or(defaults.bin_dir),
                )
            },
        }
    }
}
