//! Configuration loading and management.
//!
//! This is the application layer only: where the database lives and how the
//! holiday API is reached. Accounting rules are [`wlog_core::Settings`],
//! stored in the database and edited with `wlog settings set`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Base URL of the public holiday API.
    pub holiday_api_url: String,
    /// Request timeout for holiday refreshes, in seconds.
    pub holiday_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("holiday_api_url", &self.holiday_api_url)
            .field("holiday_timeout_secs", &self.holiday_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("wlog.db"),
            holiday_api_url: wlog_holidays::DEFAULT_BASE_URL.to_string(),
            holiday_timeout_secs: wlog_holidays::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WLOG_*)
        figment = figment.merge(Env::prefixed("WLOG_"));

        figment.extract()
    }

    pub const fn holiday_timeout(&self) -> Duration {
        Duration::from_secs(self.holiday_timeout_secs)
    }
}

/// Returns the platform-specific config directory for wlog.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wlog"))
}

/// Returns the platform-specific data directory for wlog.
///
/// On Linux: `~/.local/share/wlog`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wlog"))
}
