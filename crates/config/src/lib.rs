//! LedgerSync configuration
//!
//! Settings live in a single TOML file. Every section implements
//! [`ConfigSection`], so `Config::validate` can report all problems at once
//! and override chains can be built with `merge`.
//!
//! # Example
//!
//! ```rust
//! use ledgersync_config::{Config, ConfigManager};
//!
//! let dir = tempfile::tempdir().expect("temp dir");
//! let manager = ConfigManager::with_directory(dir.path().to_path_buf()).expect("manager");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Pushing to {}", config.remote.base_url);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod connectivity_config;
mod remote_config;
mod sync_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use connectivity_config::ConnectivityConfig;
pub use remote_config::RemoteConfig;
pub use sync_config::SyncSettings;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Push retry and trigger behavior
    pub sync: SyncSettings,

    /// Remote transaction service
    pub remote: RemoteConfig,

    /// Reachability probing
    pub connectivity: ConnectivityConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.sync.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.remote.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.connectivity.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    ///
    /// Override chain: defaults < file < env vars < CLI args
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.sync.merge(other.sync);
        self.remote.merge(other.remote);
        self.connectivity.merge(other.connectivity);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            sync: SyncSettings::default(),
            remote: RemoteConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }
}
