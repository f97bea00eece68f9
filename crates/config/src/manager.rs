//! Locating, loading and saving the config file

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides
const ENV_PREFIX: &str = "LEDGERSYNC_";

/// Owns the config file location and the default ledger directory
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
    default_data_dir: PathBuf,
}

impl ConfigManager {
    /// Uses the per-user platform directories:
    ///
    /// - Linux: `~/.config/ledgersync/` and `~/.local/share/ledgersync/`
    /// - macOS: `~/Library/Application Support/ledgersync/`
    /// - Windows: `%APPDATA%\ledgersync\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = Self::project_dirs()?;
        Ok(Self::build(
            dirs.config_dir().to_path_buf(),
            dirs.data_dir().to_path_buf(),
        ))
    }

    /// Keeps everything under `config_dir`; the ledger goes in `config_dir/data`
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let data_dir = config_dir.join("data");
        Ok(Self::build(config_dir, data_dir))
    }

    fn build(config_dir: PathBuf, default_data_dir: PathBuf) -> Self {
        let persistence = ConfigPersistence::new(config_dir.join("config.toml"));
        Self {
            persistence,
            config_dir,
            default_data_dir,
        }
    }

    fn project_dirs() -> ConfigResult<ProjectDirs> {
        ProjectDirs::from("", "", "ledgersync").ok_or_else(|| ConfigError::Unresolved {
            reason: "no home directory for this user".to_string(),
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// `<config_dir>/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory holding the ledger for `config`
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        config
            .app
            .data_dir
            .clone()
            .unwrap_or_else(|| self.default_data_dir.clone())
    }

    /// Defaults when no file exists; an error when the file is unreadable
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Like [`load`](Self::load), but logs the error and returns defaults
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config ({}), running with defaults", e);
                Config::default()
            }
        }
    }

    /// Refuses configs that fail validation
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Read-modify-write of the config file
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use ledgersync_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.sync.sync_on_add = false;
    /// }).expect("update");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes defaults unless a file is already there; `true` when it wrote one
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Keeping existing config at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        log::info!("Wrote default config to {}", self.config_path().display());
        Ok(true)
    }

    /// Replaces whatever is on disk with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Problems in the file as it stands, one line each; empty when clean
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the config and applies `LEDGERSYNC_SECTION_FIELD` overrides
    ///
    /// Example: `LEDGERSYNC_REMOTE_BASE_URL=https://ledger.example.com/api`
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_overrides(&mut config, |name| std::env::var(name).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Overrides left the config invalid: {}",
                crate::error::join(&errors)
            );
        }

        Ok(config)
    }
}

/// Applies overrides read through `lookup`; unparseable values are ignored
pub(crate) fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));

    if let Some(level) = var("APP_LOG_LEVEL") {
        match LogLevel::parse(&level) {
            Some(l) => config.app.log_level = l,
            None => log::warn!("Ignoring unknown log level override: {}", level),
        }
    }
    if let Some(dir) = var("APP_DATA_DIR") {
        config.app.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(url) = var("REMOTE_BASE_URL") {
        config.remote.base_url = url;
    }
    if let Some(secs) = var("REMOTE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.remote.timeout_secs = secs;
    }
    if let Some(attempts) = var("SYNC_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
        config.sync.max_attempts = attempts;
    }
    if let Some(on_add) = var("SYNC_ON_ADD").and_then(|v| v.parse().ok()) {
        config.sync.sync_on_add = on_add;
    }
    if let Some(seed) = var("SYNC_SEED_SAMPLE_DATA").and_then(|v| v.parse().ok()) {
        config.sync.seed_sample_data = seed;
    }
    if let Some(secs) = var("CONNECTIVITY_POLL_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
        config.connectivity.poll_interval_secs = secs;
    }
}
