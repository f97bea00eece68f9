//! Wires configuration, storage, network and the sync engine together

use anyhow::{Context, Result};
use ledgersync_config::{Config, ConfigManager, RemoteConfig, SyncSettings};
use ledgersync_network::{
    Client, ClientConfig, ConnectivityMonitor, HttpRemote, ManualConnectivity, ProbeConnectivity,
};
use ledgersync_resilience::RetryPolicy;
use ledgersync_storage::LedgerStore;
use ledgersync_sync_engine::{SyncConfig, SyncEngine};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Loaded configuration plus the global flags
pub struct App {
    manager: ConfigManager,
    config: Config,
    offline: bool,
}

/// The connectivity source chosen for this run
pub enum Monitor {
    /// `--offline`: never connected
    Manual(Arc<ManualConnectivity>),
    /// HEAD probes against the configured URLs
    Probe(Arc<ProbeConnectivity>),
}

impl Monitor {
    pub fn as_dyn(&self) -> Arc<dyn ConnectivityMonitor> {
        match self {
            Monitor::Manual(m) => Arc::clone(m) as Arc<dyn ConnectivityMonitor>,
            Monitor::Probe(p) => Arc::clone(p) as Arc<dyn ConnectivityMonitor>,
        }
    }

    /// Starts background polling; nothing to poll when offline
    pub fn spawn_polling(&self) -> Option<JoinHandle<()>> {
        match self {
            Monitor::Manual(_) => None,
            Monitor::Probe(p) => Some(p.spawn()),
        }
    }
}

impl App {
    /// Loads the config from `config_dir` or the platform default
    pub fn load(config_dir: Option<PathBuf>, offline: bool) -> Result<Self> {
        let manager = match config_dir {
            Some(dir) => ConfigManager::with_directory(dir),
            None => ConfigManager::new(),
        }
        .context("Failed to resolve config directory")?;

        let config = manager
            .load_with_env_overrides()
            .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;

        Ok(Self {
            manager,
            config,
            offline,
        })
    }

    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn data_dir(&self) -> PathBuf {
        self.manager.data_dir(&self.config)
    }

    pub fn client(&self) -> Result<Client> {
        Client::with_config(client_config(&self.config.remote)).context("Failed to build HTTP client")
    }

    pub fn monitor(&self) -> Result<Monitor> {
        if self.offline {
            return Ok(Monitor::Manual(Arc::new(ManualConnectivity::new(false))));
        }

        let probe = ProbeConnectivity::new(
            self.client()?,
            probe_urls(&self.config),
            self.config.connectivity.poll_interval(),
        );
        Ok(Monitor::Probe(Arc::new(probe)))
    }

    /// Opens the ledger and builds an engine over it
    ///
    /// The CLI runs syncs explicitly, so the engine never spawns one on add.
    pub fn open_engine(&self) -> Result<(SyncEngine, Monitor)> {
        let data_dir = self.data_dir();
        let store = LedgerStore::open(&data_dir)
            .with_context(|| format!("Failed to open ledger in {}", data_dir.display()))?;
        let remote = HttpRemote::new(self.client()?, &self.config.remote.base_url)
            .context("Invalid remote base URL")?;
        let monitor = self.monitor()?;

        let mut sync_config = sync_config(&self.config.sync);
        sync_config.sync_on_add = false;

        let engine = SyncEngine::open(sync_config, store, Arc::new(remote), monitor.as_dyn())
            .context("Failed to load ledger")?;
        Ok((engine, monitor))
    }
}

/// Engine settings from the `[sync]` section
pub fn sync_config(settings: &SyncSettings) -> SyncConfig {
    SyncConfig {
        retry: RetryPolicy::new(settings.max_attempts)
            .with_initial_delay(settings.initial_backoff())
            .with_multiplier(settings.backoff_multiplier)
            .with_max_delay(settings.max_backoff())
            .with_jitter(false),
        sync_on_add: settings.sync_on_add,
        seed_sample_data: settings.seed_sample_data,
        sample_count: settings.sample_count,
        ..SyncConfig::default()
    }
}

pub fn client_config(remote: &RemoteConfig) -> ClientConfig {
    ClientConfig {
        timeout: remote.timeout(),
        user_agent: remote.user_agent.clone(),
        ..ClientConfig::default()
    }
}

/// Configured probe URLs, or the remote itself when none are set
pub fn probe_urls(config: &Config) -> Vec<String> {
    if config.connectivity.probe_urls.is_empty() {
        vec![config.remote.base_url.clone()]
    } else {
        config.connectivity.probe_urls.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_settings_match_engine_defaults() {
        let from_settings = sync_config(&SyncSettings::default());
        let defaults = SyncConfig::default();

        assert_eq!(from_settings.retry.schedule(), defaults.retry.schedule());
        assert_eq!(from_settings.sync_on_add, defaults.sync_on_add);
        assert_eq!(from_settings.sample_count, defaults.sample_count);
    }

    #[test]
    fn test_custom_backoff() {
        let settings = SyncSettings {
            max_attempts: 3,
            initial_backoff_ms: 250,
            backoff_multiplier: 3.0,
            max_backoff_ms: 1000,
            ..SyncSettings::default()
        };

        assert_eq!(
            sync_config(&settings).retry.schedule(),
            vec![
                Duration::from_millis(250),
                Duration::from_millis(750),
                Duration::from_millis(1000),
            ]
        );
    }

    #[test]
    fn test_probe_urls_fall_back_to_remote() {
        let mut config = Config::default();
        assert_eq!(probe_urls(&config), vec![config.remote.base_url.clone()]);

        config.connectivity.probe_urls = vec!["https://status.example.com".to_string()];
        assert_eq!(probe_urls(&config), vec!["https://status.example.com".to_string()]);
    }

    #[test]
    fn test_client_config_from_remote() {
        let remote = RemoteConfig {
            timeout_secs: 7,
            user_agent: "ledger-test".to_string(),
            ..RemoteConfig::default()
        };
        let config = client_config(&remote);
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.user_agent, "ledger-test");
    }

    #[tokio::test]
    async fn test_offline_engine_over_temp_dir() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        let app = App::load(Some(temp.path().to_path_buf()), true)?;

        let (engine, monitor) = app.open_engine()?;
        assert!(matches!(monitor, Monitor::Manual(_)));
        assert!(!engine.config().sync_on_add);
        assert_eq!(engine.snapshot().transactions.len(), 100);
        assert!(temp.path().join("data").join("transactions.json").exists());
        Ok(())
    }
}
