//! Edge case and error scenario tests

use ledgersync_config::{Config, ConfigError, ConfigManager, CONFIG_VERSION};
use std::fs;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_corrupted_config_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "this is not valid TOML {{{")?;

    assert!(matches!(manager.load(), Err(ConfigError::Parse { .. })));
    assert_eq!(manager.load_or_default(), Config::default());
    Ok(())
}

#[test]
fn test_wrong_type_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "[sync]\nmax_attempts = \"five\"\n")?;

    assert!(matches!(manager.load(), Err(ConfigError::Parse { .. })));
    Ok(())
}

#[test]
fn test_unknown_log_level_is_a_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "[app]\nlog_level = \"verbose\"\n")?;

    assert!(manager.load().is_err());
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let nested_path = temp_dir.path().join("a").join("b").join("c");
    let manager = ConfigManager::with_directory(nested_path)?;

    manager.save(&Config::default())?;
    assert!(manager.config_path().exists());

    Ok(())
}

#[test]
fn test_concurrent_config_loads() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    ConfigManager::with_directory(config_dir.clone())?.initialize()?;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let dir = config_dir.clone();
            std::thread::spawn(move || {
                let mgr = ConfigManager::with_directory(dir).expect("manager");
                for _ in 0..10 {
                    assert!(mgr.load().is_ok());
                    std::thread::sleep(std::time::Duration::from_millis(1));
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok());
    }

    Ok(())
}

#[test]
fn test_boundary_values_validation() {
    let mut config = Config::default();

    config.sync.max_attempts = 1;
    config.sync.backoff_multiplier = 1.0;
    config.remote.timeout_secs = 300;
    assert!(config.validate().is_ok());

    config.sync.max_attempts = 20;
    config.sync.backoff_multiplier = 10.0;
    assert!(config.validate().is_ok());

    config.sync.max_attempts = 21;
    assert!(config.validate().is_err());

    config.sync.max_attempts = 20;
    config.remote.timeout_secs = 301;
    assert!(config.validate().is_err());
}

#[test]
fn test_equal_initial_and_max_backoff_allowed() {
    let mut config = Config::default();
    config.sync.initial_backoff_ms = 2000;
    config.sync.max_backoff_ms = 2000;
    assert!(config.validate().is_ok());
}

#[test]
fn test_newer_version_still_loads() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    let version = CONFIG_VERSION + 1;
    fs::write(
        manager.config_path(),
        format!("version = {}\n\n[future]\nflag = true\n", version),
    )?;

    let config = manager.load()?;
    assert_eq!(config.version, version);
    assert_eq!(config.remote, Config::default().remote);
    Ok(())
}

#[test]
fn test_whitespace_only_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    fs::write(manager.config_path(), "\n\t  \n")?;

    assert!(matches!(manager.load(), Err(ConfigError::Empty { .. })));
    Ok(())
}

#[test]
fn test_update_refuses_to_break_config() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.initialize()?;

    let result = manager.update(|config| config.remote.base_url = "ftp://nope".to_string());
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
    assert_eq!(manager.load()?, Config::default());
    Ok(())
}

#[test]
fn test_validation_error_message_names_fields() {
    let mut config = Config::default();
    config.connectivity.probe_urls = vec!["status page".to_string()];

    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "Field 'connectivity.probe_urls[0]': must be an http:// or https:// URL (got: status page)"
    );
}
