//! Reading and writing `config.toml`

use crate::error::join;
use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One config file on disk
pub struct ConfigPersistence {
    config_path: PathBuf,
}

impl ConfigPersistence {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Missing file: defaults. Empty or malformed file: error.
    ///
    /// Out-of-range values are logged and kept, so a hand edit can be fixed
    /// instead of being replaced.
    pub fn load(&self) -> ConfigResult<Config> {
        let contents = match fs::read_to_string(&self.config_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No config at {}, using defaults",
                    self.config_path.display()
                );
                return Ok(Config::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.config_path.clone(),
                    source,
                })
            }
        };

        if contents.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: self.config_path.clone(),
            });
        }

        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.config_path.clone(),
            source,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "{} declares version {}, this build understands {}",
                self.config_path.display(),
                config.version,
                CONFIG_VERSION
            );
        }
        if let Err(errors) = config.validate() {
            log::warn!("Config has invalid values: {}", join(&errors));
        }

        Ok(config)
    }

    /// Validates, then replaces the file in a single rename
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config
            .validate()
            .map_err(|errors| ConfigError::Invalid(join(&errors)))?;

        let dir = self.parent_dir()?;
        create_dir(dir)?;

        let encoded = toml::to_string_pretty(config)?;
        let write_err = |source| ConfigError::Write {
            path: self.config_path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(encoded.as_bytes()).map_err(write_err)?;
        staged.flush().map_err(write_err)?;
        staged
            .persist(&self.config_path)
            .map_err(|e| write_err(e.error))?;

        log::info!("Wrote {}", self.config_path.display());
        Ok(())
    }

    fn parent_dir(&self) -> ConfigResult<&Path> {
        self.config_path
            .parent()
            .ok_or_else(|| ConfigError::Unresolved {
                reason: format!("{} has no parent directory", self.config_path.display()),
            })
    }
}

fn create_dir(dir: &Path) -> ConfigResult<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    log::info!("Created {}", dir.display());
    Ok(())
}
