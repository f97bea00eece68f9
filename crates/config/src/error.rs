//! Config errors

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but holds nothing; never silently treated as defaults
    #[error("{path} is empty")]
    Empty { path: PathBuf },

    #[error("{path} is not valid config TOML: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Cannot encode config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Refused to save; one message per offending field, joined by `; `
    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No config location: {reason}")]
    Unresolved { reason: String },
}

/// One bad field, addressed as `section.field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// Offending value as written, when it helps the user find it
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "Field '{}': {} (got: {})", self.field, self.message, value),
            None => write!(f, "Field '{}': {}", self.field, self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Renders a batch of field errors as a single line
pub(crate) fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
