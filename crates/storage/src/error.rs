//! Error types for ledger persistence

use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading or writing the ledger
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to read a stored value
    #[error("Failed to read '{key}' from {path}: {source}")]
    Read {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a stored value
    #[error("Failed to write '{key}' to {path}: {source}")]
    Write {
        key: String,
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to create the storage directory
    #[error("Failed to create storage directory at {path}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored value could not be decoded
    #[error("Stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    /// A value could not be encoded
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// Key cannot be used as a storage name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// In-memory store lock was poisoned
    #[error("Storage lock poisoned")]
    LockPoisoned,
}
