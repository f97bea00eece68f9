//! Error types for sync operations

use ledgersync_core::CoreError;
use ledgersync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the sync engine's API
///
/// Network failures inside a sync cycle are not errors here: they are
/// reported through [`crate::SyncOutcome`] and [`crate::SyncEvent`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The add request failed validation
    #[error(transparent)]
    InvalidTransaction(#[from] CoreError),

    /// Reading or writing the local ledger failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A thread panicked while holding the in-memory ledger
    #[error("Ledger lock poisoned")]
    LockPoisoned,
}
