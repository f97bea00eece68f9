//! Local ledger persistence
//!
//! The ledger is stored in an abstract key-value blob store with two keys:
//! - `transactions`: JSON array of every record, local metadata included
//! - `lastSyncTime`: RFC 3339 timestamp of the last successful pull
//!
//! Every write replaces a whole value atomically, so readers never observe a
//! partially written ledger.
//!
//! # Example
//!
//! ```rust
//! use ledgersync_storage::LedgerStore;
//!
//! let store = LedgerStore::in_memory();
//! assert!(store.load_all().unwrap().is_empty());
//! assert_eq!(store.last_sync_time().unwrap(), ledgersync_core::epoch());
//! ```

mod blob;
mod error;
mod file;
mod ledger;

pub use blob::{BlobStore, MemoryBlobStore};
pub use error::{StorageError, StorageResult};
pub use file::FileBlobStore;
pub use ledger::{LedgerStore, LAST_SYNC_TIME_KEY, TRANSACTIONS_KEY};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _: LedgerStore = LedgerStore::in_memory();
        let _: MemoryBlobStore = MemoryBlobStore::new();
        assert_eq!(TRANSACTIONS_KEY, "transactions");
        assert_eq!(LAST_SYNC_TIME_KEY, "lastSyncTime");
    }
}
