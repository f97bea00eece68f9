//! Typed access to the ledger key space

use crate::blob::{BlobStore, MemoryBlobStore};
use crate::error::{StorageError, StorageResult};
use crate::file::FileBlobStore;
use chrono::{DateTime, SecondsFormat, Utc};
use ledgersync_core::{epoch, Transaction};
use std::path::PathBuf;
use std::sync::Arc;

/// Key holding the serialized record set
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Key holding the last successful pull time
pub const LAST_SYNC_TIME_KEY: &str = "lastSyncTime";

/// The local ledger: record set plus last-sync marker
#[derive(Clone)]
pub struct LedgerStore {
    blobs: Arc<dyn BlobStore>,
}

impl LedgerStore {
    /// Wraps any blob store
    pub fn new(blobs: impl BlobStore + 'static) -> Self {
        Self {
            blobs: Arc::new(blobs),
        }
    }

    /// Ledger kept only in memory
    pub fn in_memory() -> Self {
        Self::new(MemoryBlobStore::new())
    }

    /// Ledger persisted under `dir`
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        Ok(Self::new(FileBlobStore::open(dir)?))
    }

    /// Loads every record; empty on first run
    pub fn load_all(&self) -> StorageResult<Vec<Transaction>> {
        match self.blobs.get(TRANSACTIONS_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: TRANSACTIONS_KEY.to_string(),
                source,
            }),
        }
    }

    /// Replaces the whole record set in one write
    pub fn save_all(&self, transactions: &[Transaction]) -> StorageResult<()> {
        let raw = serde_json::to_string(transactions).map_err(|source| StorageError::Serialize {
            key: TRANSACTIONS_KEY.to_string(),
            source,
        })?;
        self.blobs.put(TRANSACTIONS_KEY, &raw)?;
        log::debug!("Saved {} transactions", transactions.len());
        Ok(())
    }

    /// Time of the last successful pull, the epoch if never set
    ///
    /// An unreadable marker is treated as unset: pulling from the epoch again
    /// only re-delivers records the merge already ignores.
    pub fn last_sync_time(&self) -> StorageResult<DateTime<Utc>> {
        let Some(raw) = self.blobs.get(LAST_SYNC_TIME_KEY)? else {
            return Ok(epoch());
        };

        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
            Err(e) => {
                log::warn!("Ignoring unreadable last sync time {:?}: {}", raw, e);
                Ok(epoch())
            }
        }
    }

    /// Advances the last-sync marker
    ///
    /// The marker never moves backwards; returns false when `at` is not newer
    /// than the stored value and nothing was written.
    pub fn set_last_sync_time(&self, at: DateTime<Utc>) -> StorageResult<bool> {
        let current = self.last_sync_time()?;
        if at <= current {
            log::debug!("Keeping last sync time {} (offered {})", current, at);
            return Ok(false);
        }

        self.blobs.put(
            LAST_SYNC_TIME_KEY,
            &at.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        Ok(true)
    }
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ledgersync_core::{Decimal, TransactionId, TransactionKind};

    fn record(id: &str, synced: bool) -> Transaction {
        Transaction {
            id: TransactionId::from(id),
            amount: Decimal::new(999, 2),
            category: "Utilities".to_string(),
            kind: TransactionKind::Expense,
            occurred_at: Utc.with_ymd_and_hms(2024, 2, 10, 18, 30, 0).unwrap(),
            notes: "power".to_string(),
            synced,
        }
    }

    #[test]
    fn test_first_run_is_empty() {
        let store = LedgerStore::in_memory();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_preserve_order_and_flags() {
        let store = LedgerStore::in_memory();
        let records = vec![record("a", false), record("b", true)];

        store.save_all(&records).unwrap();
        assert_eq!(store.load_all().unwrap(), records);
    }

    #[test]
    fn test_corrupt_transactions_reported() {
        let blobs = MemoryBlobStore::new();
        blobs.put(TRANSACTIONS_KEY, "{not json").unwrap();
        let store = LedgerStore::new(blobs);

        assert!(matches!(
            store.load_all(),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_last_sync_defaults_to_epoch() {
        let store = LedgerStore::in_memory();
        assert_eq!(store.last_sync_time().unwrap(), epoch());
    }

    #[test]
    fn test_last_sync_is_monotonic() {
        let store = LedgerStore::in_memory();
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(store.set_last_sync_time(later).unwrap());
        assert!(!store.set_last_sync_time(earlier).unwrap());
        assert!(!store.set_last_sync_time(later).unwrap());
        assert_eq!(store.last_sync_time().unwrap(), later);
    }

    #[test]
    fn test_last_sync_stored_as_iso_string() {
        let blobs = MemoryBlobStore::new();
        let store = LedgerStore::new(blobs.clone());
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        store.set_last_sync_time(at).unwrap();
        assert_eq!(
            blobs.get(LAST_SYNC_TIME_KEY).unwrap().as_deref(),
            Some("2024-06-01T12:00:00.000Z")
        );
    }

    #[test]
    fn test_garbage_last_sync_reads_as_epoch() {
        let blobs = MemoryBlobStore::new();
        blobs.put(LAST_SYNC_TIME_KEY, "yesterday").unwrap();
        let store = LedgerStore::new(blobs);
        assert_eq!(store.last_sync_time().unwrap(), epoch());
    }
}
