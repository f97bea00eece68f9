//! Offline-first synchronization engine for the transaction ledger
//!
//! The engine keeps a local ledger authoritative for reads and writes and
//! reconciles it with a remote store whenever connectivity allows:
//! - New records are persisted locally first and flagged unsynced
//! - A sync cycle pushes unsynced records (with exponential backoff), then
//!   pulls records created remotely since the last successful pull
//! - Pulled records are merged by id; local copies always win
//! - At most one cycle runs at a time; overlapping requests are dropped
//!
//! # Example
//!
//! ```rust
//! use ledgersync_core::{Decimal, NewTransaction, TransactionKind};
//! use ledgersync_network::ManualConnectivity;
//! # use ledgersync_network::{NetworkResult, RemoteService};
//! use ledgersync_storage::LedgerStore;
//! use ledgersync_sync_engine::{SyncConfig, SyncEngine, SyncOutcome};
//! use std::sync::Arc;
//! # struct Server;
//! # #[async_trait::async_trait]
//! # impl RemoteService for Server {
//! #     async fn push(&self, _: &[ledgersync_core::Transaction]) -> NetworkResult<()> { Ok(()) }
//! #     async fn pull(&self, _: chrono::DateTime<chrono::Utc>) -> NetworkResult<Vec<ledgersync_core::Transaction>> { Ok(vec![]) }
//! # }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig {
//!     sync_on_add: false,
//!     seed_sample_data: false,
//!     ..SyncConfig::default()
//! };
//! let engine = SyncEngine::open(
//!     config,
//!     LedgerStore::in_memory(),
//!     Arc::new(Server),
//!     Arc::new(ManualConnectivity::new(true)),
//! )?;
//!
//! engine.add_transaction(NewTransaction::new(
//!     Decimal::new(4599, 2),
//!     "Food",
//!     TransactionKind::Expense,
//! ))?;
//!
//! let outcome = engine.trigger_sync().await;
//! assert!(matches!(outcome, SyncOutcome::Completed(ref r) if r.pushed == 1));
//! assert_eq!(engine.snapshot().unsynced_count(), 0);
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod merge;
mod types;

pub use engine::{ConnectivityListener, SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use merge::merge;
pub use types::{LedgerSnapshot, SyncEvent, SyncOutcome, SyncReport};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _: SyncConfig = SyncConfig::default();
        let _: SyncReport = SyncReport::default();
        let _: SyncOutcome = SyncOutcome::Offline;
        let _: Vec<ledgersync_core::Transaction> = merge(&[], Vec::new());
    }
}
