//! Sync notifications, outcomes and the observable ledger state

use chrono::{DateTime, Utc};
use ledgersync_core::{epoch, LedgerSummary, Transaction};
use serde::Serialize;
use std::time::Duration;

/// Progress notifications broadcast during a sync cycle
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A cycle acquired the busy flag
    Started,
    /// The cycle was skipped because the network is unavailable
    Offline,
    /// About to push this many unsynced records
    Uploading { count: usize },
    /// A push attempt failed and will be retried after `delay`
    UploadRetrying {
        attempt: usize,
        delay: Duration,
        error: String,
    },
    /// The server confirmed the batch
    UploadSucceeded { count: usize, attempts: usize },
    /// Every push attempt failed; nothing was marked synced
    UploadFailed { attempts: usize, error: String },
    /// A pull completed
    Downloaded { received: usize, added: usize },
    /// A non-fatal failure (pull or local persistence)
    Error { message: String },
    /// The cycle released the busy flag
    Finished,
}

/// Counters for a cycle that got past the connectivity check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Records confirmed by the server and marked synced
    pub pushed: usize,
    /// Push attempts made, zero when nothing was pending
    pub push_attempts: usize,
    /// Records returned by the pull
    pub received: usize,
    /// Pulled records that were new to the ledger
    pub added: usize,
    /// Why the pull failed, if it did
    pub pull_error: Option<String>,
    /// Why a local write failed, if one did
    pub storage_error: Option<String>,
}

impl SyncReport {
    /// True when neither the pull nor any local write failed
    pub fn is_clean(&self) -> bool {
        self.pull_error.is_none() && self.storage_error.is_none()
    }
}

/// Result of one sync request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Another cycle was in flight; this request was dropped
    AlreadyRunning,
    /// No connectivity; nothing was attempted
    Offline,
    /// The push exhausted its retries; the pull was skipped
    PushFailed { attempts: usize, error: String },
    /// The cycle could not run at all (the in-memory ledger was unusable)
    Aborted { error: String },
    /// Push (if any) succeeded and the pull ran
    Completed(SyncReport),
}

impl SyncOutcome {
    /// Returns the report of a completed cycle
    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// What consumers observe: the record set and whether a sync is running
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub transactions: Vec<Transaction>,
    pub is_syncing: bool,
    /// The epoch until the first successful pull
    pub last_sync_time: DateTime<Utc>,
}

impl LedgerSnapshot {
    pub(crate) fn new(transactions: Vec<Transaction>, last_sync_time: DateTime<Utc>) -> Self {
        Self {
            transactions,
            is_syncing: false,
            last_sync_time,
        }
    }

    /// Number of records still waiting for the server
    pub fn unsynced_count(&self) -> usize {
        self.transactions.iter().filter(|tx| !tx.synced).count()
    }

    /// Whether any pull has ever completed
    pub fn has_synced(&self) -> bool {
        self.last_sync_time > epoch()
    }

    /// Totals over the current record set
    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary::from_transactions(&self.transactions)
    }
}
