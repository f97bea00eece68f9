//! Sync orchestrator
//!
//! Owns the in-memory ledger, persists every mutation through the
//! [`LedgerStore`], and runs push-then-pull cycles against a
//! [`RemoteService`]. At most one cycle runs at a time.

use crate::error::{SyncError, SyncResult};
use crate::merge::merge;
use crate::types::{LedgerSnapshot, SyncEvent, SyncOutcome, SyncReport};
use chrono::{DateTime, Utc};
use ledgersync_core::{epoch, sample_transactions, NewTransaction, Transaction, TransactionId};
use ledgersync_network::{ConnectivityMonitor, NetworkError, RemoteService};
use ledgersync_resilience::{with_retry_notify, ResilienceError, RetryAttempt, RetryPolicy};
use ledgersync_storage::{LedgerStore, StorageError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Configuration for the sync engine
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Backoff applied to pushes
    pub retry: RetryPolicy,
    /// Start a sync after every successful add
    pub sync_on_add: bool,
    /// Seed sample records into an empty ledger on open
    pub seed_sample_data: bool,
    /// How many sample records to seed
    pub sample_count: usize,
    /// Event channel capacity; lagging subscribers lose the oldest events
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::new(5)
                .with_initial_delay(Duration::from_secs(1))
                .with_multiplier(2.0)
                .with_max_delay(Duration::from_secs(60))
                .with_jitter(false),
            sync_on_add: true,
            seed_sample_data: true,
            sample_count: 100,
            event_capacity: 64,
        }
    }
}

struct Inner {
    config: SyncConfig,
    store: LedgerStore,
    remote: Arc<dyn RemoteService>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    ledger: Mutex<Vec<Transaction>>,
    busy: AtomicBool,
    snapshot: watch::Sender<LedgerSnapshot>,
    events: broadcast::Sender<SyncEvent>,
}

/// Handle to the offline-first ledger and its sync loop
///
/// Cloning is cheap; all clones share one ledger and one busy flag.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

/// Holds the busy flag for the duration of a cycle
struct BusyGuard<'a> {
    inner: &'a Inner,
}

impl<'a> BusyGuard<'a> {
    fn acquire(inner: &'a Inner) -> Option<Self> {
        inner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        inner.snapshot.send_modify(|s| s.is_syncing = true);
        Some(Self { inner })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.inner.snapshot.send_modify(|s| s.is_syncing = false);
        self.inner.busy.store(false, Ordering::Release);
    }
}

impl SyncEngine {
    /// Loads the ledger and prepares the engine
    ///
    /// An empty ledger is seeded with sample records when the configuration
    /// asks for it. A corrupt ledger is an error rather than being replaced.
    pub fn open(
        config: SyncConfig,
        store: LedgerStore,
        remote: Arc<dyn RemoteService>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> SyncResult<Self> {
        let mut transactions = store.load_all()?;
        if transactions.is_empty() && config.seed_sample_data && config.sample_count > 0 {
            transactions = sample_transactions(config.sample_count);
            store.save_all(&transactions)?;
            log::info!("Seeded ledger with {} sample transactions", transactions.len());
        }

        let last_sync_time = store.last_sync_time()?;
        let snapshot = LedgerSnapshot::new(transactions.clone(), last_sync_time);
        log::info!(
            "Loaded {} transactions ({} unsynced)",
            snapshot.transactions.len(),
            snapshot.unsynced_count()
        );

        let (snapshot, _) = watch::channel(snapshot);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                store,
                remote,
                connectivity,
                ledger: Mutex::new(transactions),
                busy: AtomicBool::new(false),
                snapshot,
                events,
            }),
        })
    }

    /// Records a new local transaction
    ///
    /// The record is validated, given a fresh id and persisted. If the write
    /// fails the record stays in the in-memory ledger (and is written by the
    /// next successful save) and the storage error is returned; no sync is
    /// started in that case.
    pub fn add_transaction(&self, new: NewTransaction) -> SyncResult<Transaction> {
        let tx = new.into_transaction()?;

        {
            let mut ledger = self.lock_ledger()?;
            ledger.push(tx.clone());
            self.write_and_publish(&ledger)?;
        }

        log::info!("Added {} {} in {}", tx.kind, tx.amount, tx.category);
        if self.inner.config.sync_on_add {
            let _ = self.spawn_sync();
        }
        Ok(tx)
    }

    /// Runs one sync cycle and waits for it
    ///
    /// Returns [`SyncOutcome::AlreadyRunning`] immediately when another cycle
    /// is in flight; requests are never queued.
    pub async fn trigger_sync(&self) -> SyncOutcome {
        let Some(guard) = BusyGuard::acquire(&self.inner) else {
            log::debug!("Sync already in progress, request dropped");
            return SyncOutcome::AlreadyRunning;
        };

        self.emit(SyncEvent::Started);
        let outcome = match self.run_cycle().await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Sync aborted: {}", e);
                self.emit(SyncEvent::Error {
                    message: e.to_string(),
                });
                SyncOutcome::Aborted {
                    error: e.to_string(),
                }
            }
        };
        drop(guard);
        self.emit(SyncEvent::Finished);

        log::debug!("Sync finished: {:?}", outcome);
        outcome
    }

    /// Starts a cycle in the background
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub fn spawn_sync(&self) -> Option<JoinHandle<SyncOutcome>> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::debug!("No async runtime, sync not started");
            return None;
        };
        let engine = self.clone();
        Some(runtime.spawn(async move { engine.trigger_sync().await }))
    }

    /// Runs the startup sync, then a sync on every transition to connected
    pub fn start(&self) -> ConnectivityListener {
        let engine = self.clone();
        let mut status = self.inner.connectivity.subscribe();

        let task = tokio::spawn(async move {
            let startup = engine.trigger_sync().await;
            // Transitions published during the startup cycle (including the
            // one its own status check caused) only count if it ran offline.
            let connected = *status.borrow_and_update();
            if connected && startup == SyncOutcome::Offline {
                log::info!("Connected during startup sync, starting sync");
                let _ = engine.spawn_sync();
            }

            while status.changed().await.is_ok() {
                let connected = *status.borrow_and_update();
                if connected {
                    log::info!("Connectivity restored, starting sync");
                    let _ = engine.spawn_sync();
                }
            }
            log::debug!("Connectivity source closed");
        });

        ConnectivityListener { task }
    }

    /// Current state of the ledger
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Read-only subscription to ledger state changes
    pub fn subscribe(&self) -> watch::Receiver<LedgerSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Subscription to sync progress notifications
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Whether a cycle is in flight
    pub fn is_syncing(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    async fn run_cycle(&self) -> SyncResult<SyncOutcome> {
        if !self.inner.connectivity.current_status().await {
            log::info!("Network unavailable, skipping sync");
            self.emit(SyncEvent::Offline);
            return Ok(SyncOutcome::Offline);
        }

        let mut report = SyncReport::default();

        let pending = self.unsynced()?;
        if !pending.is_empty() {
            match self.push(&pending).await {
                Ok(attempts) => {
                    report.push_attempts = attempts;
                    self.mark_synced(&pending, &mut report)?;
                    self.emit(SyncEvent::UploadSucceeded {
                        count: pending.len(),
                        attempts,
                    });
                }
                Err(ResilienceError::RetriesExhausted {
                    attempts,
                    last_error,
                }) => {
                    log::error!(
                        "Upload failed after {} attempts, {} transactions stay unsynced: {}",
                        attempts,
                        pending.len(),
                        last_error
                    );
                    self.emit(SyncEvent::UploadFailed {
                        attempts,
                        error: last_error.clone(),
                    });
                    return Ok(SyncOutcome::PushFailed {
                        attempts,
                        error: last_error,
                    });
                }
            }
        }

        self.pull(&mut report).await?;
        Ok(SyncOutcome::Completed(report))
    }

    /// Pushes `batch` with backoff, returning the number of attempts made
    async fn push(&self, batch: &[Transaction]) -> Result<usize, ResilienceError> {
        log::info!("Uploading {} unsynced transactions", batch.len());
        self.emit(SyncEvent::Uploading { count: batch.len() });

        let remote = &self.inner.remote;
        let mut attempts = 0;
        with_retry_notify(
            &self.inner.config.retry,
            || {
                attempts += 1;
                async move { remote.push(batch).await }
            },
            |retry: RetryAttempt<'_, NetworkError>| {
                log::warn!(
                    "Upload attempt {} failed, retrying in {:?}: {}",
                    retry.attempt,
                    retry.delay,
                    retry.error
                );
                self.emit(SyncEvent::UploadRetrying {
                    attempt: retry.attempt,
                    delay: retry.delay,
                    error: retry.error.to_string(),
                });
            },
        )
        .await?;

        Ok(attempts)
    }

    /// Flags exactly the pushed ids; records added meanwhile stay unsynced
    fn mark_synced(&self, pushed: &[Transaction], report: &mut SyncReport) -> SyncResult<()> {
        let ids: HashSet<&TransactionId> = pushed.iter().map(|tx| &tx.id).collect();

        let mut ledger = self.lock_ledger()?;
        for tx in ledger.iter_mut().filter(|tx| ids.contains(&tx.id)) {
            tx.synced = true;
        }

        report.pushed = ids.len();
        self.persist(&ledger, report);
        Ok(())
    }

    async fn pull(&self, report: &mut SyncReport) -> SyncResult<()> {
        let since = match self.inner.store.last_sync_time() {
            Ok(at) => at,
            Err(e) => {
                self.report_storage_error(&e, report);
                epoch()
            }
        };

        let pulled = match self.inner.remote.pull(since).await {
            Ok(pulled) => pulled,
            Err(e) => {
                log::warn!("Download failed, deferring to the next sync: {}", e);
                self.emit(SyncEvent::Error {
                    message: format!("Failed to download transactions: {e}"),
                });
                report.pull_error = Some(e.to_string());
                return Ok(());
            }
        };
        // Captured after the pull: records created during it may be
        // delivered again next time, which the merge absorbs.
        let pulled_at = Utc::now();
        report.received = pulled.len();

        let mut saved = true;
        if !pulled.is_empty() {
            let mut ledger = self.lock_ledger()?;
            let before = ledger.len();
            let merged = merge(&ledger, pulled);
            *ledger = merged;
            report.added = ledger.len() - before;
            saved = self.persist(&ledger, report);
        }

        log::info!(
            "Downloaded {} transactions, {} new",
            report.received,
            report.added
        );
        self.emit(SyncEvent::Downloaded {
            received: report.received,
            added: report.added,
        });

        // A failed merge write must be pulled again
        if saved {
            self.advance_last_sync(pulled_at, report);
        }
        Ok(())
    }

    fn advance_last_sync(&self, at: DateTime<Utc>, report: &mut SyncReport) {
        match self.inner.store.set_last_sync_time(at) {
            Ok(_) => self.inner.snapshot.send_modify(|s| {
                if at > s.last_sync_time {
                    s.last_sync_time = at;
                }
            }),
            Err(e) => self.report_storage_error(&e, report),
        }
    }

    /// Saves and publishes the record set
    ///
    /// Callers pass the contents of a held ledger guard, so writes land on
    /// disk and in the snapshot in the same order as the mutations.
    fn write_and_publish(&self, ledger: &[Transaction]) -> Result<(), StorageError> {
        let saved = self.inner.store.save_all(ledger);
        self.inner
            .snapshot
            .send_modify(|s| s.transactions = ledger.to_vec());
        saved
    }

    /// Like `write_and_publish`, recording a failure in the report
    fn persist(&self, ledger: &[Transaction], report: &mut SyncReport) -> bool {
        match self.write_and_publish(ledger) {
            Ok(()) => true,
            Err(e) => {
                self.report_storage_error(&e, report);
                false
            }
        }
    }

    fn report_storage_error(&self, error: &StorageError, report: &mut SyncReport) {
        log::error!("Ledger write failed: {}", error);
        let message = format!("Failed to save ledger: {error}");
        self.emit(SyncEvent::Error {
            message: message.clone(),
        });
        report.storage_error = Some(message);
    }

    fn unsynced(&self) -> SyncResult<Vec<Transaction>> {
        Ok(self
            .lock_ledger()?
            .iter()
            .filter(|tx| !tx.synced)
            .cloned()
            .collect())
    }

    fn lock_ledger(&self) -> SyncResult<MutexGuard<'_, Vec<Transaction>>> {
        self.inner.ledger.lock().map_err(|_| SyncError::LockPoisoned)
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .field("is_syncing", &self.is_syncing())
            .finish_non_exhaustive()
    }
}

/// Keeps connectivity-triggered syncs running
///
/// Dropping the listener (or calling [`shutdown`](Self::shutdown)) stops it.
/// A cycle already spawned by it runs to completion.
#[must_use = "connectivity-triggered syncs stop when the listener is dropped"]
#[derive(Debug)]
pub struct ConnectivityListener {
    task: JoinHandle<()>,
}

impl ConnectivityListener {
    /// Stops listening for connectivity changes
    pub fn shutdown(self) {
        log::debug!("Connectivity listener shut down");
    }

    /// False once the connectivity source has closed or the listener was stopped
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ConnectivityListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
