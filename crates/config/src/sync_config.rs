//! Sync behavior configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Push retry and sync trigger settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Push attempts per cycle, first attempt included
    pub max_attempts: usize,

    /// Delay after the first failed push, in milliseconds
    pub initial_backoff_ms: u64,

    /// Factor applied to the delay after each further failure
    pub backoff_multiplier: f64,

    /// Upper bound for a single delay, in milliseconds
    pub max_backoff_ms: u64,

    /// Start a sync right after a transaction is added
    pub sync_on_add: bool,

    /// Seed sample transactions into an empty ledger
    pub seed_sample_data: bool,

    /// Number of sample transactions to seed
    pub sample_count: usize,
}

impl SyncSettings {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 60_000,
            sync_on_add: true,
            seed_sample_data: true,
            sample_count: 100,
        }
    }
}

impl ConfigSection for SyncSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::in_range(self.max_attempts, 1, 20, "sync.max_attempts"),
            Validator::in_range(self.initial_backoff_ms, 1, 600_000, "sync.initial_backoff_ms"),
            Validator::in_range(self.backoff_multiplier, 1.0, 10.0, "sync.backoff_multiplier"),
            Validator::in_range(self.sample_count, 0, 10_000, "sync.sample_count"),
        ];

        if self.max_backoff_ms < self.initial_backoff_ms {
            results.push(Err(ValidationError::with_value(
                "sync.max_backoff_ms",
                "must not be smaller than sync.initial_backoff_ms",
                self.max_backoff_ms,
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "sync"
    }
}
