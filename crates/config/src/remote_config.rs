//! Remote transaction service configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where and how to reach the remote ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    /// API root; the collection lives at `<base_url>/transactions`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent sent with every request
    pub user_agent: String,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            user_agent: format!("LedgerSync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ConfigSection for RemoteConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::http_url(&self.base_url, "remote.base_url"),
            Validator::in_range(self.timeout_secs, 1, 300, "remote.timeout_secs"),
            Validator::not_empty(&self.user_agent, "remote.user_agent"),
        ])
    }

    fn merge(&mut self, other: Self) {
        *self = other;
    }

    fn section_name(&self) -> &'static str {
        "remote"
    }
}
