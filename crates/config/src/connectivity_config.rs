//! Connectivity probing configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How reachability is detected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// URLs probed with HEAD requests; empty means probe the remote itself
    pub probe_urls: Vec<String>,

    /// Seconds between probes
    pub poll_interval_secs: u64,
}

impl ConnectivityConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_urls: Vec::new(),
            poll_interval_secs: 5,
        }
    }
}

impl ConfigSection for ConnectivityConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results: Vec<_> = self
            .probe_urls
            .iter()
            .enumerate()
            .map(|(i, url)| Validator::http_url(url, &format!("connectivity.probe_urls[{}]", i)))
            .collect();
        results.push(Validator::in_range(
            self.poll_interval_secs,
            1,
            3600,
            "connectivity.poll_interval_secs",
        ));

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        if !other.probe_urls.is_empty() {
            self.probe_urls = other.probe_urls;
        }
        self.poll_interval_secs = other.poll_interval_secs;
    }

    fn section_name(&self) -> &'static str {
        "connectivity"
    }
}
