//! Network connectivity monitoring

use crate::client::Client;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Source of connectivity status and its transitions
#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    /// One-shot status query
    async fn current_status(&self) -> bool;

    /// Subscribes to status changes; dropping the receiver unsubscribes
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity driven by the host
///
/// For platforms that deliver their own reachability events, and for tests.
#[derive(Debug, Clone)]
pub struct ManualConnectivity {
    status: Arc<watch::Sender<bool>>,
}

impl ManualConnectivity {
    /// Creates a monitor with the given initial status
    pub fn new(connected: bool) -> Self {
        let (status, _) = watch::channel(connected);
        Self {
            status: Arc::new(status),
        }
    }

    /// Publishes a status; returns true if it changed
    pub fn set_connected(&self, connected: bool) -> bool {
        let changed = self.status.send_if_modified(|current| {
            if *current == connected {
                false
            } else {
                *current = connected;
                true
            }
        });
        if changed {
            log::info!("Connectivity changed: {}", describe(connected));
        }
        changed
    }

    /// Last published status
    pub fn is_connected(&self) -> bool {
        *self.status.borrow()
    }
}

#[async_trait]
impl ConnectivityMonitor for ManualConnectivity {
    async fn current_status(&self) -> bool {
        self.is_connected()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }
}

/// Connectivity derived from polling probe URLs
///
/// The network counts as available when any probe URL answers a HEAD request
/// with a success status. Status starts as disconnected until the first probe.
#[derive(Debug)]
pub struct ProbeConnectivity {
    client: Client,
    probe_urls: Vec<String>,
    interval: Duration,
    status: watch::Sender<bool>,
}

impl ProbeConnectivity {
    /// Creates a monitor probing `probe_urls` every `interval`
    pub fn new(client: Client, probe_urls: Vec<String>, interval: Duration) -> Self {
        let (status, _) = watch::channel(false);
        Self {
            client,
            probe_urls,
            interval,
            status,
        }
    }

    /// Creates a monitor with well-known public probe URLs
    pub fn with_default_urls(client: Client, interval: Duration) -> Self {
        Self::new(
            client,
            vec![
                "https://www.google.com".to_string(),
                "https://www.cloudflare.com".to_string(),
                "https://www.rust-lang.org".to_string(),
            ],
            interval,
        )
    }

    /// Checks whether any probe URL is reachable
    pub async fn is_online(&self) -> bool {
        for url in &self.probe_urls {
            if self.client.is_accessible(url).await {
                return true;
            }
        }
        false
    }

    /// Probes once and publishes the result if it differs from the last one
    pub async fn refresh(&self) -> bool {
        let online = self.is_online().await;
        let changed = self.status.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            log::info!("Connectivity changed: {}", describe(online));
        }
        online
    }

    /// Polls in the background until the returned task is aborted
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.refresh().await;
            }
        })
    }
}

#[async_trait]
impl ConnectivityMonitor for ProbeConnectivity {
    async fn current_status(&self) -> bool {
        self.refresh().await
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }
}

fn describe(connected: bool) -> &'static str {
    if connected {
        "online"
    } else {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_reports_initial_status() {
        let monitor = ManualConnectivity::new(true);
        assert!(monitor.current_status().await);
    }

    #[tokio::test]
    async fn test_manual_publishes_transitions_only() {
        let monitor = ManualConnectivity::new(false);
        let mut rx = monitor.subscribe();

        assert!(!monitor.set_connected(false));
        assert!(!rx.has_changed().unwrap());

        assert!(monitor.set_connected(true));
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_block_updates() {
        let monitor = ManualConnectivity::new(false);
        drop(monitor.subscribe());
        assert!(monitor.set_connected(true));
        assert!(monitor.is_connected());
    }

    #[tokio::test]
    async fn test_probe_without_urls_is_offline() {
        let monitor = ProbeConnectivity::new(Client::new().unwrap(), Vec::new(), Duration::from_secs(5));
        assert!(!monitor.current_status().await);
        assert!(!*monitor.subscribe().borrow());
    }
}
