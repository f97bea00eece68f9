//! Remote transaction service

use crate::client::Client;
use crate::error::{NetworkError, NetworkResult};
use crate::protocol::{PushPayload, RemoteRecord};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ledgersync_core::Transaction;
use reqwest::Url;

/// The authoritative store the ledger syncs with
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Stores a batch remotely; any error means nothing may be marked synced
    async fn push(&self, transactions: &[Transaction]) -> NetworkResult<()>;

    /// Records created strictly after `since`, stamped synced
    async fn pull(&self, since: DateTime<Utc>) -> NetworkResult<Vec<Transaction>>;
}

/// REST implementation of [`RemoteService`]
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    transactions_url: Url,
}

impl HttpRemote {
    /// Creates a remote rooted at `base_url`
    pub fn new(client: Client, base_url: &str) -> NetworkResult<Self> {
        let mut base =
            Url::parse(base_url).map_err(|e| NetworkError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(NetworkError::InvalidUrl(base_url.to_string()));
        }
        // Without a trailing slash `join` would replace the last segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let transactions_url = base
            .join("transactions")
            .map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client,
            transactions_url,
        })
    }

    /// The collection endpoint used for both push and pull
    pub fn transactions_url(&self) -> &Url {
        &self.transactions_url
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    async fn push(&self, transactions: &[Transaction]) -> NetworkResult<()> {
        if transactions.is_empty() {
            return Ok(());
        }

        let payload: Vec<PushPayload> = transactions.iter().map(PushPayload::from).collect();
        log::debug!("Pushing {} transactions to {}", payload.len(), self.transactions_url);
        self.client
            .post_json(self.transactions_url.as_str(), &payload)
            .await
    }

    async fn pull(&self, since: DateTime<Utc>) -> NetworkResult<Vec<Transaction>> {
        let since = since.to_rfc3339_opts(SecondsFormat::Millis, true);
        log::debug!("Pulling transactions since {}", since);

        let records: Vec<RemoteRecord> = self
            .client
            .get_json(self.transactions_url.as_str(), &[("since", since)])
            .await?;

        Ok(records
            .into_iter()
            .map(RemoteRecord::into_transaction)
            .collect())
    }
}
