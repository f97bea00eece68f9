//! HTTP client wrapper
//!
//! Retries are not done here: the sync engine owns the retry budget for
//! pushes and a pull is simply deferred to the next cycle.

use crate::error::{NetworkError, NetworkResult};
use reqwest::{Client as ReqwestClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("LedgerSync/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// Thin JSON-over-HTTP client
#[derive(Debug, Clone)]
pub struct Client {
    inner: ReqwestClient,
    config: ClientConfig,
}

impl Client {
    /// Creates a new client with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> NetworkResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            inner: client,
            config,
        })
    }

    /// Returns the configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs a GET request
    pub async fn get(&self, url: &str) -> NetworkResult<Response> {
        let response = self.inner.get(url).send().await.map_err(map_transport)?;
        check_status(response)
    }

    /// Performs a HEAD request
    pub async fn head(&self, url: &str) -> NetworkResult<Response> {
        let response = self.inner.head(url).send().await.map_err(map_transport)?;
        check_status(response)
    }

    /// Checks if a URL answers with a success status
    pub async fn is_accessible(&self, url: &str) -> bool {
        match self.head(url).await {
            Ok(_) => true,
            Err(e) => {
                log::trace!("{} not accessible: {}", url, e);
                false
            }
        }
    }

    /// GETs `url` with query parameters and decodes the JSON body
    pub async fn get_json<T>(&self, url: &str, query: &[(&str, String)]) -> NetworkResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport)?;
        let body = check_status(response)?
            .text()
            .await
            .map_err(map_transport)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POSTs `body` as JSON; any 2xx status is success
    pub async fn post_json<B>(&self, url: &str, body: &B) -> NetworkResult<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .inner
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> NetworkResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(NetworkError::from_status(status))
    }
}

fn map_transport(e: reqwest::Error) -> NetworkError {
    if e.is_timeout() {
        NetworkError::Timeout
    } else if e.is_builder() {
        NetworkError::InvalidUrl(e.to_string())
    } else {
        NetworkError::Http(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("LedgerSync/"));
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = ClientConfig {
            timeout: Duration::from_secs(10),
            user_agent: "TestAgent".to_string(),
            max_redirects: 5,
        };

        let client = Client::with_config(config).unwrap();
        assert_eq!(client.config().user_agent, "TestAgent");
    }

    #[tokio::test]
    async fn test_malformed_url_is_rejected() {
        let client = Client::new().unwrap();
        let result = client.get("not a url").await;
        assert!(matches!(result, Err(NetworkError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_not_accessible() {
        let client = Client::with_config(ClientConfig {
            timeout: Duration::from_millis(500),
            ..ClientConfig::default()
        })
        .unwrap();

        // Port 9 on loopback refuses connections
        assert!(!client.is_accessible("http://127.0.0.1:9/").await);
    }
}
