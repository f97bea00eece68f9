//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Server returned {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The response body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network unavailable
    #[error("Network is unavailable")]
    NetworkUnavailable,

    /// Timeout
    #[error("Operation timed out")]
    Timeout,

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl NetworkError {
    /// Returns true if the error is retryable
    ///
    /// Transport failures, timeouts and server-side statuses (5xx, 408, 429)
    /// may succeed on a later attempt; malformed requests and bodies will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Timeout | NetworkError::NetworkUnavailable | NetworkError::Http(_) => {
                true
            }
            NetworkError::Status { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            NetworkError::Decode(_) | NetworkError::InvalidUrl(_) | NetworkError::Custom(_) => {
                false
            }
        }
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, NetworkError::Status { status, .. } if (400..500).contains(status))
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        matches!(self, NetworkError::Status { status, .. } if *status >= 500)
    }

    /// Builds a status error from a response status code
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        NetworkError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}
