//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts exhausted: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },
}

impl ResilienceError {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> usize {
        match self {
            ResilienceError::RetriesExhausted { attempts, .. } => *attempts,
        }
    }

    /// Message of the last underlying failure
    pub fn last_error(&self) -> &str {
        match self {
            ResilienceError::RetriesExhausted { last_error, .. } => last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_exhausted_error() {
        let err = ResilienceError::RetriesExhausted {
            attempts: 5,
            last_error: "connection failed".to_string(),
        };
        assert!(err.to_string().contains("5"));
        assert!(err.to_string().contains("connection failed"));
        assert_eq!(err.attempts(), 5);
        assert_eq!(err.last_error(), "connection failed");
    }
}
