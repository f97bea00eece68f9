//! Error types for domain operations

use thiserror::Error;

/// Result type for domain operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the domain layer
#[derive(Debug, Error)]
pub enum CoreError {
    /// A transaction failed validation
    #[error("Invalid transaction: {}", .problems.join("; "))]
    InvalidTransaction { problems: Vec<String> },

    /// Unknown transaction kind string
    #[error("Unknown transaction kind: {0} (expected 'income' or 'expense')")]
    UnknownKind(String),

    /// Unknown history filter string
    #[error("Unknown filter: {0} (expected 'all', 'income' or 'expense')")]
    UnknownFilter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transaction_lists_every_problem() {
        let err = CoreError::InvalidTransaction {
            problems: vec!["amount is negative".to_string(), "category is empty".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("amount is negative"));
        assert!(msg.contains("category is empty"));
    }

    #[test]
    fn test_unknown_kind_display() {
        let err = CoreError::UnknownKind("refund".to_string());
        assert!(err.to_string().contains("refund"));
    }
}
