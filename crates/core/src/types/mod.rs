//! Domain types for LedgerSync
//!
//! - `transaction`: Transaction records and the add-request payload
//! - `summary`: Read models derived from a set of records
//! - `sample`: First-run sample data
//! - `common`: Shared traits and helpers

mod common;
mod sample;
mod summary;
mod transaction;

pub use common::{epoch, Validator};
pub use sample::{sample_transactions, CATEGORIES};
pub use summary::{category_breakdown, history, CategoryTotal, LedgerSummary, TransactionFilter};
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let _id: TransactionId = TransactionId::new();
        let _filter: TransactionFilter = TransactionFilter::All;
        let _summary: LedgerSummary = LedgerSummary::default();
        assert!(!CATEGORIES.is_empty());
    }
}
