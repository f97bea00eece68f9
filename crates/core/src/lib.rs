//! Domain model for the LedgerSync offline-first transaction ledger
//!
//! This crate holds the plain data types every other crate builds on:
//! - `Transaction` and its add-request form `NewTransaction`
//! - Read models derived from a record set (totals, category breakdown, history)
//! - Sample data used to seed an empty ledger on first run

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use types::{
    category_breakdown, epoch, history, sample_transactions, CategoryTotal, LedgerSummary,
    NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionKind, Validator,
    CATEGORIES,
};

// Amounts are `rust_decimal::Decimal` throughout the workspace
pub use rust_decimal::Decimal;
