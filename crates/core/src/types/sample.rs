//! Sample data used to seed an empty ledger

use crate::types::{Transaction, TransactionId, TransactionKind};
use chrono::{Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Categories offered for new transactions
pub const CATEGORIES: &[&str] = &[
    "Food",
    "Transportation",
    "Housing",
    "Utilities",
    "Entertainment",
    "Healthcare",
    "Education",
    "Shopping",
    "Personal Care",
    "Gifts",
    "Investments",
    "Salary",
    "Freelance",
    "Dividends",
    "Rental Income",
];

const INCOME_PROBABILITY: f64 = 0.3;
const MAX_AMOUNT_CENTS: i64 = 100_000;
const LOOKBACK_DAYS: i64 = 90;

/// Generates `count` plausible unsynced records dated within the last 90 days
pub fn sample_transactions(count: usize) -> Vec<Transaction> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let lookback_ms = Duration::days(LOOKBACK_DAYS).num_milliseconds();

    (0..count)
        .map(|_| {
            let kind = if rng.random_bool(INCOME_PROBABILITY) {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            };
            let category = CATEGORIES.choose(&mut rng).copied().unwrap_or("Food");
            let amount = Decimal::new(rng.random_range(0..MAX_AMOUNT_CENTS), 2);
            let occurred_at = now - Duration::milliseconds(rng.random_range(0..lookback_ms));

            Transaction {
                id: TransactionId::new(),
                amount,
                category: category.to_string(),
                kind,
                occurred_at,
                notes: format!("Sample {} for {}", kind, category),
                synced: false,
            }
        })
        .collect()
}
