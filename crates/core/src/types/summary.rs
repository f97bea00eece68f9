//! Read models derived from a set of ledger records

use crate::error::CoreError;
use crate::types::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Ledger-wide totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub transaction_count: usize,
    pub unsynced_count: usize,
}

impl LedgerSummary {
    /// Computes totals over a record set
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |mut summary, tx| {
                match tx.kind {
                    TransactionKind::Income => summary.total_income += tx.amount,
                    TransactionKind::Expense => summary.total_expenses += tx.amount,
                }
                summary.transaction_count += 1;
                if !tx.synced {
                    summary.unsynced_count += 1;
                }
                summary
            })
    }

    /// Income minus expenses
    pub fn balance(&self) -> Decimal {
        self.total_income - self.total_expenses
    }

    /// Returns true if every record has been confirmed by the server
    pub fn is_fully_synced(&self) -> bool {
        self.unsynced_count == 0
    }
}

/// Total for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
}

/// Per-category totals for one kind, largest first
///
/// Ties are broken by category name so the output is stable.
pub fn category_breakdown(transactions: &[Transaction], kind: TransactionKind) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (Decimal, usize)> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.kind == kind) {
        let entry = totals.entry(tx.category.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();

    breakdown.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    breakdown
}

/// Which records the history view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TransactionFilter {
    /// Returns true if the record passes this filter
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Income => tx.kind == TransactionKind::Income,
            TransactionFilter::Expense => tx.kind == TransactionKind::Expense,
        }
    }
}

impl FromStr for TransactionFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TransactionFilter::All),
            "income" => Ok(TransactionFilter::Income),
            "expense" => Ok(TransactionFilter::Expense),
            other => Err(CoreError::UnknownFilter(other.to_string())),
        }
    }
}

/// Filtered records, newest first
pub fn history(transactions: &[Transaction], filter: TransactionFilter) -> Vec<Transaction> {
    let mut items: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| filter.matches(tx))
        .cloned()
        .collect();
    items.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionId;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, cents: i64, category: &str, kind: TransactionKind, day: u32, synced: bool) -> Transaction {
        Transaction {
            id: TransactionId::from(id),
            amount: Decimal::new(cents, 2),
            category: category.to_string(),
            kind,
            occurred_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            notes: String::new(),
            synced,
        }
    }

    fn ledger() -> Vec<Transaction> {
        vec![
            tx("1", 300000, "Salary", TransactionKind::Income, 1, true),
            tx("2", 4550, "Food", TransactionKind::Expense, 3, true),
            tx("3", 12000, "Housing", TransactionKind::Expense, 2, false),
            tx("4", 1450, "Food", TransactionKind::Expense, 5, false),
            tx("5", 25000, "Freelance", TransactionKind::Income, 4, true),
        ]
    }

    #[test]
    fn test_summary_totals() {
        let summary = LedgerSummary::from_transactions(&ledger());
        assert_eq!(summary.total_income, Decimal::new(325000, 2));
        assert_eq!(summary.total_expenses, Decimal::new(18000, 2));
        assert_eq!(summary.balance(), Decimal::new(307000, 2));
        assert_eq!(summary.transaction_count, 5);
        assert_eq!(summary.unsynced_count, 2);
        assert!(!summary.is_fully_synced());
    }

    #[test]
    fn test_summary_of_empty_ledger() {
        let summary = LedgerSummary::from_transactions(&[]);
        assert_eq!(summary.balance(), Decimal::ZERO);
        assert!(summary.is_fully_synced());
    }

    #[test]
    fn test_category_breakdown_sorted_by_total() {
        let breakdown = category_breakdown(&ledger(), TransactionKind::Expense);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Housing");
        assert_eq!(breakdown[0].total, Decimal::new(12000, 2));
        assert_eq!(breakdown[1].category, "Food");
        assert_eq!(breakdown[1].total, Decimal::new(6000, 2));
        assert_eq!(breakdown[1].count, 2);
    }

    #[test]
    fn test_history_filters_and_orders_newest_first() {
        let items = history(&ledger(), TransactionFilter::Expense);
        let ids: Vec<&str> = items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "2", "3"]);

        let all = history(&ledger(), TransactionFilter::All);
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].id.as_str(), "4");
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("ALL".parse::<TransactionFilter>().unwrap(), TransactionFilter::All);
        assert_eq!("income".parse::<TransactionFilter>().unwrap(), TransactionFilter::Income);
        assert!("transfers".parse::<TransactionFilter>().is_err());
    }
}
