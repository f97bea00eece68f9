//! Transaction domain model

use crate::error::CoreError;
use crate::types::Validator;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a transaction
///
/// Locally created records get a random UUID; records pulled from the server
/// keep the identifier the server assigned, whatever its shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a new random TransactionId
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Adopts an identifier verbatim
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Direction of a transaction; amounts themselves are never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(CoreError::UnknownKind(other.to_string())),
        }
    }
}

/// A ledger record
///
/// Serialized with the field names the local key space and the remote API
/// use: `id, amount, category, type, date, notes, synced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    /// Local-only: set once the server has durably stored this record
    #[serde(default)]
    pub synced: bool,
}

impl Transaction {
    /// Materializes a locally created record from an add request
    pub fn from_new(new: NewTransaction) -> Self {
        Self {
            id: TransactionId::new(),
            amount: new.amount,
            category: new.category,
            kind: new.kind,
            occurred_at: new.occurred_at,
            notes: new.notes,
            synced: false,
        }
    }

    /// Returns a copy stamped as confirmed by the server
    pub fn into_synced(mut self) -> Self {
        self.synced = true;
        self
    }

    /// Returns the amount with the sign implied by the kind
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

impl Validator for Transaction {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = validate_fields(self.amount, &self.category);

        if self.id.as_str().trim().is_empty() {
            errors.push("Transaction id cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Everything a caller supplies to add a transaction; the ledger assigns
/// `id` and `synced`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl NewTransaction {
    /// Creates a request dated now with empty notes
    pub fn new(amount: Decimal, category: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            amount,
            category: category.into(),
            kind,
            occurred_at: Utc::now(),
            notes: String::new(),
        }
    }

    /// Sets the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets when the transaction happened
    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = at;
        self
    }

    /// Validates and converts into a ledger record
    pub fn into_transaction(self) -> Result<Transaction, CoreError> {
        self.validate()
            .map_err(|problems| CoreError::InvalidTransaction { problems })?;
        Ok(Transaction::from_new(self))
    }
}

impl Validator for NewTransaction {
    fn validate(&self) -> Result<(), Vec<String>> {
        let errors = validate_fields(self.amount, &self.category);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn validate_fields(amount: Decimal, category: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if amount.is_sign_negative() && !amount.is_zero() {
        errors.push(format!("Amount must not be negative (got {})", amount));
    }

    if category.trim().is_empty() {
        errors.push("Category cannot be empty".to_string());
    }

    errors
}
