//! Wire representation of transactions on the remote API

use chrono::{DateTime, TimeZone, Utc};
use ledgersync_core::{Decimal, Transaction, TransactionId, TransactionKind};
use serde::{Deserialize, Serialize};

/// Server-side timestamp: whole seconds since the epoch plus nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTimestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl From<DateTime<Utc>> for ServerTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self {
            seconds: at.timestamp(),
            nanoseconds: at.timestamp_subsec_nanos(),
        }
    }
}

impl ServerTimestamp {
    /// Converts back to a UTC instant, if representable
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanoseconds).single()
    }
}

/// A record as sent to the server
///
/// The local identifier and the `synced` flag never leave the device; the
/// server assigns its own id and orders by `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub timestamp: ServerTimestamp,
}

impl From<&Transaction> for PushPayload {
    fn from(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount,
            category: tx.category.clone(),
            kind: tx.kind,
            date: tx.occurred_at,
            notes: tx.notes.clone(),
            timestamp: ServerTimestamp::from(tx.occurred_at),
        }
    }
}

/// A record as returned by a pull
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl RemoteRecord {
    /// Adopts the server id verbatim; everything pulled is already stored remotely
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: TransactionId::from_string(self.id),
            amount: self.amount,
            category: self.category,
            kind: self.kind,
            occurred_at: self.date,
            notes: self.notes,
            synced: true,
        }
    }
}
