//! Identifier-based reconciliation of pulled records

use ledgersync_core::{Transaction, TransactionId};
use std::collections::HashSet;

/// Merges pulled records into the local set
///
/// Local records keep their order and content. Each remote record whose id
/// is not yet known is appended, stamped synced, in pull order. Remote records
/// that collide with a local id are dropped, as are repeats of an id earlier
/// in the same batch, so the result never holds a duplicate id.
pub fn merge(local: &[Transaction], remote: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen: HashSet<TransactionId> = local.iter().map(|tx| tx.id.clone()).collect();
    let mut merged = Vec::with_capacity(local.len() + remote.len());
    merged.extend_from_slice(local);

    for tx in remote {
        if seen.insert(tx.id.clone()) {
            merged.push(tx.into_synced());
        } else {
            log::trace!("Dropping pulled record {}: id already present", tx.id);
        }
    }

    merged
}
