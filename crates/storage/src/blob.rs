//! Key-value blob store abstraction

use crate::error::{StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Durable string values addressed by key
///
/// Implementations must make `put` atomic: a concurrent or later `get` sees
/// either the previous value or the new one, never a mix.
pub trait BlobStore: Send + Sync {
    /// Reads a value, `None` if the key was never written
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replaces a value
    fn put(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Process-local blob store
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
