//! Common traits and helpers shared across domain models

use chrono::{DateTime, Utc};

/// The Unix epoch, used as the "never synced" marker
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns every problem found
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
