//! Resilience patterns for fault-tolerant operations
//!
//! Provides a bounded retry combinator with exponential backoff. The combinator
//! is async: every backoff delay is a `tokio::time::sleep`, so the scheduler
//! keeps running other work while an operation waits to be retried.
//!
//! # Example
//!
//! ```rust
//! use ledgersync_resilience::{with_retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let policy = RetryPolicy::new(3)
//!     .with_initial_delay(Duration::from_millis(1))
//!     .with_jitter(false);
//!
//! let value = with_retry(&policy, || async { Ok::<_, String>(42) }).await;
//! assert_eq!(value.ok(), Some(42));
//! # }
//! ```

mod error;
mod retry;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{with_retry, with_retry_notify, RetryAttempt, RetryPolicy};
