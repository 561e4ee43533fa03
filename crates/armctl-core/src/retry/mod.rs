//! Retry execution engine with classification-based retry decisions
//!
//! This module drives a remote operation through a bounded number of
//! attempts. After each failure the error is either terminal on its own
//! (transport failures, unparseable error bodies) or handed to a
//! `FailureClassifier`, which decides whether to resubmit.
//!
//! # Features
//!
//! - Pluggable failure classification via the `FailureClassifier` trait
//! - Default classifier absorbing the `Failed`/`InternalExecutionError` fault
//! - Optional backoff strategies (None, Fixed, Exponential, Linear)
//! - Optional per-attempt timeout
//! - Observable attempts via the `RetryObserver` trait
//!
//! # Example
//!
//! ```rust,no_run
//! use armctl_core::remote::RemoteError;
//! use armctl_core::retry::{retry_remote, RetryError};
//! use armctl_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<RemoteError>> {
//!     let policy = RetryPolicy::immediate(2);
//!
//!     retry_remote(&policy, || async {
//!         // Your remote management call here
//!         Ok("created".to_string())
//!     }).await
//! }
//! ```

mod backoff;
mod classifier;
mod error;
mod executor;
mod observer;

pub use backoff::calculate_delay;
pub use classifier::{
    AlwaysRetry, Classify, ClosureClassifier, FailureClassifier, FaultSignature, NeverRetry,
    RetryDecision, SignatureClassifier, INTERNAL_EXECUTION_ERROR,
};
pub use error::RetryError;
pub use executor::{retry_remote, RetryExecutor, RetryExecutorBuilder};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
