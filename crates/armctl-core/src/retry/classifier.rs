//! Failure classification
//!
//! A failed attempt is retried only when its error exposes a structured
//! status/code pair and the configured `FailureClassifier` says `Retry`.
//! Errors without a structured part never reach a classifier.

use crate::remote::{OperationStatus, StructuredError};

/// Error code the compute service reports when an internal restart
/// interrupts an otherwise valid request
pub const INTERNAL_EXECUTION_ERROR: &str = "InternalExecutionError";

/// Outcome of classifying a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Resubmit the operation if attempts remain
    Retry,
    /// Return the error to the caller
    Stop,
}

/// Errors that may carry a classifiable status/code pair
///
/// Returning `None` marks the error as terminal: the executor surfaces it
/// immediately without consulting the classifier.
pub trait Classify {
    /// The structured part of the error, if it could be extracted
    fn structured(&self) -> Option<&StructuredError>;
}

/// Policy mapping a structured remote error to a retry decision
///
/// # Example
///
/// ```rust
/// use armctl_core::remote::{OperationStatus, StructuredError};
/// use armctl_core::retry::{FailureClassifier, RetryDecision};
///
/// struct ConflictClassifier;
///
/// impl FailureClassifier for ConflictClassifier {
///     fn classify(&self, error: &StructuredError) -> RetryDecision {
///         if error.code() == "Conflict" {
///             RetryDecision::Retry
///         } else {
///             RetryDecision::Stop
///         }
///     }
/// }
/// ```
pub trait FailureClassifier: Send + Sync {
    /// Decide whether the failed operation should be resubmitted
    fn classify(&self, error: &StructuredError) -> RetryDecision;
}

/// A status/code pair identifying a known transient fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSignature {
    pub status: OperationStatus,
    pub code: String,
}

impl FaultSignature {
    /// Create a new fault signature
    pub fn new(status: OperationStatus, code: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
        }
    }

    /// Check whether an error carries this exact status and code
    pub fn matches(&self, error: &StructuredError) -> bool {
        error.status == self.status && error.code.as_deref() == Some(self.code.as_str())
    }
}

/// Retries errors matching any of a list of known transient signatures
///
/// The default instance recognises only `Failed` + `InternalExecutionError`.
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    signatures: Vec<FaultSignature>,
}

impl SignatureClassifier {
    /// Classifier for the compute service's internal-restart fault
    pub fn internal_execution() -> Self {
        Self::new(vec![FaultSignature::new(
            OperationStatus::Failed,
            INTERNAL_EXECUTION_ERROR,
        )])
    }

    /// Create a classifier from a list of signatures
    pub fn new(signatures: Vec<FaultSignature>) -> Self {
        Self { signatures }
    }

    /// Add another transient signature
    pub fn with_signature(mut self, status: OperationStatus, code: impl Into<String>) -> Self {
        self.signatures.push(FaultSignature::new(status, code));
        self
    }

    /// The signatures this classifier retries on
    pub fn signatures(&self) -> &[FaultSignature] {
        &self.signatures
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::internal_execution()
    }
}

impl FailureClassifier for SignatureClassifier {
    fn classify(&self, error: &StructuredError) -> RetryDecision {
        if self.signatures.iter().any(|sig| sig.matches(error)) {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// A classifier that retries every structured error
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl FailureClassifier for AlwaysRetry {
    fn classify(&self, _error: &StructuredError) -> RetryDecision {
        RetryDecision::Retry
    }
}

/// A classifier that never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl FailureClassifier for NeverRetry {
    fn classify(&self, _error: &StructuredError) -> RetryDecision {
        RetryDecision::Stop
    }
}

/// A classifier backed by a closure
pub struct ClosureClassifier<F> {
    classify: F,
}

impl<F> ClosureClassifier<F> {
    /// Create a new closure-based classifier
    pub fn new(classify: F) -> Self {
        Self { classify }
    }
}

impl<F> FailureClassifier for ClosureClassifier<F>
where
    F: Fn(&StructuredError) -> RetryDecision + Send + Sync,
{
    fn classify(&self, error: &StructuredError) -> RetryDecision {
        (self.classify)(error)
    }
}

impl<T: FailureClassifier + ?Sized> FailureClassifier for std::sync::Arc<T> {
    fn classify(&self, error: &StructuredError) -> RetryDecision {
        (**self).classify(error)
    }
}

impl<T: FailureClassifier + ?Sized> FailureClassifier for Box<T> {
    fn classify(&self, error: &StructuredError) -> RetryDecision {
        (**self).classify(error)
    }
}
