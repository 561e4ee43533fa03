//! Error types for the retry execution engine
//!
//! Every variant that ends a retry run carries the attempt count, so the
//! caller can report both the terminal error and how many times the
//! operation was invoked.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Terminal outcome of a failed retry run
///
/// The error type is generic over `E`, the underlying error type from the
/// operation being retried.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The classifier decided the error should not be retried
    Stopped {
        /// Attempt on which the run stopped
        attempts: u32,
        /// The error that was classified
        source: E,
    },

    /// The error could not be classified (transport failure, malformed body)
    Fatal {
        /// Attempt on which the error occurred
        attempts: u32,
        /// The unclassifiable error
        source: E,
    },

    /// An individual attempt exceeded the per-attempt timeout
    AttemptTimeout {
        /// Which attempt timed out
        attempt: u32,
        /// The timeout duration that was exceeded
        timeout: Duration,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => {
                write!(
                    f,
                    "retry exhausted after {} attempts over {:.2}s: {}",
                    attempts,
                    total_duration.as_secs_f64(),
                    source
                )
            }
            RetryError::Stopped { attempts, source } => {
                write!(f, "non-retryable error on attempt {}: {}", attempts, source)
            }
            RetryError::Fatal { attempts, source } => {
                write!(f, "unclassifiable error on attempt {}: {}", attempts, source)
            }
            RetryError::AttemptTimeout { attempt, timeout } => {
                write!(
                    f,
                    "attempt {} timed out after {}ms",
                    attempt,
                    timeout.as_millis()
                )
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. }
            | RetryError::Stopped { source, .. }
            | RetryError::Fatal { source, .. } => Some(source),
            RetryError::AttemptTimeout { .. } => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            source,
            total_duration,
        }
    }

    /// Create a new stopped error
    pub fn stopped(attempts: u32, source: E) -> Self {
        RetryError::Stopped { attempts, source }
    }

    /// Create a new fatal error
    pub fn fatal(attempts: u32, source: E) -> Self {
        RetryError::Fatal { attempts, source }
    }

    /// Create a new attempt timeout error
    pub fn attempt_timeout(attempt: u32, timeout: Duration) -> Self {
        RetryError::AttemptTimeout { attempt, timeout }
    }

    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Stopped { attempts, .. }
            | RetryError::Fatal { attempts, .. } => *attempts,
            RetryError::AttemptTimeout { attempt, .. } => *attempt,
        }
    }

    /// Check if this error indicates all attempts were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if the classifier stopped the run
    pub fn is_stopped(&self) -> bool {
        matches!(self, RetryError::Stopped { .. })
    }

    /// Check if the error was unclassifiable
    pub fn is_fatal(&self) -> bool {
        matches!(self, RetryError::Fatal { .. })
    }

    /// Check if this error indicates a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::AttemptTimeout { .. })
    }

    /// Get the underlying error, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. }
            | RetryError::Stopped { source, .. }
            | RetryError::Fatal { source, .. } => Some(source),
            RetryError::AttemptTimeout { .. } => None,
        }
    }

    /// Get a reference to the underlying error
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. }
            | RetryError::Stopped { source, .. }
            | RetryError::Fatal { source, .. } => Some(source),
            RetryError::AttemptTimeout { .. } => None,
        }
    }

    /// Map the error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                attempts,
                source: f(source),
                total_duration,
            },
            RetryError::Stopped { attempts, source } => RetryError::Stopped {
                attempts,
                source: f(source),
            },
            RetryError::Fatal { attempts, source } => RetryError::Fatal {
                attempts,
                source: f(source),
            },
            RetryError::AttemptTimeout { attempt, timeout } => {
                RetryError::AttemptTimeout { attempt, timeout }
            }
        }
    }
}
