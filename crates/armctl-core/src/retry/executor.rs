//! Retry execution engine
//!
//! This module provides the core retry loop: invoke, classify, resubmit or
//! return. The operation is invoked at most `max_attempts` times.

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::types::RetryPolicy;

use super::backoff::calculate_delay;
use super::classifier::{Classify, FailureClassifier, RetryDecision, SignatureClassifier};
use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};

/// Execute a remote operation with the default classifier
///
/// Retries only `Failed` + `InternalExecutionError`, using the attempt
/// budget and delays of `policy`.
///
/// # Example
///
/// ```rust,no_run
/// use armctl_core::remote::{OperationStatus, RemoteError};
/// use armctl_core::retry::retry_remote;
/// use armctl_core::types::RetryPolicy;
///
/// async fn example() {
///     let policy = RetryPolicy::immediate(2);
///
///     let result = retry_remote(&policy, || async {
///         Err::<(), _>(RemoteError::operation_failed(OperationStatus::Failed, "Conflict"))
///     }).await;
///
///     assert!(result.unwrap_err().is_stopped());
/// }
/// ```
pub async fn retry_remote<F, Fut, T, E>(policy: &RetryPolicy, op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    RetryExecutorBuilder::new()
        .with_policy(policy.clone())
        .build()
        .execute(op)
        .await
}

/// Builder for configuring a `RetryExecutor`
///
/// # Example
///
/// ```rust
/// use armctl_core::remote::OperationStatus;
/// use armctl_core::retry::{RetryExecutorBuilder, SignatureClassifier, TracingObserver};
/// use armctl_core::types::RetryPolicy;
///
/// let executor = RetryExecutorBuilder::new()
///     .with_policy(RetryPolicy::immediate(3))
///     .with_classifier(
///         SignatureClassifier::internal_execution()
///             .with_signature(OperationStatus::Failed, "OperationPreempted"),
///     )
///     .with_observer(TracingObserver::new("extension-create"))
///     .build();
/// ```
pub struct RetryExecutorBuilder<C = SignatureClassifier, O = NoOpObserver> {
    policy: RetryPolicy,
    classifier: C,
    observer: O,
    jitter: bool,
    attempt_timeout: Option<Duration>,
}

impl Default for RetryExecutorBuilder<SignatureClassifier, NoOpObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder<SignatureClassifier, NoOpObserver> {
    /// Create a new builder with the default policy and classifier
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            classifier: SignatureClassifier::default(),
            observer: NoOpObserver,
            jitter: false,
            attempt_timeout: None,
        }
    }
}

impl<C, O> RetryExecutorBuilder<C, O> {
    /// Set the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the failure classifier
    pub fn with_classifier<C2>(self, classifier: C2) -> RetryExecutorBuilder<C2, O> {
        RetryExecutorBuilder {
            policy: self.policy,
            classifier,
            observer: self.observer,
            jitter: self.jitter,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutorBuilder<C, O2> {
        RetryExecutorBuilder {
            policy: self.policy,
            classifier: self.classifier,
            observer,
            jitter: self.jitter,
            attempt_timeout: self.attempt_timeout,
        }
    }

    /// Enable or disable jitter on non-zero delays
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Bound the duration of each individual attempt
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Build the executor
    pub fn build(self) -> RetryExecutor<C, O> {
        RetryExecutor {
            policy: self.policy,
            classifier: self.classifier,
            observer: self.observer,
            jitter: self.jitter,
            attempt_timeout: self.attempt_timeout,
        }
    }
}

/// A retry executor with configurable policy, classifier and observer
///
/// Use `RetryExecutorBuilder` to create an instance.
pub struct RetryExecutor<C, O> {
    policy: RetryPolicy,
    classifier: C,
    observer: O,
    jitter: bool,
    attempt_timeout: Option<Duration>,
}

impl<C, O> RetryExecutor<C, O>
where
    C: FailureClassifier,
    O: RetryObserver,
{
    /// Attempt budget; a zero budget still makes one attempt
    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts.max(1)
    }

    /// Execute an operation with retry logic
    ///
    /// The operation may be invoked up to `max_attempts` times and each
    /// invocation can have real-world effects. It must be idempotent or
    /// otherwise safe to resubmit.
    ///
    /// Success returns immediately. An error without a structured part is
    /// returned as `Fatal` without consulting the classifier. A `Stop`
    /// classification returns `Stopped`; a `Retry` classification on the
    /// last attempt returns `Exhausted`.
    pub async fn execute<F, Fut, T, E>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let max_attempts = self.max_attempts();
        let start = Instant::now();
        let mut attempt = 1;

        loop {
            self.observer.on_attempt_start(attempt, max_attempts);

            let result = match self.attempt_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, op()).await {
                    Ok(result) => result,
                    Err(_) => {
                        let err = RetryError::<E>::attempt_timeout(attempt, timeout);
                        self.observer.on_stopped(attempt, &err);
                        return Err(err);
                    }
                },
                None => op().await,
            };

            let err = match result {
                Ok(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(err) => err,
            };

            let decision = err
                .structured()
                .map(|structured| self.classifier.classify(structured));

            match decision {
                None => {
                    self.observer.on_stopped(attempt, &err);
                    return Err(RetryError::fatal(attempt, err));
                }
                Some(RetryDecision::Stop) => {
                    self.observer.on_stopped(attempt, &err);
                    return Err(RetryError::stopped(attempt, err));
                }
                Some(RetryDecision::Retry) if attempt >= max_attempts => {
                    self.observer.on_exhausted(attempt, &err);
                    return Err(RetryError::exhausted(attempt, err, start.elapsed()));
                }
                Some(RetryDecision::Retry) => {
                    let delay = calculate_delay(&self.policy, attempt, self.jitter);
                    self.observer.on_attempt_failed(attempt, &err, delay);

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}
