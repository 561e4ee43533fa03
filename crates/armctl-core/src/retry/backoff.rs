//! Delay calculation between retry attempts

use crate::types::{RetryPolicy, RetryStrategy};
use rand::Rng;
use std::time::Duration;

/// Calculate the delay before the next retry attempt
///
/// # Arguments
///
/// * `policy` - The retry policy containing strategy and timing parameters
/// * `attempt` - The attempt that just failed (1-indexed)
/// * `jitter` - Whether to apply random jitter to the delay
///
/// # Example
///
/// ```rust
/// use armctl_core::retry::calculate_delay;
/// use armctl_core::types::{RetryPolicy, RetryStrategy};
///
/// let policy = RetryPolicy {
///     max_attempts: 3,
///     strategy: RetryStrategy::ExponentialBackoff,
///     backoff_multiplier: 2.0,
///     initial_delay_ms: 1000,
///     max_delay_ms: 30000,
/// };
///
/// assert_eq!(calculate_delay(&policy, 1, false).as_millis(), 1000);
/// assert_eq!(calculate_delay(&policy, 2, false).as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32, jitter: bool) -> Duration {
    let attempt_index = attempt.saturating_sub(1);

    let base_delay_ms = match policy.strategy {
        RetryStrategy::None => 0,

        RetryStrategy::FixedDelay => policy.initial_delay_ms,

        RetryStrategy::ExponentialBackoff => {
            let multiplier = policy.backoff_multiplier.powf(attempt_index as f64);
            (policy.initial_delay_ms as f64 * multiplier) as u64
        }

        RetryStrategy::LinearBackoff => policy
            .initial_delay_ms
            .saturating_mul(attempt_index as u64 + 1),
    };

    let capped_delay_ms = base_delay_ms.min(policy.max_delay_ms);

    // Up to 25% on top of the capped delay
    let final_delay_ms = if jitter && capped_delay_ms > 0 {
        let jitter_range = capped_delay_ms / 4;
        capped_delay_ms + rand::rng().random_range(0..=jitter_range)
    } else {
        capped_delay_ms
    };

    Duration::from_millis(final_delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(strategy: RetryStrategy) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            strategy,
            backoff_multiplier: 2.0,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
        }
    }

    #[test]
    fn test_none_strategy() {
        let policy = policy(RetryStrategy::None);
        for attempt in 1..=5 {
            assert_eq!(calculate_delay(&policy, attempt, false), Duration::ZERO);
            assert_eq!(calculate_delay(&policy, attempt, true), Duration::ZERO);
        }
    }

    #[test]
    fn test_fixed_strategy() {
        let policy = policy(RetryStrategy::FixedDelay);
        assert_eq!(calculate_delay(&policy, 1, false), Duration::from_millis(1000));
        assert_eq!(calculate_delay(&policy, 3, false), Duration::from_millis(1000));
    }

    #[test]
    fn test_exponential_strategy() {
        let policy = policy(RetryStrategy::ExponentialBackoff);
        assert_eq!(calculate_delay(&policy, 1, false), Duration::from_millis(1000));
        assert_eq!(calculate_delay(&policy, 2, false), Duration::from_millis(2000));
        assert_eq!(calculate_delay(&policy, 3, false), Duration::from_millis(4000));
        assert_eq!(calculate_delay(&policy, 5, false), Duration::from_millis(16000));
    }

    #[test]
    fn test_linear_strategy() {
        let policy = policy(RetryStrategy::LinearBackoff);
        assert_eq!(calculate_delay(&policy, 1, false), Duration::from_millis(1000));
        assert_eq!(calculate_delay(&policy, 2, false), Duration::from_millis(2000));
        assert_eq!(calculate_delay(&policy, 3, false), Duration::from_millis(3000));
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = RetryPolicy {
            max_delay_ms: 5000,
            ..policy(RetryStrategy::ExponentialBackoff)
        };
        assert_eq!(calculate_delay(&policy, 5, false), Duration::from_millis(5000));
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = policy(RetryStrategy::FixedDelay);
        for _ in 0..100 {
            let delay = calculate_delay(&policy, 1, true);
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(1250));
        }
    }
}
