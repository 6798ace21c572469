//! Dial retry policy.
//!
//! # Responsibilities
//! - Decide how long a failed dial is cached before the next call redials
//! - Bound the number of consecutive failed dials
//!
//! # Design Decisions
//! - No retries inside a single routing decision; the caller gets the error immediately
//! - `max_attempts = 1` means a failed dial is never retried until restart

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Bounded exponential-backoff policy for backend dials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialRetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl DialRetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A policy that gives up after the first failure.
    pub fn never() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// True once `failures` consecutive dials have failed.
    pub fn is_exhausted(&self, failures: u32) -> bool {
        failures >= self.max_attempts
    }

    /// How long to wait after the `failures`-th consecutive failure before redialing.
    ///
    /// Doubles from `base_delay` per failure, capped at `max_delay`, plus up
    /// to 10% jitter. No failures means no wait.
    pub fn next_delay(&self, failures: u32) -> Duration {
        let Some(doublings) = failures.checked_sub(1) else {
            return Duration::ZERO;
        };
        let factor = 2u32.checked_pow(doublings).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);

        let spread = delay / 10;
        if spread.is_zero() {
            return delay;
        }
        delay + rand::thread_rng().gen_range(Duration::ZERO..spread)
    }
}

impl Default for DialRetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for DialRetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}
