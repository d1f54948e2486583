//! Receive-failure policy for the event loop.

use std::time::Duration;

/// How many consecutive receive failures the loop tolerates, and how long it
/// waits before receiving again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` means keep waiting forever.
    pub max_consecutive_failures: Option<usize>,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Never gives up and never waits between attempts.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_consecutive_failures: None,
            backoff: Duration::ZERO,
        }
    }

    /// Tolerates `max` consecutive failures, then gives up on the next.
    #[must_use]
    pub fn bounded(max: usize) -> Self {
        Self {
            max_consecutive_failures: Some(max),
            backoff: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay to apply after the `failures`-th consecutive failure (1-based),
    /// or `None` once the budget is spent.
    #[must_use]
    pub fn delay_for_failure(&self, failures: usize) -> Option<Duration> {
        match self.max_consecutive_failures {
            Some(max) if failures > max => None,
            _ => Some(self.backoff),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}
