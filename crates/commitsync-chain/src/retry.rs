//! Retry state for the block subscription.

use std::time::Duration;

/// Consecutive failures and the fixed delay before the next attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
    backoff: Duration,
}

impl RetryState {
    pub fn new(backoff: Duration) -> Self {
        Self {
            attempts: 0,
            backoff,
        }
    }

    /// Consecutive failures since the last success.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Record a failure and return how long to wait before retrying.
    pub fn record_failure(&mut self) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        self.backoff
    }

    /// Clear the failure count after a success.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
