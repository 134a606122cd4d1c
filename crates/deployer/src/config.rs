//! Configuration for receipt polling.

use std::time::Duration;

/// How long and how often to poll for a transaction's receipt.
///
/// The timeout has to cover ordinary confirmation latency: a budget that is
/// too short turns a slow confirmation into a hard failure that looks the
/// same as a revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwaiterConfig {
    /// Total wait budget per transaction.
    pub timeout: Duration,

    /// Delay between receipt queries.
    pub poll_interval: Duration,
}

impl Default for AwaiterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl AwaiterConfig {
    /// Set the wait budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
