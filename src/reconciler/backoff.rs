//! # Fibonacci Backoff
//!
//! Progressive retry delay that grows more slowly than exponential backoff,
//! used between attempts to create a notifier while an organization's
//! alerting subsystem is still starting.
//!
//! Sequence with the defaults: 500ms, 500ms, 1s, 1.5s, 2.5s, 4s, 6.5s, 10s (max).
//!
//! ## Usage
//!
//! ```rust
//! use alerting_provisioner::reconciler::backoff::FibonacciBackoff;
//! use std::time::Duration;
//!
//! let mut backoff = FibonacciBackoff::new(Duration::from_millis(500), Duration::from_secs(10));
//! assert_eq!(backoff.next_backoff_millis(), 500);
//! assert_eq!(backoff.next_backoff_millis(), 500);
//! assert_eq!(backoff.next_backoff_millis(), 1000);
//! assert_eq!(backoff.next_backoff_millis(), 1500);
//! ```

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, capped at the maximum.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    prev_millis: u64,
    current_millis: u64,
    max_millis: u64,
}

impl FibonacciBackoff {
    /// Create a backoff starting at `min` and capped at `max`
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let min_millis = duration_millis(min).max(1);
        Self {
            prev_millis: 0,
            current_millis: min_millis,
            max_millis: duration_millis(max).max(min_millis),
        }
    }

    /// Get the next delay in milliseconds and advance the sequence
    pub fn next_backoff_millis(&mut self) -> u64 {
        let result = self.current_millis;

        let next = self.prev_millis.saturating_add(self.current_millis);
        self.prev_millis = self.current_millis;
        self.current_millis = std::cmp::min(next, self.max_millis);

        result
    }

    /// Get the next delay as a `Duration` and advance the sequence
    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_millis(self.next_backoff_millis())
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
