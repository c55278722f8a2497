//! # Bounded Retry
//!
//! Retries an operation on transient failures until a wall-clock budget is
//! spent, sleeping with Fibonacci backoff between attempts. Every wait is
//! raced against a cancellation token.

use crate::observability::metrics;
use crate::reconciler::backoff::FibonacciBackoff;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub budget: Duration,
    pub backoff_start: Duration,
    pub backoff_max: Duration,
}

#[derive(Debug)]
pub enum RetryError<E> {
    /// A non-transient failure; never retried
    Fatal(E),
    /// Still failing when the budget ran out
    Exhausted {
        attempts: u32,
        elapsed: Duration,
        last: E,
    },
    Cancelled,
}

/// Run `attempt` until it succeeds, fails with a non-transient error, the
/// budget is spent or `cancel` fires.
///
/// # Errors
/// See [`RetryError`]
pub async fn retry_within_budget<T, E, F, Fut>(
    policy: RetryPolicy,
    cancel: &CancellationToken,
    what: &str,
    is_transient: impl Fn(&E) -> bool,
    mut attempt: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let deadline = started + policy.budget;
    let mut backoff = FibonacciBackoff::new(policy.backoff_start, policy.backoff_max);
    let mut attempts = 0_u32;

    loop {
        attempts += 1;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetryError::Cancelled),
            result = attempt() => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) if !is_transient(&err) => return Err(RetryError::Fatal(err)),
            Err(err) => err,
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(RetryError::Exhausted {
                attempts,
                elapsed: now - started,
                last: err,
            });
        }

        let delay = backoff.next_backoff().min(deadline - now);
        warn!(
            "{} failed with a transient error (attempt {}), retrying in {:?}: {}",
            what, attempts, delay, err
        );
        metrics::increment_create_retries();

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetryError::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
}
