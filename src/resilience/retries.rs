//! Retry logic.
//!
//! # Responsibilities
//! - Describe how often and how long to retry an operation
//! - Drive an async operation until it succeeds or the attempt bound is hit
//!
//! # Design Decisions
//! - Constant delay, no jitter: a single caller retrying one dependency
//!   has no thundering herd to avoid
//! - The delay is only slept *between* attempts, never after the last one
//! - No cancellation of an attempt in flight; the bound is the only exit

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` attempts, `delay` apart.
    ///
    /// A bound of zero is treated as one attempt.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on time spent sleeping if every attempt fails.
    pub fn total_delay(&self) -> Duration {
        self.delay * (self.max_attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(30, Duration::from_secs(1))
    }
}

/// Outcome of a successful retried operation.
#[derive(Debug)]
pub struct Succeeded<T> {
    pub value: T,
    /// 1-based attempt on which the operation succeeded.
    pub attempts: u32,
}

/// Returned when every attempt failed.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Error from the final attempt.
    pub last_error: E,
    pub attempts: u32,
}

/// Run `op` until it succeeds or `policy` runs out of attempts.
///
/// `op` receives the 1-based attempt number. `what` names the operation in
/// log output.
pub async fn retry_fixed<T, E, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<Succeeded<T>, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = what, attempt, "Succeeded after retrying");
                }
                return Ok(Succeeded { value, attempts: attempt });
            }
            Err(e) if attempt >= policy.max_attempts => {
                tracing::error!(
                    operation = what,
                    attempts = attempt,
                    error = %e,
                    "Giving up, retry attempts exhausted"
                );
                return Err(Exhausted {
                    last_error: e,
                    attempts: attempt,
                });
            }
            Err(e) => {
                tracing::warn!(
                    operation = what,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay = ?policy.delay,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
