// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy and the dispatch state machine.
//!
//! A request moves through these states:
//!
//! ```text
//! Attempting ──ok──────────────────────────► Succeeded
//!     │
//!     └─err─► next_step()
//!               ├─ Retry(delay) ─► Waiting ─► Attempting (attempt + 1)
//!               ├─ Queue ──────────────────► Queued   (mutating only)
//!               ├─ InvalidateSession ──────► Failed   (SessionExpired)
//!               └─ Fail ───────────────────► Failed
//! ```
//!
//! Backoff is linear: the delay before attempt `n + 1` is `base_delay * n`,
//! capped at `max_delay`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Failure classes the retry logic distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Timeout, refused connection, DNS failure, or no network at all.
    Transient,
    /// 5xx response.
    ServerError,
    /// 4xx response other than 401.
    ClientError,
    /// 401 response.
    Unauthorized,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorClass::Transient | ErrorClass::ServerError)
    }
}

/// Classifies an HTTP status code. Returns `None` for 2xx.
pub fn classify_status(status: u16) -> Option<ErrorClass> {
    match status {
        200..=299 => None,
        401 => Some(ErrorClass::Unauthorized),
        500..=599 => Some(ErrorClass::ServerError),
        // 4xx and anything unexpected (unfollowed redirects, 1xx) cannot
        // succeed on a retry.
        _ => Some(ErrorClass::ClientError),
    }
}

/// Result of consulting the policy after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub retry: bool,
    pub delay: Duration,
}

impl Decision {
    fn stop() -> Self {
        Decision {
            retry: false,
            delay: Duration::ZERO,
        }
    }
}

/// Bounded linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay unit; attempt `n` waits `base_delay * n` before the next try.
    pub base_delay: Duration,
    /// Ceiling applied to every computed delay.
    pub max_delay: Duration,
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        RetryPolicy {
            base_delay,
            max_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns a copy with a different attempt budget.
    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            ..self
        }
    }

    /// Delay inserted after the given (1-based) attempt failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt).min(self.max_delay)
    }

    /// Decides whether the failed attempt `attempt` (1-based) is retried.
    pub fn decide(&self, attempt: u32, class: ErrorClass) -> Decision {
        if !class.is_retryable() || attempt >= self.max_attempts {
            return Decision::stop();
        }
        Decision {
            retry: true,
            delay: self.delay_for(attempt),
        }
    }
}

/// What the dispatcher does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Wait, then attempt again.
    Retry(Duration),
    /// Capture the write in the offline queue and report it as queued.
    Queue,
    /// Run session invalidation, then fail with `SessionExpired`.
    InvalidateSession,
    /// Surface the error to the caller.
    Fail,
}

/// The single decision point of the retry loop.
///
/// `online` is the monitor's view at the time of the failure. Offline always
/// ends the loop: mutating requests are queued, reads fail. Transient
/// failures that exhaust their attempts while online are queued as well;
/// exhausted server errors are surfaced because the server did answer.
pub fn next_step(
    policy: &RetryPolicy,
    attempt: u32,
    class: ErrorClass,
    online: bool,
    mutating: bool,
) -> Step {
    match class {
        ErrorClass::Unauthorized => Step::InvalidateSession,
        ErrorClass::ClientError => Step::Fail,
        ErrorClass::Transient | ErrorClass::ServerError => {
            if !online {
                return if mutating { Step::Queue } else { Step::Fail };
            }
            let decision = policy.decide(attempt, class);
            if decision.retry {
                Step::Retry(decision.delay)
            } else if mutating && class == ErrorClass::Transient {
                Step::Queue
            } else {
                Step::Fail
            }
        }
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
