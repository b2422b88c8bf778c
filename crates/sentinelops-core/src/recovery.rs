// crates/sentinelops-core/src/recovery.rs
// ============================================================================
// Module: SentinelOps Recovery Policy
// Description: Maps (error kind, retry count) to a recovery action.
// Purpose: Decide retry/backoff/escalate/ignore without scattering the logic.
// Dependencies: none beyond std
// ============================================================================

//! ## Overview
//! See the error taxonomy documented alongside it. [`RecoveryPolicy`] is a
//! pure function of `(ErrorKind, attempt)`; it holds no mutable state of its
//! own. Backoff is exponential with a configurable cap.

use std::time::Duration;

/// Coarse classification of an error encountered while driving a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A retryable failure: network blip, rate limit, dependency timeout.
    Transient,
    /// The incoming message or incident data failed validation.
    Validation,
    /// A configured timer elapsed.
    Timeout,
    /// An optimistic-concurrency write conflict.
    Precondition,
    /// The dependency's circuit breaker is open.
    CircuitOpen,
    /// A non-retryable, terminal failure.
    Unrecoverable,
}

/// What the workflow engine should do in response to an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryAction {
    /// Retry after the given backoff.
    RetryAfter(Duration),
    /// Stop retrying and fail the incident's workflow.
    Escalate,
    /// The error does not affect the workflow; continue as if it did not occur.
    Ignore,
}

/// Retry/backoff/escalate policy, parameterized by configuration.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryPolicy {
    /// Maximum number of retry attempts for `Transient` errors before
    /// escalating.
    pub max_retries: u32,
    /// Base backoff duration; doubles per attempt up to `max_backoff`.
    pub base_backoff: Duration,
    /// Ceiling on the computed backoff duration.
    pub max_backoff: Duration,
}

impl RecoveryPolicy {
    /// Creates a policy with the given bounds.
    #[must_use]
    pub const fn new(max_retries: u32, base_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
            max_backoff,
        }
    }

    /// Decides the recovery action for an error of `kind` on retry attempt
    /// number `attempt` (1-indexed: the first retry is `attempt == 1`).
    #[must_use]
    pub fn decide(&self, kind: ErrorKind, attempt: u32) -> RecoveryAction {
        match kind {
            ErrorKind::Transient => {
                if attempt > self.max_retries {
                    RecoveryAction::Escalate
                } else {
                    RecoveryAction::RetryAfter(self.backoff_for(attempt))
                }
            }
            // Escalates after three consecutive defers rather than retrying
            // forever: an open circuit that stays open isn't transient.
            ErrorKind::CircuitOpen => {
                if attempt > 3 {
                    RecoveryAction::Escalate
                } else {
                    RecoveryAction::RetryAfter(self.max_backoff)
                }
            }
            ErrorKind::Precondition => {
                if attempt > self.max_retries {
                    RecoveryAction::Escalate
                } else {
                    RecoveryAction::RetryAfter(Duration::from_millis(0))
                }
            }
            ErrorKind::Validation | ErrorKind::Timeout | ErrorKind::Unrecoverable => {
                RecoveryAction::Escalate
            }
        }
    }

    /// Exponential backoff for `attempt`, capped at `max_backoff`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let multiplier = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.base_backoff.saturating_mul(multiplier).min(self.max_backoff)
    }
}
