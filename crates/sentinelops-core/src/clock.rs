// crates/sentinelops-core/src/clock.rs
// ============================================================================
// Module: SentinelOps Clock & Timer Service
// Description: Deadline arithmetic built on top of the injected Clock trait.
// Purpose: Let the workflow engine reason about timeouts without owning a clock.
// Dependencies: crate::interfaces::Clock
// ============================================================================

//! ## Overview
//! [`crate::interfaces::Clock`] is the injected time source. [`Deadline`]
//! is a small value type built from it, used to schedule and check
//! workflow timeouts (analysis, remediation, approval, closure, hard
//! incident timeout).

pub use crate::interfaces::Clock;

/// A point in monotonic time by which something must happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at_millis: u64,
}

impl Deadline {
    /// Computes a deadline `timeout_secs` seconds after `clock`'s current
    /// monotonic time.
    #[must_use]
    pub fn after_secs(clock: &dyn Clock, timeout_secs: u64) -> Self {
        Self {
            at_millis: clock.monotonic_millis().saturating_add(timeout_secs.saturating_mul(1000)),
        }
    }

    /// Returns true if `clock`'s current monotonic time is at or past this
    /// deadline.
    #[must_use]
    pub fn has_elapsed(self, clock: &dyn Clock) -> bool {
        clock.monotonic_millis() >= self.at_millis
    }

    /// Milliseconds remaining until this deadline, or zero if already past.
    #[must_use]
    pub fn remaining_millis(self, clock: &dyn Clock) -> u64 {
        self.at_millis.saturating_sub(clock.monotonic_millis())
    }
}
