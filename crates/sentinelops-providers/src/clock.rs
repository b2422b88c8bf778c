// crates/sentinelops-providers/src/clock.rs
// ============================================================================
// Module: System Clock
// Description: Clock implementation backed by the OS monotonic and wall clocks.
// Purpose: Supply real time to the Workflow Engine outside of tests.
// Dependencies: sentinelops_core::interfaces, std::time, time
// ============================================================================

//! ## Overview
//! `SystemClock` pairs a process-local [`std::time::Instant`] epoch (for
//! monotonic deadline arithmetic) with [`time::OffsetDateTime::now_utc`]
//! (for audit and incident timestamps). The two clocks are never mixed:
//! [`sentinelops_core::Clock::monotonic_millis`] is for durations only and
//! is never comparable across process restarts.

use std::time::Instant;

use sentinelops_core::Clock;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Real-time [`Clock`] implementation.
#[derive(Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a system clock anchored to the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic_millis(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn now_rfc3339(&self) -> String {
        OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    }
}
