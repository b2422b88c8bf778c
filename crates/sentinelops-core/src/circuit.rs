// crates/sentinelops-core/src/circuit.rs
// ============================================================================
// Module: SentinelOps Circuit Breaker
// Description: Per-dependency CLOSED/OPEN/HALF_OPEN breaker with rolling window.
// Purpose: Stop hammering a failing dependency and probe it back into service.
// Dependencies: crate::interfaces::Clock, std::sync::Mutex
// ============================================================================

//! ## Overview
//! One breaker guards one named dependency (analysis agent, remediation
//! agent, communication channel, store, bus — see
//! [`crate::identifiers::DependencyName`]). Failure counting uses a fixed
//! rolling window of recent outcomes; cooldown doubles on every repeated
//! trip, capped.

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

use crate::interfaces::Clock;

/// Observable state of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through; failures are being counted.
    Closed,
    /// Calls are rejected outright until the cooldown elapses.
    Open,
    /// One probe call is allowed through to test recovery.
    HalfOpen,
}

/// Error returned when a call is rejected by an open breaker.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("circuit is open; retry after cooldown")]
pub struct CircuitError;

struct Inner {
    state: CircuitState,
    window: VecDeque<bool>,
    opened_at_millis: u64,
    cooldown_millis: u64,
    consecutive_trips: u32,
}

/// A single dependency's circuit breaker.
///
/// # Invariants
/// - `window` never holds more than `window_size` outcomes.
/// - Cooldown doubles each time the breaker re-opens from `HalfOpen`,
///   capped at `max_cooldown_millis`.
pub struct CircuitBreaker {
    window_size: usize,
    failure_threshold: usize,
    base_cooldown_millis: u64,
    max_cooldown_millis: u64,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker with the given thresholds.
    #[must_use]
    pub fn new(
        window_size: usize,
        failure_threshold: usize,
        base_cooldown_millis: u64,
        max_cooldown_millis: u64,
    ) -> Self {
        Self {
            window_size: window_size.max(1),
            failure_threshold,
            base_cooldown_millis,
            max_cooldown_millis,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                window: VecDeque::with_capacity(window_size),
                opened_at_millis: 0,
                cooldown_millis: base_cooldown_millis,
                consecutive_trips: 0,
            }),
        }
    }

    /// Returns the current state, first resolving an elapsed cooldown into
    /// `HalfOpen`.
    #[must_use]
    pub fn state(&self, clock: &dyn Clock) -> CircuitState {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        self.resolve_cooldown(&mut guard, clock);
        guard.state
    }

    /// Call before attempting the guarded operation. Returns an error if the
    /// breaker is open and its cooldown has not yet elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitError`] while the breaker is open.
    pub fn before_call(&self, clock: &dyn Clock) -> Result<(), CircuitError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        self.resolve_cooldown(&mut guard, clock);
        if guard.state == CircuitState::Open {
            return Err(CircuitError);
        }
        Ok(())
    }

    /// Records the outcome of a guarded call.
    pub fn record(&self, success: bool, clock: &dyn Clock) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        self.resolve_cooldown(&mut guard, clock);

        if guard.state == CircuitState::HalfOpen {
            if success {
                guard.state = CircuitState::Closed;
                guard.window.clear();
                guard.consecutive_trips = 0;
                guard.cooldown_millis = self.base_cooldown_millis;
            } else {
                self.trip(&mut guard, clock);
            }
            return;
        }

        if guard.window.len() == self.window_size {
            guard.window.pop_front();
        }
        guard.window.push_back(success);

        let failures = guard.window.iter().filter(|ok| !**ok).count();
        if failures >= self.failure_threshold {
            self.trip(&mut guard, clock);
        }
    }

    /// Moves a `Closed`/`HalfOpen` breaker into `Open`, scheduling its
    /// cooldown and doubling it if this is a repeated trip.
    fn trip(&self, guard: &mut Inner, clock: &dyn Clock) {
        guard.consecutive_trips = guard.consecutive_trips.saturating_add(1);
        let doubled = guard
            .cooldown_millis
            .checked_shl(guard.consecutive_trips.saturating_sub(1).min(31))
            .unwrap_or(u64::MAX);
        guard.cooldown_millis = doubled.min(self.max_cooldown_millis).max(self.base_cooldown_millis);
        guard.state = CircuitState::Open;
        guard.opened_at_millis = clock.monotonic_millis();
        guard.window.clear();
    }

    /// Transitions `Open` to `HalfOpen` once the cooldown has elapsed.
    fn resolve_cooldown(&self, guard: &mut Inner, clock: &dyn Clock) {
        if guard.state == CircuitState::Open
            && clock.monotonic_millis().saturating_sub(guard.opened_at_millis) >= guard.cooldown_millis
        {
            guard.state = CircuitState::HalfOpen;
        }
    }
}
