// crates/sentinelops-core/src/admission.rs
// ============================================================================
// Module: SentinelOps Admission Control
// Description: Global concurrency cap plus a bounded FIFO backlog.
// Purpose: Bound how many incidents the Orchestrator drives at once.
// Dependencies: crate::{identifiers::IncidentId, model::Incident}, std::sync::Mutex, thiserror
// ============================================================================

//! ## Overview
//! New incidents either start immediately (under `max_concurrent`), queue
//! (under `max_queue_size`), or are rejected and dead-lettered. See
//! the Admission Control section of the configuration reference.
//!
//! The backlog holds the full queued [`Incident`], not just its id: a
//! restart or a promotion out of the backlog must be able to resume the
//! incident without re-deriving it from a detection message it may no
//! longer have.

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

use crate::identifiers::IncidentId;
use crate::model::Incident;

/// Errors admission control can produce.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The backlog is already at `max_queue_size`; the incident is
    /// dead-lettered rather than accepted.
    #[error("admission queue is full (capacity {capacity}); incident {incident_id} dead-lettered")]
    QueueFull {
        /// Configured backlog capacity.
        capacity: usize,
        /// The incident that was rejected.
        incident_id: IncidentId,
    },
}

struct Inner {
    in_flight: usize,
    backlog: VecDeque<Incident>,
}

/// Bounds concurrent in-flight incidents and queues the overflow.
pub struct Admission {
    max_concurrent: usize,
    max_queue_size: usize,
    inner: Mutex<Inner>,
}

impl Admission {
    /// Creates an admission controller with the given limits.
    #[must_use]
    pub fn new(max_concurrent: usize, max_queue_size: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            max_queue_size,
            inner: Mutex::new(Inner {
                in_flight: 0,
                backlog: VecDeque::new(),
            }),
        }
    }

    /// Requests admission for `incident`. Returns `true` if the incident
    /// may start immediately, `false` if it was queued (the caller must
    /// persist it but must not yet drive it through the state machine).
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::QueueFull`] if the backlog is already at
    /// capacity; the caller must dead-letter the incident.
    pub fn admit(&self, incident: Incident) -> Result<bool, AdmissionError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        if guard.in_flight < self.max_concurrent {
            guard.in_flight += 1;
            return Ok(true);
        }
        if guard.backlog.len() >= self.max_queue_size {
            return Err(AdmissionError::QueueFull {
                capacity: self.max_queue_size,
                incident_id: incident.id,
            });
        }
        guard.backlog.push_back(incident);
        Ok(false)
    }

    /// Signals that an in-flight incident has reached a terminal state,
    /// freeing a concurrency slot. Returns the next queued incident, if
    /// any, which the caller must now start (it is still in
    /// [`WorkflowState::INITIALIZED`](crate::model::WorkflowState::INITIALIZED)).
    #[must_use]
    pub fn release(&self) -> Option<Incident> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        if let Some(next) = guard.backlog.pop_front() {
            Some(next)
        } else {
            guard.in_flight = guard.in_flight.saturating_sub(1);
            None
        }
    }

    /// Number of incidents currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        self.inner.lock().unwrap().in_flight
    }

    /// Number of incidents currently queued.
    #[must_use]
    pub fn queued(&self) -> usize {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        self.inner.lock().unwrap().backlog.len()
    }
}
