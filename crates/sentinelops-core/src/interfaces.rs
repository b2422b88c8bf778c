// crates/sentinelops-core/src/interfaces.rs
// ============================================================================
// Module: SentinelOps Backend Interfaces
// Description: Trait boundaries the Orchestrator depends on but does not implement.
// Purpose: Keep sentinelops-core free of any concrete I/O, storage, or transport.
// Dependencies: crate::model, crate::identifiers, thiserror
// ============================================================================

//! ## Overview
//! Every capability sentinelops-core needs from the outside world is a
//! trait here, paired with a `thiserror` error enum. Concrete
//! implementations live in sibling crates (`sentinelops-broker`,
//! `sentinelops-providers`) and are injected into [`crate::workflow::WorkflowEngine`]
//! as generic parameters — no singletons, no global mutable state.

use thiserror::Error;

use crate::identifiers::IncidentId;
use crate::model::Incident;

/// Errors returned by an [`IncidentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller's expected version did not match the stored version
    /// (optimistic-concurrency conflict).
    #[error("precondition failed: expected version {expected}, found {actual}")]
    Precondition {
        /// Version the caller believed was current.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },
    /// The requested incident does not exist.
    #[error("incident not found: {0}")]
    NotFound(IncidentId),
    /// The underlying storage backend failed.
    #[error("store failure: {0}")]
    Backend(String),
}

/// CRUD on incident documents with optimistic concurrency.
///
/// Implementations must treat `save` as a compare-and-swap on
/// [`Incident::version`]: a write with a stale `version` must fail with
/// [`StoreError::Precondition`] rather than silently overwrite.
pub trait IncidentStore: Send + Sync {
    /// Loads an incident by id, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on a backend failure.
    fn load(&self, id: &IncidentId) -> Result<Option<Incident>, StoreError>;

    /// Persists `incident`, failing if its `version` is stale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Precondition`] on a version conflict and
    /// [`StoreError::Backend`] on a backend failure.
    fn save(&self, incident: &Incident) -> Result<(), StoreError>;
}

/// Errors returned by a [`Dispatcher`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route is configured for the given outbound topic.
    #[error("no route for topic: {0}")]
    UnknownTopic(String),
    /// The dispatch itself failed (transport error).
    #[error("dispatch failed: {0}")]
    Failed(String),
}

/// Publish/subscribe access to the Message Bus Adapter (outbound side).
///
/// Implementations must provide at-least-once delivery: a publish that
/// returns `Ok` has been durably handed off to the bus.
pub trait Dispatcher: Send + Sync {
    /// Publishes `payload` (already-serialized JSON bytes) to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the topic is unroutable or the
    /// underlying transport fails.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DispatchError>;
}

impl<T: Dispatcher + ?Sized> Dispatcher for std::sync::Arc<T> {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DispatchError> {
        (**self).publish(topic, payload)
    }
}

impl<T: IncidentStore + ?Sized> IncidentStore for std::sync::Arc<T> {
    fn load(&self, id: &IncidentId) -> Result<Option<Incident>, StoreError> {
        (**self).load(id)
    }

    fn save(&self, incident: &Incident) -> Result<(), StoreError> {
        (**self).save(incident)
    }
}

/// Monotonic time, deadlines, and the current wall-clock instant.
pub trait Clock: Send + Sync {
    /// Returns a monotonically non-decreasing count of milliseconds since
    /// an arbitrary, process-local epoch. Used for timeout and backoff
    /// arithmetic; never exposed to audit payloads directly.
    fn monotonic_millis(&self) -> u64;

    /// Returns the current wall-clock time as an RFC 3339 string, used for
    /// audit timestamps and incident timestamps.
    fn now_rfc3339(&self) -> String;
}

/// Counter/gauge/histogram emission.
///
/// A no-op or in-memory implementation is sufficient for most callers;
/// sentinelops-core only ever calls these three methods.
pub trait MetricsSink: Send + Sync {
    /// Increments a named counter by `value`.
    fn incr_counter(&self, name: &str, value: u64);

    /// Sets a named gauge to `value`.
    fn set_gauge(&self, name: &str, value: f64);

    /// Records one observation into a named histogram.
    fn observe_histogram(&self, name: &str, value: f64);
}
