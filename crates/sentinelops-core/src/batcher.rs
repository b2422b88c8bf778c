// crates/sentinelops-core/src/batcher.rs
// ============================================================================
// Module: SentinelOps Write Batcher
// Description: Coalesces store writes by size or time window, with a durability barrier.
// Purpose: Bound write amplification under load without losing the ability to force-flush.
// Dependencies: crate::interfaces::{Clock, IncidentStore}, std::sync::Mutex
// ============================================================================

//! ## Overview
//! Buffers pending incident writes and flushes when either the batch
//! reaches `max_batch_size` or `max_window_millis` has elapsed since the
//! oldest pending write. [`WriteBatcher::flush_now`] is the durability
//! barrier: callers on a path that must observe a write (e.g. before
//! replying to an approval) call it explicitly rather than waiting on the
//! window.

use std::sync::Mutex;

use crate::interfaces::Clock;
use crate::interfaces::IncidentStore;
use crate::interfaces::StoreError;
use crate::model::Incident;

struct Inner {
    pending: Vec<Incident>,
    oldest_pending_millis: Option<u64>,
}

/// Batches [`Incident`] writes against an [`IncidentStore`].
pub struct WriteBatcher<'a> {
    store: &'a dyn IncidentStore,
    max_batch_size: usize,
    max_window_millis: u64,
    inner: Mutex<Inner>,
}

impl<'a> WriteBatcher<'a> {
    /// Creates a batcher writing through to `store`.
    #[must_use]
    pub fn new(store: &'a dyn IncidentStore, max_batch_size: usize, max_window_millis: u64) -> Self {
        Self {
            store,
            max_batch_size: max_batch_size.max(1),
            max_window_millis,
            inner: Mutex::new(Inner {
                pending: Vec::new(),
                oldest_pending_millis: None,
            }),
        }
    }

    /// Enqueues `incident`, flushing immediately if the batch is full or
    /// the window has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a triggered flush fails; `incident` remains
    /// enqueued in that case so a later retry can include it.
    pub fn enqueue(&self, incident: Incident, clock: &dyn Clock) -> Result<(), StoreError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        let now = clock.monotonic_millis();
        if guard.oldest_pending_millis.is_none() {
            guard.oldest_pending_millis = Some(now);
        }
        guard.pending.push(incident);

        let window_elapsed = guard
            .oldest_pending_millis
            .is_some_and(|oldest| now.saturating_sub(oldest) >= self.max_window_millis);

        if guard.pending.len() >= self.max_batch_size || window_elapsed {
            return Self::drain(self.store, &mut guard);
        }
        Ok(())
    }

    /// Forces an immediate flush of all pending writes: the durability
    /// barrier. After this returns `Ok`, every previously enqueued incident
    /// has been persisted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] from the first failing write; incidents after
    /// the failure remain pending.
    pub fn flush_now(&self) -> Result<(), StoreError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        Self::drain(self.store, &mut guard)
    }

    /// Number of writes currently buffered, not yet persisted.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        self.inner.lock().unwrap().pending.len()
    }

    fn drain(store: &dyn IncidentStore, guard: &mut Inner) -> Result<(), StoreError> {
        while let Some(incident) = guard.pending.first() {
            store.save(incident)?;
            guard.pending.remove(0);
        }
        guard.oldest_pending_millis = None;
        Ok(())
    }
}
