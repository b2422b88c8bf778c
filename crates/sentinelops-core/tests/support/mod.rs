// crates/sentinelops-core/tests/support/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared mock backends for workflow engine integration tests.
// Purpose: Provide an in-memory store, dispatcher, clock, and metrics sink
//          implementing the public trait boundaries, without pulling in any
//          sibling crate.
// Dependencies: sentinelops_core::interfaces
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    reason = "Test-only helpers; panics surface as test failures."
)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use sentinelops_core::Clock;
use sentinelops_core::DispatchError;
use sentinelops_core::Dispatcher;
use sentinelops_core::Incident;
use sentinelops_core::IncidentId;
use sentinelops_core::IncidentStore;
use sentinelops_core::MetricsSink;
use sentinelops_core::StoreError;

/// In-memory [`IncidentStore`] enforcing the same compare-and-swap
/// precondition a durable backend would.
#[derive(Default)]
pub struct InMemoryStore {
    incidents: Mutex<HashMap<IncidentId, Incident>>,
}

impl IncidentStore for InMemoryStore {
    fn load(&self, id: &IncidentId) -> Result<Option<Incident>, StoreError> {
        Ok(self.incidents.lock().unwrap().get(id).cloned())
    }

    fn save(&self, incident: &Incident) -> Result<(), StoreError> {
        let mut guard = self.incidents.lock().unwrap();
        if let Some(existing) = guard.get(&incident.id) {
            if existing.version + 1 != incident.version {
                return Err(StoreError::Precondition {
                    expected: existing.version + 1,
                    actual: incident.version,
                });
            }
        }
        guard.insert(incident.id.clone(), incident.clone());
        Ok(())
    }
}

/// Loads an incident a test expects to already exist, panicking otherwise.
pub fn load(store: &Arc<InMemoryStore>, id: &IncidentId) -> Incident {
    store.load(id).unwrap().unwrap_or_else(|| panic!("incident {id} not found"))
}

/// Records every published `(topic, payload)` pair for later assertions.
#[derive(Clone, Default)]
pub struct RecordingDispatcher(Arc<Mutex<Vec<(String, Vec<u8>)>>>);

impl RecordingDispatcher {
    /// Returns every topic published so far, in order.
    pub fn published_topics(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(topic, _)| topic.clone()).collect()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DispatchError> {
        self.0.lock().unwrap().push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}

/// A clock frozen at a fixed instant, for deterministic audit timestamps.
#[derive(Clone, Copy, Default)]
pub struct FixedClock;

impl Clock for FixedClock {
    fn monotonic_millis(&self) -> u64 {
        0
    }

    fn now_rfc3339(&self) -> String {
        "2026-01-01T00:00:00Z".to_string()
    }
}

/// Accumulates counter values for assertions, mirroring
/// `sentinelops-providers`' `InMemoryMetricsSink` but local to this test
/// crate so no sibling crate needs to be pulled in as a dev-dependency.
#[derive(Clone, Default)]
pub struct RecordingMetrics(Arc<Mutex<HashMap<String, u64>>>);

impl RecordingMetrics {
    /// Returns the current value of a named counter.
    pub fn counter(&self, name: &str) -> u64 {
        self.0.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

impl MetricsSink for RecordingMetrics {
    fn incr_counter(&self, name: &str, value: u64) {
        *self.0.lock().unwrap().entry(name.to_string()).or_insert(0) += value;
    }

    fn set_gauge(&self, _name: &str, _value: f64) {}

    fn observe_histogram(&self, _name: &str, _value: f64) {}
}
