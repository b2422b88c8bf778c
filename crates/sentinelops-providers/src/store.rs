// crates/sentinelops-providers/src/store.rs
// ============================================================================
// Module: In-Memory Incident Store
// Description: IncidentStore implementation backed by a guarded BTreeMap.
// Purpose: Give the Orchestrator a deterministic store for tests and demos.
// Dependencies: sentinelops_core::{interfaces, identifiers, model}, std
// ============================================================================

//! ## Overview
//! `InMemoryIncidentStore` enforces the same optimistic-concurrency
//! contract a durable backend must: `save` is a compare-and-swap on
//! [`Incident::version`], rejecting a write whose caller-expected prior
//! version does not match what is actually stored.

use std::collections::BTreeMap;
use std::sync::Mutex;

use sentinelops_core::Incident;
use sentinelops_core::IncidentId;
use sentinelops_core::IncidentStore;
use sentinelops_core::StoreError;

/// In-memory incident store for tests, demos, and single-process deployments.
#[derive(Default)]
pub struct InMemoryIncidentStore {
    incidents: Mutex<BTreeMap<String, Incident>>,
}

impl InMemoryIncidentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IncidentStore for InMemoryIncidentStore {
    fn load(&self, id: &IncidentId) -> Result<Option<Incident>, StoreError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let guard = self.incidents.lock().unwrap();
        Ok(guard.get(id.as_str()).cloned())
    }

    fn save(&self, incident: &Incident) -> Result<(), StoreError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.incidents.lock().unwrap();
        let key = incident.id.as_str().to_string();
        let expected_prior = incident.version.saturating_sub(1);
        match guard.get(&key) {
            Some(existing) if existing.version != expected_prior => {
                return Err(StoreError::Precondition {
                    expected: expected_prior,
                    actual: existing.version,
                });
            }
            None if expected_prior != 0 => {
                return Err(StoreError::Precondition {
                    expected: expected_prior,
                    actual: 0,
                });
            }
            _ => {}
        }
        guard.insert(key, incident.clone());
        Ok(())
    }
}
