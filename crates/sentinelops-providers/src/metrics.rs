// crates/sentinelops-providers/src/metrics.rs
// ============================================================================
// Module: In-Memory Metrics Sink
// Description: MetricsSink implementation accumulating counters/gauges/histograms.
// Purpose: Make workflow metrics inspectable without an external TSDB.
// Dependencies: sentinelops_core::interfaces, serde_json, std
// ============================================================================

//! ## Overview
//! `InMemoryMetricsSink` keeps every emitted counter, gauge, and histogram
//! observation in memory, guarded by a mutex. [`InMemoryMetricsSink::snapshot`]
//! renders the current values as JSON for the CLI's metric scrape endpoint.

use std::collections::HashMap;
use std::sync::Mutex;

use sentinelops_core::MetricsSink;
use serde_json::Value;
use serde_json::json;

#[derive(Default)]
struct Inner {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, f64>,
    histograms: HashMap<String, Vec<f64>>,
}

/// Accumulates metrics in memory.
#[derive(Default)]
pub struct InMemoryMetricsSink {
    inner: Mutex<Inner>,
}

impl InMemoryMetricsSink {
    /// Creates an empty metrics sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every counter, gauge, and histogram as a JSON object.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let guard = self.inner.lock().unwrap();
        json!({
            "counters": guard.counters,
            "gauges": guard.gauges,
            "histograms": guard.histograms,
        })
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn incr_counter(&self, name: &str, value: u64) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        *guard.counters.entry(name.to_string()).or_insert(0) += value;
    }

    fn set_gauge(&self, name: &str, value: f64) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        guard.gauges.insert(name.to_string(), value);
    }

    fn observe_histogram(&self, name: &str, value: f64) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        guard.histograms.entry(name.to_string()).or_default().push(value);
    }
}
