// crates/sentinelops-broker/src/log.rs
// ============================================================================
// Module: SentinelOps Log Dispatcher
// Description: Dispatcher that records publishes without delivering them.
// Purpose: Serve as the dead-letter sink and as a Dispatcher for tests/CLI.
// Dependencies: sentinelops_core::interfaces, serde_json, std
// ============================================================================

//! ## Overview
//! `LogDispatcher` writes one JSON line per publish and always succeeds. It
//! delivers nothing further, which makes it a fitting home for the
//! `dead_letter` topic: the record itself is the durable artifact.

use std::io::Write;
use std::sync::Mutex;

use sentinelops_core::DispatchError;
use sentinelops_core::Dispatcher;
use serde_json::json;

/// Dispatcher that logs every publish as a line of JSON.
pub struct LogDispatcher<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LogDispatcher<W> {
    /// Creates a log dispatcher writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> Dispatcher for LogDispatcher<W> {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DispatchError> {
        let record = json!({
            "topic": topic,
            "payload_len": payload.len(),
            "payload": String::from_utf8_lossy(payload),
        });
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.writer.lock().unwrap();
        serde_json::to_writer(&mut *guard, &record).map_err(|err| DispatchError::Failed(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| DispatchError::Failed(err.to_string()))?;
        Ok(())
    }
}
