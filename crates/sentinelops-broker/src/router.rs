// crates/sentinelops-broker/src/router.rs
// ============================================================================
// Module: SentinelOps Inbound Dispatcher
// Description: Schema-validates inbound bus messages and hands them to the
//              Workflow Engine, dead-lettering or dropping the rest.
// Purpose: Validate and route every inbound topic message exactly once.
// Dependencies: crate::{bus, schema}, sentinelops_core, tracing
// ============================================================================

//! ## Overview
//! [`InboundRouter`] subscribes to the seven inbound topics, validates each
//! message against [`crate::schema`], and routes it to
//! [`sentinelops_core::WorkflowEngine::on_inbound_message`]. A message that
//! fails schema validation never reaches the engine: malformed payloads are
//! recorded to the audit log and dropped, while structurally valid
//! payloads on a topic this Orchestrator does not recognize are recorded
//! and dead-lettered.

use std::sync::Arc;

use sentinelops_core::Clock;
use sentinelops_core::Dispatcher;
use sentinelops_core::IncidentId;
use sentinelops_core::IncidentStore;
use sentinelops_core::MetricsSink;
use sentinelops_core::WorkflowEngine;
use sentinelops_core::WorkflowError;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing::warn;

use crate::bus::BusMessage;
use crate::bus::InProcessBus;
use crate::schema::Decoded;
use crate::schema::SchemaError;
use crate::schema::decode;

/// Inbound topics the Orchestrator subscribes to.
pub const INBOUND_TOPICS: [&str; 7] = [
    "new_incident",
    "analysis_complete",
    "remediation_proposed",
    "remediation_complete",
    "approval_decision",
    "notification_ack",
    "control",
];

/// Validates and routes one inbound bus message at a time.
pub struct InboundRouter<Store, Disp, Clk, Metrics> {
    engine: Arc<WorkflowEngine<Store, Disp, Clk, Metrics>>,
    dead_letter: Arc<InProcessBus>,
    clock: Clk,
}

impl<Store, Disp, Clk, Metrics> InboundRouter<Store, Disp, Clk, Metrics>
where
    Store: IncidentStore,
    Disp: Dispatcher,
    Clk: Clock + Clone,
    Metrics: MetricsSink,
{
    /// Creates a router delivering to `engine` and dead-lettering onto
    /// `dead_letter`'s `dead_letter` topic.
    #[must_use]
    pub fn new(engine: Arc<WorkflowEngine<Store, Disp, Clk, Metrics>>, dead_letter: Arc<InProcessBus>, clock: Clk) -> Self {
        Self {
            engine,
            dead_letter,
            clock,
        }
    }

    /// Processes one bus message, classifying and handling schema
    /// failures in place.
    ///
    /// # Errors
    ///
    /// Returns the [`WorkflowError`] produced by a successfully decoded
    /// message's delivery to the Workflow Engine. Schema failures never
    /// error from this function: they are audited and terminated here.
    pub fn handle(&self, message: &BusMessage) -> Result<(), WorkflowError> {
        match decode(&message.topic, &message.payload) {
            Ok(Decoded::Trigger {
                message_id,
                incident_id,
                message: trigger,
            }) => self.engine.on_inbound_message(message_id, incident_id, *trigger),
            Ok(Decoded::Control {
                message_id,
                incident_id,
                payload,
            }) => {
                info!(%message_id, incident_id = ?incident_id, "control message received, no trigger produced");
                self.record(incident_id, "control_message_received", &payload);
                Ok(())
            }
            Err(SchemaError::Malformed {
                topic,
                reason,
            }) => {
                warn!(%topic, %reason, "inbound payload failed schema validation, dropped");
                self.record(None, "schema_validation_failed", &json!({"topic": topic, "reason": reason}));
                Ok(())
            }
            Err(SchemaError::UnknownTopic(topic)) => {
                warn!(%topic, "inbound message on unrecognized topic, dead-lettered");
                let record = json!({
                    "original_topic": topic,
                    "reason": "unrecognized_topic",
                    "raw": String::from_utf8_lossy(&message.payload),
                });
                self.record(None, "dead_lettered", &record);
                if let Ok(bytes) = serde_json::to_vec(&record) {
                    drop(self.dead_letter.publish("dead_letter", &bytes));
                }
                Ok(())
            }
        }
    }

    fn record<T: Serialize>(&self, incident_id: Option<IncidentId>, event_type: &str, payload: &T) {
        let timestamp = self.clock.now_rfc3339();
        let mut audit = self.engine.audit();
        drop(audit.record(incident_id, "dispatcher", event_type, payload, timestamp));
    }
}
