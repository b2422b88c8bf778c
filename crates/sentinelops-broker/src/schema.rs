// crates/sentinelops-broker/src/schema.rs
// ============================================================================
// Module: SentinelOps Inbound Schemas
// Description: Wire shapes for each inbound topic and the decode entry point.
// Purpose: Validate inbound payloads before they become Workflow Engine calls.
// Dependencies: sentinelops_core::{model, identifiers, workflow}, serde_json
// ============================================================================

//! ## Overview
//! Each inbound topic has a fixed wire shape. [`decode`] parses a raw
//! payload against the shape registered for its topic, returning either a
//! [`Decoded::Trigger`] ready for [`sentinelops_core::WorkflowEngine::on_inbound_message`]
//! or a [`Decoded::Control`] record for topics that carry no workflow
//! trigger. Callers that get a [`SchemaError`] are expected to classify it
//! per the Dispatcher's two failure modes: malformed payloads are dropped,
//! well-formed payloads on unrecognized topics are dead-lettered.

use sentinelops_core::Action;
use sentinelops_core::ExecutedAction;
use sentinelops_core::IncidentId;
use sentinelops_core::InboundMessage;
use sentinelops_core::MessageId;
use sentinelops_core::Severity;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Failure decoding an inbound wire message.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// `topic` has no inbound schema registered; structurally this message
    /// may still be valid JSON, it is simply not one this Orchestrator
    /// understands.
    #[error("unrecognized inbound topic: {0}")]
    UnknownTopic(String),
    /// The payload failed to parse against its topic's schema.
    #[error("malformed payload on topic {topic}: {reason}")]
    Malformed {
        /// The topic the payload was published on.
        topic: String,
        /// The parse failure, for audit and diagnostics.
        reason: String,
    },
}

/// The result of successfully decoding an inbound message.
#[derive(Debug, Clone)]
pub enum Decoded {
    /// A message that becomes a Workflow Engine trigger.
    Trigger {
        /// Idempotency key for this delivery.
        message_id: MessageId,
        /// The incident this message targets.
        incident_id: IncidentId,
        /// The decoded trigger payload.
        message: Box<InboundMessage>,
    },
    /// A `control` message: administrative, carries no workflow trigger.
    Control {
        /// Idempotency key for this delivery.
        message_id: MessageId,
        /// The incident this message references, if any.
        incident_id: Option<IncidentId>,
        /// The raw control payload, recorded for audit.
        payload: Value,
    },
}

#[derive(Debug, Deserialize)]
struct NewIncidentWire {
    message_id: MessageId,
    incident_id: IncidentId,
    source: String,
    detected_at: String,
    severity: Severity,
    #[serde(default)]
    resources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AnalysisCompleteWire {
    message_id: MessageId,
    incident_id: IncidentId,
    confidence: f64,
    #[serde(default)]
    findings: Value,
    #[serde(default)]
    primary_events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RemediationProposedWire {
    message_id: MessageId,
    incident_id: IncidentId,
    actions: Vec<Action>,
}

#[derive(Debug, Deserialize)]
struct RemediationCompleteWire {
    message_id: MessageId,
    incident_id: IncidentId,
    per_action_status: Vec<ExecutedAction>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ApprovalDecisionValue {
    Granted,
    Denied,
}

#[derive(Debug, Deserialize)]
struct ApprovalDecisionWire {
    message_id: MessageId,
    incident_id: IncidentId,
    decision: ApprovalDecisionValue,
    reviewer: String,
}

#[derive(Debug, Deserialize)]
struct NotificationAckWire {
    message_id: MessageId,
    incident_id: IncidentId,
    #[serde(default)]
    channel: String,
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct ControlWire {
    message_id: MessageId,
    #[serde(default)]
    incident_id: Option<IncidentId>,
    #[serde(flatten)]
    payload: Value,
}

/// Decodes `payload` according to the schema registered for `topic`.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownTopic`] if `topic` is not one of the
/// inbound topics this Orchestrator subscribes to, or
/// [`SchemaError::Malformed`] if `payload` does not parse against that
/// topic's schema.
pub fn decode(topic: &str, payload: &[u8]) -> Result<Decoded, SchemaError> {
    let malformed = |reason: serde_json::Error| SchemaError::Malformed {
        topic: topic.to_string(),
        reason: reason.to_string(),
    };
    match topic {
        "new_incident" => {
            let wire: NewIncidentWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Trigger {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                message: Box::new(InboundMessage::NewIncident {
                    source: wire.source,
                    detected_at: wire.detected_at,
                    severity: wire.severity,
                    resources: wire.resources,
                }),
            })
        }
        "analysis_complete" => {
            let wire: AnalysisCompleteWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Trigger {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                message: Box::new(InboundMessage::AnalysisComplete {
                    confidence: wire.confidence,
                }),
            })
        }
        "remediation_proposed" => {
            let wire: RemediationProposedWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Trigger {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                message: Box::new(InboundMessage::RemediationProposed {
                    actions: wire.actions,
                }),
            })
        }
        "remediation_complete" => {
            let wire: RemediationCompleteWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Trigger {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                message: Box::new(InboundMessage::RemediationComplete {
                    results: wire.per_action_status,
                }),
            })
        }
        "approval_decision" => {
            let wire: ApprovalDecisionWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Trigger {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                message: Box::new(InboundMessage::ApprovalDecision {
                    granted: wire.decision == ApprovalDecisionValue::Granted,
                    reviewer: wire.reviewer,
                }),
            })
        }
        "notification_ack" => {
            let wire: NotificationAckWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Trigger {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                message: Box::new(InboundMessage::NotificationAck {
                    ok: wire.ok,
                }),
            })
        }
        "control" => {
            let wire: ControlWire = serde_json::from_slice(payload).map_err(malformed)?;
            Ok(Decoded::Control {
                message_id: wire.message_id,
                incident_id: wire.incident_id,
                payload: wire.payload,
            })
        }
        other => Err(SchemaError::UnknownTopic(other.to_string())),
    }
}
