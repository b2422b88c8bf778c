// crates/sentinelops-core/src/workflow.rs
// ============================================================================
// Module: SentinelOps Workflow Engine
// Description: The single canonical path driving an incident through its workflow.
// Purpose: Tie admission, the state machine, approval, the audit log, and the
//          injected backends into one deterministic entry point.
// Dependencies: crate::{admission, approval, audit, circuit, clock, identifiers,
//               interfaces, model, statemachine}, tracing
// ============================================================================

//! ## Overview
//! [`WorkflowEngine`] is the only place inbound messages become state
//! transitions. All surfaces (CLI, future HTTP/gRPC adapters) must call
//! into it to preserve the durability-barrier and idempotent-delivery
//! invariants.
//!
//! Scheduled timers (analysis, approval, and the state machine's own
//! [`crate::statemachine::Effect::ScheduleTimeout`] deadlines) are tracked
//! in memory and surfaced through [`WorkflowEngine::due_timeouts`]; the
//! caller's timer service polls that and calls [`WorkflowEngine::on_timeout`]
//! for each incident that comes due.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::admission::Admission;
use crate::admission::AdmissionError;
use crate::approval::ApprovalEngine;
use crate::audit::AuditChain;
use crate::audit::AuditError;
use crate::circuit::CircuitError;
use crate::clock::Deadline;
use crate::identifiers::IncidentId;
use crate::identifiers::MessageId;
use crate::interfaces::Clock;
use crate::interfaces::DispatchError;
use crate::interfaces::Dispatcher;
use crate::interfaces::IncidentStore;
use crate::interfaces::MetricsSink;
use crate::interfaces::StoreError;
use crate::model::Action;
use crate::model::ApprovalOutcome;
use crate::model::ExecutedAction;
use crate::model::Incident;
use crate::model::ResolutionReason;
use crate::model::Severity;
use crate::model::WorkflowState;
use crate::statemachine::Effect;
use crate::statemachine::StateMachine;
use crate::statemachine::StateMachineError;
use crate::statemachine::Trigger;

/// Top-level error taxonomy for the workflow engine, mirroring the
/// recoverable/terminal split the Recovery Policy and Admission Control
/// use internally.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A retryable failure in a collaborator.
    #[error("transient failure: {0}")]
    Transient(String),
    /// Inbound data failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A configured timer elapsed.
    #[error("operation timed out: {0}")]
    Timeout(String),
    /// An optimistic-concurrency write conflict.
    #[error("precondition failed: {0}")]
    Precondition(#[from] StoreError),
    /// The dependency's circuit breaker is open.
    #[error("circuit open: {0}")]
    CircuitOpen(#[from] CircuitError),
    /// A non-retryable, terminal failure. An audit entry documenting the
    /// cause is written before this variant is ever returned.
    #[error("unrecoverable failure: {0}")]
    Unrecoverable(String),
}

impl From<DispatchError> for WorkflowError {
    fn from(value: DispatchError) -> Self {
        Self::Transient(value.to_string())
    }
}

impl From<AdmissionError> for WorkflowError {
    fn from(value: AdmissionError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<AuditError> for WorkflowError {
    fn from(value: AuditError) -> Self {
        Self::Unrecoverable(format!("audit write failed, transition aborted: {value}"))
    }
}

impl From<StateMachineError> for WorkflowError {
    fn from(value: StateMachineError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// A decoded inbound message, already validated against its schema. See
/// the wire schema module for the shape each variant is built from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "topic", rename_all = "snake_case")]
pub enum InboundMessage {
    /// `new_incident`.
    NewIncident {
        /// Detection source.
        source: String,
        /// RFC 3339 detection timestamp.
        detected_at: String,
        /// Reported severity.
        severity: Severity,
        /// Implicated resources.
        resources: Vec<String>,
    },
    /// `analysis_complete`.
    AnalysisComplete {
        /// Analysis confidence in `[0.0, 1.0]`.
        confidence: f64,
    },
    /// `remediation_proposed`.
    RemediationProposed {
        /// The proposed action batch.
        actions: Vec<Action>,
    },
    /// `remediation_complete`.
    RemediationComplete {
        /// Per-action execution outcomes.
        results: Vec<ExecutedAction>,
    },
    /// `approval_decision`.
    ApprovalDecision {
        /// Whether a human granted the plan.
        granted: bool,
        /// Reviewer identity, recorded for audit.
        reviewer: String,
    },
    /// `notification_ack`.
    NotificationAck {
        /// Whether the notification was delivered.
        ok: bool,
    },
}

/// Severity-dependent confidence thresholds and risk caps the workflow
/// engine applies when it has no incident-specific override.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowThresholds {
    /// Minimum confidence required, by severity.
    pub confidence_threshold: fn(Severity) -> f64,
    /// Analysis timeout in seconds (default 300 per spec).
    pub analysis_timeout_secs: u64,
    /// Approval timeout in seconds (default 1800 per spec).
    pub approval_timeout_secs: u64,
}

impl Default for WorkflowThresholds {
    fn default() -> Self {
        Self {
            confidence_threshold: |severity| match severity {
                Severity::Low => 0.6,
                Severity::Medium => 0.7,
                Severity::High => 0.8,
                Severity::Critical => 0.85,
            },
            analysis_timeout_secs: 300,
            approval_timeout_secs: 1800,
        }
    }
}

/// The Workflow Engine: the sole authority turning inbound messages into
/// durable state transitions and outbound effects.
///
/// `Store`, `Disp`, `Clk`, and `Metrics` are injected backend
/// implementations; this type owns no I/O of its own.
pub struct WorkflowEngine<Store, Disp, Clk, Metrics> {
    store: Store,
    dispatcher: Disp,
    clock: Clk,
    metrics: Metrics,
    state_machine: StateMachine,
    approval: ApprovalEngine,
    admission: Admission,
    thresholds: WorkflowThresholds,
    audit: Mutex<AuditChain>,
    seen_messages: Mutex<HashSet<MessageId>>,
    timeouts: Mutex<HashMap<IncidentId, Deadline>>,
}

impl<Store, Disp, Clk, Metrics> WorkflowEngine<Store, Disp, Clk, Metrics>
where
    Store: IncidentStore,
    Disp: Dispatcher,
    Clk: Clock,
    Metrics: MetricsSink,
{
    /// Creates a workflow engine over the given injected backends.
    #[must_use]
    pub fn new(
        store: Store,
        dispatcher: Disp,
        clock: Clk,
        metrics: Metrics,
        state_machine: StateMachine,
        approval: ApprovalEngine,
        admission: Admission,
        thresholds: WorkflowThresholds,
        audit: AuditChain,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
            metrics,
            state_machine,
            approval,
            admission,
            thresholds,
            audit: Mutex::new(audit),
            seen_messages: Mutex::new(HashSet::new()),
            timeouts: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a reference to the audit log, for `verify-audit` tooling.
    pub fn audit(&self) -> std::sync::MutexGuard<'_, AuditChain> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        self.audit.lock().unwrap()
    }

    /// Returns the ids of every incident whose scheduled timer is due, per
    /// the injected clock. The caller's timer service should invoke
    /// [`Self::on_timeout`] for each and is responsible for the polling
    /// cadence; this type schedules deadlines but does not drive its own
    /// clock.
    #[must_use]
    pub fn due_timeouts(&self) -> Vec<IncidentId> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let timeouts = self.timeouts.lock().unwrap();
        timeouts
            .iter()
            .filter(|(_, deadline)| deadline.has_elapsed(&self.clock))
            .map(|(incident_id, _)| incident_id.clone())
            .collect()
    }

    /// Records a deadline `after_secs` seconds from now for `incident_id`,
    /// overwriting any previously scheduled deadline for it.
    fn schedule_timeout(&self, incident_id: &IncidentId, after_secs: u64) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut timeouts = self.timeouts.lock().unwrap();
        timeouts.insert(incident_id.clone(), Deadline::after_secs(&self.clock, after_secs));
    }

    /// Routes one inbound message to its incident. Redelivering a message
    /// with the same `message_id` is a no-op on state and audit.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] if validation, persistence, or dispatch
    /// fails. Transient failures are the caller's signal to retry per the
    /// Recovery Policy; `Unrecoverable` means an audit write itself failed
    /// and the transition was aborted before it could commit.
    pub fn on_inbound_message(
        &self,
        message_id: MessageId,
        incident_id: IncidentId,
        message: InboundMessage,
    ) -> Result<(), WorkflowError> {
        {
            #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
            let mut seen = self.seen_messages.lock().unwrap();
            if !seen.insert(message_id.clone()) {
                info!(%message_id, "duplicate inbound message, ignored");
                return Ok(());
            }
        }

        if let InboundMessage::NewIncident {
            source,
            detected_at,
            severity,
            resources,
        } = &message
        {
            return self.start_incident(incident_id, source.clone(), detected_at.clone(), *severity, resources.clone());
        }

        let Some(mut incident) = self.store.load(&incident_id)? else {
            return Err(WorkflowError::Validation(format!("unknown incident: {incident_id}")));
        };

        match message {
            InboundMessage::NewIncident { .. } => unreachable!("handled above"),
            InboundMessage::AnalysisComplete {
                confidence,
            } => self.on_analysis_complete(&mut incident, confidence),
            InboundMessage::RemediationProposed {
                actions,
            } => self.on_remediation_proposed(&mut incident, actions),
            InboundMessage::RemediationComplete {
                results,
            } => self.on_remediation_complete(&mut incident, results),
            InboundMessage::ApprovalDecision {
                granted,
                reviewer,
            } => self.on_approval_decision(&mut incident, granted, &reviewer),
            InboundMessage::NotificationAck {
                ok,
            } => self.on_notification_ack(&mut incident, ok),
        }
    }

    /// Starts a brand-new incident if one is not already admitted, applying
    /// Admission Control.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] if the admission backlog is
    /// full (the caller should dead-letter the detection), or any error
    /// from persisting or publishing the first transition.
    fn start_incident(
        &self,
        incident_id: IncidentId,
        source: String,
        detected_at: String,
        severity: Severity,
        resources: Vec<String>,
    ) -> Result<(), WorkflowError> {
        let incident = Incident::new(incident_id, source, detected_at, severity, resources);
        let admitted = self.admission.admit(incident.clone())?;

        if !admitted {
            self.metrics.incr_counter("admission_queued_total", 1);
            let mut queued = incident;
            self.flush(&mut queued)?;
            return Ok(());
        }

        self.start_admitted(incident)
    }

    /// Drives an already-admitted incident through its first two
    /// transitions. Shared by [`Self::start_incident`] and the backlog
    /// promotion in [`Self::apply_transition`].
    fn start_admitted(&self, mut incident: Incident) -> Result<(), WorkflowError> {
        self.apply_transition(&mut incident, Trigger::NewIncident, "dispatcher")?;
        self.apply_transition(&mut incident, Trigger::AnalysisDispatched, "workflow_engine")?;
        self.schedule_timeout(&incident.id, self.thresholds.analysis_timeout_secs);
        Ok(())
    }

    fn on_analysis_complete(&self, incident: &mut Incident, confidence: f64) -> Result<(), WorkflowError> {
        incident.confidence = Some(confidence);
        let threshold = (self.thresholds.confidence_threshold)(incident.initial_severity);
        let confidence_met = self.state_machine.confidence_meets_threshold(Some(confidence), threshold);
        self.apply_transition(
            incident,
            Trigger::AnalysisDone {
                confidence_met,
            },
            "analysis_agent",
        )?;
        if confidence_met {
            self.apply_transition(incident, Trigger::RemediationRequested, "workflow_engine")?;
        } else {
            incident.resolution_reason = Some(ResolutionReason::LowConfidence);
            self.flush(incident)?;
        }
        Ok(())
    }

    /// Runs every proposed action through the Approval Engine. A single
    /// `Deny` anywhere in the plan forces the whole batch to defer to a
    /// human rather than failing the workflow outright: only a human
    /// (`on_approval_decision`) or the approval timer can deny a plan.
    fn on_remediation_proposed(&self, incident: &mut Incident, actions: Vec<Action>) -> Result<(), WorkflowError> {
        incident.proposed_actions = actions;
        self.apply_transition(incident, Trigger::RemediationProposed, "remediation_agent")?;
        if incident.state != WorkflowState::REMEDIATION_PROPOSED {
            return Ok(());
        }

        let decided_at = self.clock.now_rfc3339();
        let mut any_deferred = false;
        for action in incident.proposed_actions.clone() {
            let decision = self.approval.decide(&action, incident.initial_severity, incident.confidence, decided_at.clone());
            self.audit_record(Some(incident.id.clone()), "approval_engine", "approval_decision", &decision)?;
            match decision.outcome {
                ApprovalOutcome::Approve => {}
                ApprovalOutcome::DeferToHuman | ApprovalOutcome::Deny => any_deferred = true,
            }
        }

        if any_deferred {
            self.apply_transition(incident, Trigger::ApprovalRequired, "approval_engine")?;
        } else {
            self.apply_transition(incident, Trigger::ApprovalAutoApproved, "approval_engine")?;
        }
        Ok(())
    }

    fn on_approval_decision(&self, incident: &mut Incident, granted: bool, reviewer: &str) -> Result<(), WorkflowError> {
        if incident.state != WorkflowState::APPROVAL_PENDING {
            warn!(incident_id = %incident.id, "approval_decision received outside APPROVAL_PENDING, ignored");
            return Ok(());
        }
        self.audit_record(
            Some(incident.id.clone()),
            reviewer,
            "approval_decision",
            &serde_json::json!({"granted": granted, "reviewer": reviewer}),
        )?;
        if granted {
            self.apply_transition(incident, Trigger::ApprovalGranted, reviewer)?;
        } else {
            self.apply_transition(incident, Trigger::ApprovalDenied, reviewer)?;
            incident.resolution_reason = Some(ResolutionReason::ApprovalDenied);
            self.flush(incident)?;
        }
        Ok(())
    }

    fn on_remediation_complete(&self, incident: &mut Incident, results: Vec<ExecutedAction>) -> Result<(), WorkflowError> {
        let all_ok = results.iter().all(|r| r.ok);
        incident.executed_actions = results;
        self.apply_transition(
            incident,
            if all_ok {
                Trigger::ExecuteOk
            } else {
                Trigger::ExecuteFailed
            },
            "remediation_agent",
        )?;
        if incident.state == WorkflowState::REMEDIATION_COMPLETE {
            incident.resolution_reason = Some(if all_ok {
                ResolutionReason::Resolved
            } else {
                ResolutionReason::Partial
            });
        }
        Ok(())
    }

    fn on_notification_ack(&self, incident: &mut Incident, ok: bool) -> Result<(), WorkflowError> {
        if !ok {
            warn!(incident_id = %incident.id, "notification delivery failed");
        }
        self.apply_transition(incident, Trigger::NotifyResolvedOrDelayElapsed, "notification_channel")
    }

    /// Handles a fired timer for `incident_id`: analysis, approval, or the
    /// hard workflow timeout, depending on current state. A deadline that
    /// outlived the state it was scheduled for (the incident already moved
    /// on through another message) is a stale timer and is silently
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] if the incident cannot be loaded or the
    /// resulting transition cannot be committed for a reason other than
    /// staleness.
    pub fn on_timeout(&self, incident_id: &IncidentId) -> Result<(), WorkflowError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        self.timeouts.lock().unwrap().remove(incident_id);

        let Some(mut incident) = self.store.load(incident_id)? else {
            return Err(WorkflowError::Validation(format!("unknown incident: {incident_id}")));
        };
        if incident.state.is_terminal() {
            return Ok(());
        }
        match self.state_machine.transit(incident.state, Trigger::Tick) {
            Ok(_) => self.apply_transition(&mut incident, Trigger::Tick, "clock_timer_service")?,
            Err(StateMachineError::InvalidTransition { .. }) => return Ok(()),
            Err(other) => return Err(other.into()),
        }
        if incident.state.is_terminal() && !incident.state.is_terminal_success() {
            incident.resolution_reason.get_or_insert(ResolutionReason::TransientExhausted);
        }
        self.flush(&mut incident)?;
        Ok(())
    }

    /// Runs one state-machine transition end to end: audit first, then
    /// persist, then publish — the durability barrier from
    /// the Dispatcher component documented alongside it.
    fn apply_transition(&self, incident: &mut Incident, trigger: Trigger, actor: &str) -> Result<(), WorkflowError> {
        let from = incident.state;
        let (next, effect) = self.state_machine.transit(from, trigger)?;

        self.audit_record(
            Some(incident.id.clone()),
            actor,
            "transition",
            &serde_json::json!({"from": from, "to": next}),
        )?;

        incident.state = next;
        incident.last_transition_at = self.clock.now_rfc3339();
        self.flush(incident)?;

        match effect {
            Effect::Publish {
                topic,
            } => {
                let payload = serde_json::to_vec(incident).map_err(|e| WorkflowError::Validation(e.to_string()))?;
                self.dispatcher.publish(&topic, &payload)?;
            }
            Effect::ScheduleTimeout {
                after_secs,
            } => self.schedule_timeout(&incident.id, after_secs),
            Effect::RecordDecision | Effect::None => {}
            Effect::Finish => {
                #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
                self.timeouts.lock().unwrap().remove(&incident.id);
                self.metrics.incr_counter("workflow_completed_total", 1);
                if let Some(promoted) = self.admission.release() {
                    let promoted_id = promoted.id.clone();
                    self.start_admitted(promoted)?;
                    info!(incident_id = %promoted_id, "admission slot freed, queued incident started");
                }
            }
        }

        info!(incident_id = %incident.id, from = ?from, to = ?next, "transition applied");
        Ok(())
    }

    /// Persists `incident` with its expected prior version, treating a
    /// version mismatch as [`WorkflowError::Precondition`].
    fn flush(&self, incident: &mut Incident) -> Result<(), WorkflowError> {
        incident.version += 1;
        self.store.save(incident)?;
        Ok(())
    }

    fn audit_record<T: Serialize>(
        &self,
        incident_id: Option<IncidentId>,
        actor: &str,
        event_type: &str,
        payload: &T,
    ) -> Result<(), WorkflowError> {
        let timestamp = self.clock.now_rfc3339();
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut audit = self.audit.lock().unwrap();
        audit.record(incident_id, actor, event_type, payload, timestamp)?;
        Ok(())
    }
}
