// crates/sentinelops-core/src/model.rs
// ============================================================================
// Module: SentinelOps Data Model
// Description: Incident, WorkflowState, Action, ApprovalDecision data types.
// Purpose: The shared vocabulary every other Orchestrator module operates on.
// Dependencies: crate::identifiers, crate::hashing, serde
// ============================================================================

//! ## Overview
//! See the workflow-state glossary for the authoritative description of each
//! type. This module only defines data; behavior lives in
//! [`crate::statemachine`], [`crate::workflow`], and [`crate::approval`].

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::IdempotencyKey;
use crate::identifiers::IncidentId;
use crate::identifiers::RuleId;

/// Incident severity.
///
/// # Invariants
/// - Ordered `Low < Medium < High < Critical`; derive order matches
///   declaration order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
    /// Critical severity.
    Critical,
}

/// The 15 states an incident's workflow may occupy.
///
/// # Invariants
/// - [`WorkflowState::is_terminal`] is true only for the last three
///   variants.
/// - [`WorkflowState::INCIDENT_CLOSED`] is the sole terminal-success state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types, reason = "mirrors the workflow's SCREAMING_SNAKE_CASE state names")]
pub enum WorkflowState {
    /// Incident record created but not yet processed.
    INITIALIZED,
    /// A `new_incident` detection has been received and persisted.
    DETECTION_RECEIVED,
    /// An `analyze_incident` request has been sent to the analysis agent.
    ANALYSIS_REQUESTED,
    /// The analysis agent has acknowledged and is working.
    ANALYSIS_IN_PROGRESS,
    /// Analysis finished with sufficient confidence.
    ANALYSIS_COMPLETE,
    /// A remediation request has been sent to the remediation agent.
    REMEDIATION_REQUESTED,
    /// The remediation agent proposed a remediation plan.
    REMEDIATION_PROPOSED,
    /// The plan requires a human approval decision.
    APPROVAL_PENDING,
    /// The plan was approved (automatically or by a human).
    REMEDIATION_APPROVED,
    /// `execute_remediation` has been published.
    REMEDIATION_IN_PROGRESS,
    /// All remediation actions reported their outcome.
    REMEDIATION_COMPLETE,
    /// The incident is resolved, awaiting closure.
    INCIDENT_RESOLVED,
    /// Terminal-success: the incident is fully closed.
    INCIDENT_CLOSED,
    /// Terminal: the workflow failed (see `resolution_reason` for why).
    WORKFLOW_FAILED,
    /// Terminal: a hard timeout elapsed before completion.
    WORKFLOW_TIMEOUT,
}

impl WorkflowState {
    /// Returns true for the three terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::INCIDENT_CLOSED | Self::WORKFLOW_FAILED | Self::WORKFLOW_TIMEOUT)
    }

    /// Returns true only for the terminal-success state.
    #[must_use]
    pub const fn is_terminal_success(self) -> bool {
        matches!(self, Self::INCIDENT_CLOSED)
    }
}

/// A proposed remediation action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action category, e.g. `block_ip`, `isolate_host`, `revoke_credentials`.
    pub category: String,
    /// Target resource identifier(s).
    pub target: Vec<String>,
    /// Risk score in `[0.0, 1.0]`.
    pub risk: f64,
    /// Whether this action requires human approval regardless of score.
    pub requires_approval: bool,
    /// Whether execution should be a dry run (no real side effect).
    pub dry_run: bool,
    /// Client-supplied key ensuring at-most-once execution.
    pub idempotency_key: IdempotencyKey,
}

/// Outcome of an approval decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalOutcome {
    /// Auto-approved.
    Approve,
    /// Deferred to a human reviewer.
    DeferToHuman,
    /// Explicitly denied.
    Deny,
}

/// A single approval decision, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// The decision outcome.
    pub outcome: ApprovalOutcome,
    /// The rule that produced this decision (or a sentinel for "no rule matched").
    pub rule_id: RuleId,
    /// Score components that drove the decision, for audit purposes.
    pub score_components: ApprovalScoreComponents,
    /// Wall-clock time the decision was made, as RFC 3339.
    pub decided_at: String,
}

/// The score inputs behind an [`ApprovalDecision`], recorded for audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApprovalScoreComponents {
    /// Analysis confidence at decision time.
    pub confidence: f64,
    /// The action's risk score.
    pub risk: f64,
    /// The confidence threshold that applied (severity-dependent).
    pub confidence_threshold: f64,
    /// The maximum allowed risk that applied.
    pub max_risk: f64,
}

/// Why a resolved or failed incident reached its terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionReason {
    /// All actions executed successfully.
    Resolved,
    /// Some actions failed but policy allows partial success.
    Partial,
    /// Analysis confidence was below threshold.
    LowConfidence,
    /// Retries were exhausted on a transient error.
    TransientExhausted,
    /// A human denied the remediation plan.
    ApprovalDenied,
    /// The approval timer fired with no decision.
    ApprovalTimedOut,
    /// A validation, precondition, or unrecoverable error occurred.
    Error(String),
}

/// A security incident and its mutable workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique, immutable identifier.
    pub id: IncidentId,
    /// Detection source (e.g. the detector agent name).
    pub source: String,
    /// RFC 3339 detection timestamp.
    pub detected_at: String,
    /// Initial severity as reported by detection; immutable.
    pub initial_severity: Severity,
    /// Ordered, opaque cloud resource identifiers implicated by the incident.
    pub resources: Vec<String>,
    /// Current workflow state.
    pub state: WorkflowState,
    /// RFC 3339 timestamp of the last transition.
    pub last_transition_at: String,
    /// Monotonic version used for optimistic-concurrency writes.
    pub version: u64,
    /// Analysis confidence, once known.
    pub confidence: Option<f64>,
    /// Proposed actions from the remediation agent.
    pub proposed_actions: Vec<Action>,
    /// Actions that have been executed (successfully or not), with outcome.
    pub executed_actions: Vec<ExecutedAction>,
    /// Set once the incident reaches a terminal state.
    pub resolution_reason: Option<ResolutionReason>,
    /// Workflow engine instance id that currently owns the incident lock.
    pub owner: Option<String>,
}

impl Incident {
    /// Creates a brand-new incident in `INITIALIZED` state.
    #[must_use]
    pub fn new(
        id: IncidentId,
        source: impl Into<String>,
        detected_at: impl Into<String>,
        initial_severity: Severity,
        resources: Vec<String>,
    ) -> Self {
        let detected_at = detected_at.into();
        Self {
            id,
            source: source.into(),
            detected_at: detected_at.clone(),
            initial_severity,
            resources,
            state: WorkflowState::INITIALIZED,
            last_transition_at: detected_at,
            version: 0,
            confidence: None,
            proposed_actions: Vec::new(),
            executed_actions: Vec::new(),
            resolution_reason: None,
            owner: None,
        }
    }

    /// Returns true if `key` has already been executed on this incident.
    #[must_use]
    pub fn has_executed(&self, key: &IdempotencyKey) -> bool {
        self.executed_actions.iter().any(|executed| &executed.idempotency_key == key)
    }
}

/// Outcome of one executed action, recorded for idempotency and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedAction {
    /// The idempotency key of the action that was executed.
    pub idempotency_key: IdempotencyKey,
    /// Whether execution succeeded.
    pub ok: bool,
    /// Error detail when `ok` is false.
    pub error: Option<String>,
}
