// crates/sentinelops-core/src/statemachine.rs
// ============================================================================
// Module: SentinelOps State Machine
// Description: Pure Transit(current, trigger, ctx) -> {NextState, Effect} function.
// Purpose: The sole authority on which workflow-state transitions are legal.
// Dependencies: crate::model, sentinelops_logic, thiserror
// ============================================================================

//! ## Overview
//! The state machine holds no state of its own, configurable or otherwise.
//! `transit` is a pure function of `(current, trigger)`; [`StateMachine`]
//! exists only to host it and [`StateMachine::confidence_meets_threshold`],
//! whose threshold the caller supplies so severity-dependent thresholds stay
//! defined in exactly one place (the workflow engine's `WorkflowThresholds`).

use thiserror::Error;

use crate::model::WorkflowState;
use sentinelops_logic::KleeneLogic;
use sentinelops_logic::TriLogic;
use sentinelops_logic::TriState;

/// An event that may cause a workflow-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A `new_incident` detection arrived.
    NewIncident,
    /// `analyze_incident` was sent; analysis agent should now be working.
    AnalysisDispatched,
    /// The analysis agent finished with a confidence score.
    AnalysisDone {
        /// Whether confidence met the configured threshold.
        confidence_met: bool,
    },
    /// Analysis cleared the confidence bar; proceed to await a remediation
    /// proposal. Internal cascade, not driven by an inbound message.
    RemediationRequested,
    /// A remediation plan was proposed.
    RemediationProposed,
    /// The Approval Engine auto-approved the plan.
    ApprovalAutoApproved,
    /// The Approval Engine deferred to a human.
    ApprovalRequired,
    /// A human granted the pending approval.
    ApprovalGranted,
    /// A human denied the pending approval.
    ApprovalDenied,
    /// The approval timer fired with no decision.
    ApprovalTimeout,
    /// All remediation actions executed successfully.
    ExecuteOk,
    /// At least one remediation action failed (recoverably or not).
    ExecuteFailed,
    /// `notify_resolved` was acknowledged, or the closure delay elapsed.
    NotifyResolvedOrDelayElapsed,
    /// A timer fired for the current state (routed to the right transition
    /// by the caller based on which timer it was).
    Tick,
    /// A fatal, non-retryable error forces immediate failure.
    Escalate,
}

/// The observable consequence of a transition, for the workflow engine to
/// act on.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Publish a message to the named outbound topic.
    Publish {
        /// Outbound topic name.
        topic: String,
    },
    /// Schedule a timer that fires after `after_secs` seconds.
    ScheduleTimeout {
        /// Seconds until the timer fires.
        after_secs: u64,
    },
    /// Record that an approval decision occurred (the decision itself is
    /// produced by the Approval Engine, not the state machine).
    RecordDecision,
    /// The workflow has reached a terminal state; no further effects.
    Finish,
    /// No side effect beyond the state change itself.
    None,
}

/// Errors `Transit` can return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    /// `trigger` is not defined for `current`.
    #[error("trigger {trigger:?} is not valid from state {current:?}")]
    InvalidTransition {
        /// The state the trigger was attempted from.
        current: WorkflowState,
        /// The trigger that was rejected.
        trigger: Trigger,
    },
    /// A guard predicate rejected the transition.
    #[error("guard failed for trigger {trigger:?} from state {current:?}: {reason}")]
    GuardFailed {
        /// The state the trigger was attempted from.
        current: WorkflowState,
        /// The trigger whose guard failed.
        trigger: Trigger,
        /// Human-readable reason, also suitable for the audit log.
        reason: String,
    },
}

/// The state machine itself holds no guard configuration: the workflow
/// engine owns the severity-dependent confidence thresholds and passes the
/// one that applies to each call, so there is a single place those
/// thresholds are defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateMachine;

impl StateMachine {
    /// Creates a state machine. It holds no configuration of its own.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates whether `confidence` meets `threshold` under fail-closed
    /// (Kleene) tri-state logic: a missing confidence value is `Unknown`,
    /// which this engine treats as not-met.
    #[must_use]
    pub fn confidence_meets_threshold(&self, confidence: Option<f64>, threshold: f64) -> bool {
        let tri = match confidence {
            Some(c) if c >= threshold => TriState::True,
            Some(_) => TriState::False,
            None => TriState::Unknown,
        };
        KleeneLogic.and(tri, TriState::True).is_true()
    }

    /// Executes one transition.
    ///
    /// # Errors
    ///
    /// Returns [`StateMachineError::InvalidTransition`] if `trigger` is not
    /// defined for `current`, or [`StateMachineError::GuardFailed`] if a
    /// guard predicate rejects the transition.
    pub fn transit(
        &self,
        current: WorkflowState,
        trigger: Trigger,
    ) -> Result<(WorkflowState, Effect), StateMachineError> {
        use Trigger as T;
        use WorkflowState as S;

        if current.is_terminal() {
            return Err(StateMachineError::InvalidTransition {
                current,
                trigger,
            });
        }

        let outcome = match (current, trigger) {
            (S::INITIALIZED, T::NewIncident) => (S::DETECTION_RECEIVED, Effect::None),
            (S::DETECTION_RECEIVED, T::AnalysisDispatched) => (
                S::ANALYSIS_REQUESTED,
                Effect::Publish {
                    topic: "analyze_incident".to_string(),
                },
            ),
            (S::ANALYSIS_REQUESTED, T::Tick) => (S::WORKFLOW_TIMEOUT, Effect::Finish),
            (S::ANALYSIS_REQUESTED | S::ANALYSIS_IN_PROGRESS, T::AnalysisDone {
                confidence_met,
            }) => {
                if confidence_met {
                    (S::ANALYSIS_COMPLETE, Effect::None)
                } else {
                    (
                        S::WORKFLOW_FAILED,
                        Effect::Publish {
                            topic: "send_notification".to_string(),
                        },
                    )
                }
            }
            (S::ANALYSIS_IN_PROGRESS, T::Tick) => (S::WORKFLOW_TIMEOUT, Effect::Finish),
            (S::ANALYSIS_COMPLETE, T::RemediationRequested) => (S::REMEDIATION_REQUESTED, Effect::None),
            (S::REMEDIATION_REQUESTED, T::RemediationProposed) => {
                (S::REMEDIATION_PROPOSED, Effect::RecordDecision)
            }
            (S::REMEDIATION_PROPOSED, T::ApprovalAutoApproved) => (
                S::REMEDIATION_APPROVED,
                Effect::Publish {
                    topic: "execute_remediation".to_string(),
                },
            ),
            (S::REMEDIATION_PROPOSED, T::ApprovalRequired) => (
                S::APPROVAL_PENDING,
                Effect::ScheduleTimeout {
                    after_secs: 1800,
                },
            ),
            (S::REMEDIATION_PROPOSED, T::ApprovalDenied) => (
                S::WORKFLOW_FAILED,
                Effect::Publish {
                    topic: "send_notification".to_string(),
                },
            ),
            (S::APPROVAL_PENDING, T::ApprovalGranted) => (
                S::REMEDIATION_APPROVED,
                Effect::Publish {
                    topic: "execute_remediation".to_string(),
                },
            ),
            (S::APPROVAL_PENDING, T::ApprovalDenied) => (
                S::WORKFLOW_FAILED,
                Effect::Publish {
                    topic: "send_notification".to_string(),
                },
            ),
            (S::APPROVAL_PENDING, T::ApprovalTimeout | T::Tick) => (
                S::WORKFLOW_TIMEOUT,
                Effect::Publish {
                    topic: "send_notification".to_string(),
                },
            ),
            (S::REMEDIATION_APPROVED, T::ExecuteOk | T::ExecuteFailed) => {
                (S::REMEDIATION_IN_PROGRESS, Effect::None)
            }
            (S::REMEDIATION_IN_PROGRESS, T::ExecuteOk) => (S::REMEDIATION_COMPLETE, Effect::RecordDecision),
            (S::REMEDIATION_IN_PROGRESS, T::ExecuteFailed) => {
                (S::REMEDIATION_IN_PROGRESS, Effect::None)
            }
            (S::REMEDIATION_IN_PROGRESS, T::Tick) => (S::WORKFLOW_FAILED, Effect::Finish),
            (S::REMEDIATION_IN_PROGRESS, T::Escalate) => (S::WORKFLOW_FAILED, Effect::Finish),
            (S::REMEDIATION_COMPLETE, T::NotifyResolvedOrDelayElapsed) => (
                S::INCIDENT_RESOLVED,
                Effect::Publish {
                    topic: "send_notification".to_string(),
                },
            ),
            (S::INCIDENT_RESOLVED, T::NotifyResolvedOrDelayElapsed | T::Tick) => {
                (S::INCIDENT_CLOSED, Effect::Finish)
            }
            (_, T::Escalate) => (S::WORKFLOW_FAILED, Effect::Finish),
            _ => {
                return Err(StateMachineError::InvalidTransition {
                    current,
                    trigger,
                });
            }
        };

        Ok(outcome)
    }
}
