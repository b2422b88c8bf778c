// crates/sentinelops-core/src/lib.rs
// ============================================================================
// Module: SentinelOps Core
// Description: Orchestrator core — state machine, workflow engine, admission,
//              approval, recovery, circuit breaking, caching, batching, and
//              the tamper-evident audit log.
// Purpose: Drive each security incident through its workflow deterministically.
// Dependencies: sentinelops-logic, serde, serde_json, serde_jcs, sha2, thiserror, time
// ============================================================================

//! ## Overview
//! `sentinelops-core` is the Orchestrator described by the SentinelOps
//! platform: a deterministic state machine and workflow driver for
//! cloud-security incidents. It depends on nothing outside this crate and
//! `sentinelops-logic` — every external capability (the incident store, the
//! message bus, the clock, the metrics sink) is a trait in
//! [`interfaces`], implemented by sibling crates.

#![forbid(unsafe_code)]

pub mod admission;
pub mod approval;
pub mod audit;
pub mod batcher;
pub mod cache;
pub mod circuit;
pub mod clock;
pub mod hashing;
pub mod identifiers;
pub mod interfaces;
pub mod model;
pub mod recovery;
pub mod statemachine;
pub mod workflow;

pub use admission::Admission;
pub use admission::AdmissionError;
pub use approval::ApprovalEngine;
pub use approval::ApprovalRule;
pub use approval::ApprovalRuleSet;
pub use audit::AuditChain;
pub use audit::AuditEntry;
pub use audit::AuditError;
pub use audit::Chain;
pub use batcher::WriteBatcher;
pub use cache::ResultCache;
pub use circuit::CircuitBreaker;
pub use circuit::CircuitError;
pub use circuit::CircuitState;
pub use clock::Clock;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::DependencyName;
pub use identifiers::IdempotencyKey;
pub use identifiers::IncidentId;
pub use identifiers::MessageId;
pub use identifiers::RuleId;
pub use interfaces::Dispatcher;
pub use interfaces::DispatchError;
pub use interfaces::IncidentStore;
pub use interfaces::MetricsSink;
pub use interfaces::StoreError;
pub use model::Action;
pub use model::ApprovalDecision;
pub use model::ApprovalOutcome;
pub use model::Incident;
pub use model::Severity;
pub use model::WorkflowState;
pub use recovery::ErrorKind;
pub use recovery::RecoveryAction;
pub use recovery::RecoveryPolicy;
pub use statemachine::Effect;
pub use statemachine::StateMachine;
pub use statemachine::StateMachineError;
pub use statemachine::Trigger;
pub use workflow::InboundMessage;
pub use workflow::WorkflowEngine;
pub use workflow::WorkflowError;
pub use workflow::WorkflowThresholds;
