// crates/sentinelops-broker/src/lib.rs
// ============================================================================
// Module: SentinelOps Broker
// Description: Message Bus Adapter implementation and inbound Dispatcher.
// Purpose: Give the Orchestrator a concrete, in-process publish/subscribe bus.
// Dependencies: sentinelops-core, serde_json, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! `sentinelops-broker` implements the Message Bus Adapter
//! ([`bus::InProcessBus`], a [`sentinelops_core::Dispatcher`]) and the
//! Dispatcher component ([`router::InboundRouter`]) that validates and
//! routes inbound topic messages into a [`sentinelops_core::WorkflowEngine`].
//! Nothing here persists across a process restart; a durable bus backend
//! implements the same [`sentinelops_core::Dispatcher`] trait without
//! changing the Workflow Engine.

#![forbid(unsafe_code)]

pub mod bus;
pub mod log;
pub mod router;
pub mod schema;

pub use bus::BusMessage;
pub use bus::InProcessBus;
pub use log::LogDispatcher;
pub use router::INBOUND_TOPICS;
pub use router::InboundRouter;
pub use schema::Decoded;
pub use schema::SchemaError;
pub use schema::decode;
