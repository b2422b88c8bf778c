// crates/sentinelops-broker/src/bus.rs
// ============================================================================
// Module: SentinelOps In-Process Message Bus
// Description: Publish/subscribe Dispatcher implementation over named topics.
// Purpose: Fan out outbound Workflow Engine effects to registered subscribers.
// Dependencies: sentinelops_core::interfaces, tokio::sync::mpsc
// ============================================================================

//! ## Overview
//! [`InProcessBus`] implements [`sentinelops_core::Dispatcher`] by routing
//! each publish to every subscriber registered for that topic. Delivery
//! uses bounded `tokio::sync::mpsc` channels so a stalled subscriber
//! applies backpressure rather than silently dropping messages.

use std::collections::HashMap;
use std::sync::Mutex;

use sentinelops_core::DispatchError;
use sentinelops_core::Dispatcher;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;

/// One message handed to a topic's subscribers.
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The topic the message was published on.
    pub topic: String,
    /// The serialized payload, exactly as published.
    pub payload: Vec<u8>,
}

/// In-process publish/subscribe bus, keyed by topic name.
///
/// # Invariants
/// - A publish to a topic with no subscribers is [`DispatchError::UnknownTopic`].
/// - Subscribers for the same topic all receive every message (fan-out).
#[derive(Default)]
pub struct InProcessBus {
    routes: Mutex<HashMap<String, Vec<Sender<BusMessage>>>>,
}

impl InProcessBus {
    /// Creates an empty bus with no registered routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sender` to receive every message published to `topic`.
    pub fn subscribe(&self, topic: impl Into<String>, sender: Sender<BusMessage>) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut routes = self.routes.lock().unwrap();
        routes.entry(topic.into()).or_default().push(sender);
    }
}

impl Dispatcher for InProcessBus {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DispatchError> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let routes = self.routes.lock().unwrap();
        let Some(subscribers) = routes.get(topic) else {
            return Err(DispatchError::UnknownTopic(topic.to_string()));
        };
        let message = BusMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        };
        for subscriber in subscribers {
            subscriber.try_send(message.clone()).map_err(|err| match err {
                TrySendError::Full(_) => DispatchError::Failed(format!("subscriber backlog full for topic {topic}")),
                TrySendError::Closed(_) => DispatchError::Failed(format!("subscriber closed for topic {topic}")),
            })?;
        }
        Ok(())
    }
}
