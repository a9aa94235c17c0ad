//! Bus - message identity, defaults, and fan-out over a Transport.
//!
//! The bus is the kernel facade in front of a [`Transport`]: it assigns
//! every outgoing message an id and timestamp, defaults the priority,
//! fans broadcasts out one recipient at a time, and mediates handler
//! subscriptions so that the runtime installs exactly one handler chain
//! per agent.
//!
//! # Partial Broadcast Failure
//!
//! `broadcast` sends to recipients in order and stops at the first
//! failure. The returned [`BroadcastError`] carries the ids already
//! assigned and delivered, so a caller can tell exactly which recipients
//! observed the message.

mod error;

pub use error::{BroadcastError, BusError};

use axon_message::{Message, MessageHandler, SendOptions, Transport};
use axon_types::{AgentId, MessageId};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Kernel facade over a [`Transport`].
///
/// The transport must outlive the bus; both are usually shared as `Arc`s.
///
/// # Example
///
/// ```
/// use axon_message::{InMemoryTransport, SendOptions};
/// use axon_runtime::Bus;
/// use axon_types::AgentId;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let bus = Bus::new(Arc::new(InMemoryTransport::new()));
///
/// let id = bus
///     .send("a", "b", "greeting", json!("hello"), SendOptions::default())
///     .await
///     .unwrap();
///
/// let delivered = bus.receive(&AgentId::new("b")).await.unwrap();
/// assert_eq!(delivered[0].id, id);
/// # });
/// ```
pub struct Bus {
    transport: Arc<dyn Transport>,
    /// Bus-side handler bookkeeping, mirroring what is installed on the
    /// transport.
    handlers: Mutex<HashMap<AgentId, Vec<MessageHandler>>>,
    /// Messages explicitly queued for later delivery; drained first by
    /// `receive`.
    local_queue: Mutex<HashMap<AgentId, Vec<Message>>>,
}

impl Bus {
    /// Creates a bus over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            handlers: Mutex::new(HashMap::new()),
            local_queue: Mutex::new(HashMap::new()),
        }
    }

    /// Constructs a message, assigns identity and timestamp, defaults the
    /// priority, and delivers it. Returns the assigned id.
    pub async fn send(
        &self,
        from: impl Into<AgentId>,
        to: impl Into<AgentId>,
        kind: impl Into<String>,
        payload: Value,
        options: SendOptions,
    ) -> Result<MessageId, BusError> {
        let message = Message::new(from, to, kind, payload).with_options(options);
        let id = message.id;

        trace!(id = %id, to = %message.to, kind = %message.kind, "bus send");
        self.transport.send(message).await?;
        Ok(id)
    }

    /// Sends the same kind/payload to each recipient in order.
    ///
    /// Returns one id per recipient, in recipient order. On the first
    /// individual failure, no further recipients are attempted and the
    /// error carries the ids already sent.
    pub async fn broadcast(
        &self,
        from: impl Into<AgentId>,
        recipients: &[AgentId],
        kind: impl Into<String>,
        payload: Value,
        options: SendOptions,
    ) -> Result<Vec<MessageId>, BroadcastError> {
        let from = from.into();
        let kind = kind.into();
        let mut sent = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            let result = self
                .send(
                    from.clone(),
                    recipient.clone(),
                    kind.clone(),
                    payload.clone(),
                    options.clone(),
                )
                .await;

            match result {
                Ok(id) => sent.push(id),
                Err(source) => {
                    debug!(recipient = %recipient, sent = sent.len(), "broadcast aborted");
                    return Err(BroadcastError {
                        sent,
                        failed_recipient: recipient.to_string(),
                        source,
                    });
                }
            }
        }

        Ok(sent)
    }

    /// Installs a push handler for `agent_id`, mirrored to the transport.
    ///
    /// Repeated subscribes append to the chain; each delivered message is
    /// offered to every handler in registration order.
    pub async fn subscribe(
        &self,
        agent_id: &AgentId,
        handler: MessageHandler,
    ) -> Result<(), BusError> {
        self.transport
            .subscribe(agent_id, Arc::clone(&handler))
            .await?;
        self.handlers
            .lock()
            .entry(agent_id.clone())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Removes the whole handler chain for `agent_id`, mirrored to the
    /// transport. Idempotent.
    pub async fn unsubscribe(&self, agent_id: &AgentId) -> Result<(), BusError> {
        self.transport.unsubscribe(agent_id).await?;
        self.handlers.lock().remove(agent_id);
        Ok(())
    }

    /// Drains pending messages for `agent_id`: bus-queued first, then the
    /// transport's queue, each in arrival order.
    pub async fn receive(&self, agent_id: &AgentId) -> Result<Vec<Message>, BusError> {
        let mut drained = self
            .local_queue
            .lock()
            .remove(agent_id)
            .unwrap_or_default();
        drained.extend(self.transport.receive(agent_id).await?);
        Ok(drained)
    }

    /// Queues a message on the bus itself for later delivery via
    /// [`receive`](Self::receive), bypassing the transport.
    pub fn queue_local(&self, agent_id: &AgentId, message: Message) {
        self.local_queue
            .lock()
            .entry(agent_id.clone())
            .or_default()
            .push(message);
    }

    /// Number of handlers currently registered for `agent_id` on the bus
    /// side.
    #[must_use]
    pub fn handler_count(&self, agent_id: &AgentId) -> usize {
        self.handlers.lock().get(agent_id).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_message::{InMemoryTransport, Priority};
    use serde_json::json;

    fn bus() -> Bus {
        Bus::new(Arc::new(InMemoryTransport::new()))
    }

    #[tokio::test]
    async fn send_assigns_identity_and_defaults() {
        let bus = bus();
        let id = bus
            .send("a", "b", "t", json!(1), SendOptions::default())
            .await
            .unwrap();

        let delivered = bus.receive(&AgentId::new("b")).await.unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].id, id);
        assert_eq!(delivered[0].priority, Priority::Normal);
        assert_eq!(delivered[0].from.as_str(), "a");
    }

    #[tokio::test]
    async fn send_applies_options() {
        let bus = bus();
        bus.send(
            "a",
            "b",
            "t",
            json!(1),
            SendOptions {
                priority: Some(Priority::Critical),
                correlation_id: Some("X".into()),
                ..SendOptions::default()
            },
        )
        .await
        .unwrap();

        let delivered = bus.receive(&AgentId::new("b")).await.unwrap();
        assert_eq!(delivered[0].priority, Priority::Critical);
        assert_eq!(delivered[0].correlation_id.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn broadcast_preserves_recipient_order() {
        let bus = bus();
        let recipients: Vec<AgentId> = ["a", "b", "c"].into_iter().map(AgentId::new).collect();

        let ids = bus
            .broadcast("s", &recipients, "t", json!(1), SendOptions::default())
            .await
            .unwrap();
        assert_eq!(ids.len(), 3);

        for (recipient, expected_id) in recipients.iter().zip(&ids) {
            let delivered = bus.receive(recipient).await.unwrap();
            assert_eq!(delivered.len(), 1);
            assert_eq!(delivered[0].id, *expected_id);
        }
    }

    #[tokio::test]
    async fn broadcast_partial_failure_reports_sent_ids() {
        let transport = Arc::new(InMemoryTransport::new());
        let bus = Bus::new(Arc::clone(&transport) as Arc<dyn Transport>);
        let recipients: Vec<AgentId> = ["a", "b", "c"].into_iter().map(AgentId::new).collect();

        // First two sends land, then the transport closes underneath the
        // bus. Closing wipes the queues, so only the error's bookkeeping
        // is observable.
        let first = bus
            .send("s", "a", "t", json!(0), SendOptions::default())
            .await
            .unwrap();
        transport.cleanup().await.unwrap();
        let _ = first;

        let err = bus
            .broadcast("s", &recipients, "t", json!(1), SendOptions::default())
            .await
            .unwrap_err();

        assert!(err.sent.is_empty());
        assert_eq!(err.failed_recipient, "a");
    }

    #[tokio::test]
    async fn receive_returns_local_queue_first() {
        let bus = bus();
        let b = AgentId::new("b");

        // Transport-delivered message.
        bus.send("a", "b", "via-transport", json!(1), SendOptions::default())
            .await
            .unwrap();
        // Bus-queued message.
        bus.queue_local(&b, Message::new("a", "b", "via-bus", json!(2)));

        let drained = bus.receive(&b).await.unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind, "via-bus");
        assert_eq!(drained[1].kind, "via-transport");
    }

    #[tokio::test]
    async fn subscribe_and_unsubscribe_mirror_to_transport() {
        let transport = Arc::new(InMemoryTransport::new());
        let bus = Bus::new(Arc::clone(&transport) as Arc<dyn Transport>);
        let b = AgentId::new("b");

        let seen = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&seen);
        let handler: MessageHandler = Arc::new(move |_msg| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                *counter.lock() += 1;
            })
        });

        bus.subscribe(&b, handler).await.unwrap();
        assert_eq!(bus.handler_count(&b), 1);
        assert_eq!(transport.handler_count(&b), 1);

        bus.send("a", "b", "t", json!(1), SendOptions::default())
            .await
            .unwrap();
        assert_eq!(*seen.lock(), 1);

        bus.unsubscribe(&b).await.unwrap();
        assert_eq!(bus.handler_count(&b), 0);
        assert_eq!(transport.handler_count(&b), 0);

        bus.send("a", "b", "t", json!(2), SendOptions::default())
            .await
            .unwrap();
        // No delivery after unsubscribe.
        assert_eq!(*seen.lock(), 1);
    }
}
