//! In-memory reference transport.

use crate::{Message, MessageHandler, Transport, TransportError};
use axon_types::AgentId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::trace;

/// Single-process transport backed by per-recipient queues and handler
/// chains.
///
/// `send` appends the message to the recipient's queue and then, before
/// returning, invokes every installed handler for that recipient in
/// registration order. Delivery is therefore fully deterministic, which is
/// what tests want.
///
/// # Ordering
///
/// Messages from one sender to one recipient are delivered (both pushed
/// and drained) in send order. Nothing is promised between senders.
///
/// # Locking
///
/// Handler chains are cloned out of the lock before invocation, so a
/// handler may call back into the transport (send a reply, drain its own
/// queue) without deadlocking.
///
/// # Example
///
/// ```
/// use axon_message::{InMemoryTransport, Message, Transport};
/// use axon_types::AgentId;
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let transport = InMemoryTransport::new();
/// transport
///     .send(Message::new("a", "b", "t", json!(1)))
///     .await
///     .unwrap();
///
/// let drained = transport.receive(&AgentId::new("b")).await.unwrap();
/// assert_eq!(drained.len(), 1);
/// # });
/// ```
#[derive(Default)]
pub struct InMemoryTransport {
    queues: Mutex<HashMap<AgentId, Vec<Message>>>,
    handlers: Mutex<HashMap<AgentId, Vec<MessageHandler>>>,
    closed: AtomicBool,
}

impl InMemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of undrained messages queued for `agent_id`.
    #[must_use]
    pub fn queued_len(&self, agent_id: &AgentId) -> usize {
        self.queues.lock().get(agent_id).map_or(0, Vec::len)
    }

    /// Number of handlers installed for `agent_id`.
    #[must_use]
    pub fn handler_count(&self, agent_id: &AgentId) -> usize {
        self.handlers.lock().get(agent_id).map_or(0, Vec::len)
    }

    fn check_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, message: Message) -> Result<(), TransportError> {
        self.check_open()?;

        // Queue first, then snapshot the handler chain. Locks are released
        // before any handler runs.
        let chain: Vec<MessageHandler> = {
            let mut queues = self.queues.lock();
            queues
                .entry(message.to.clone())
                .or_default()
                .push(message.clone());

            self.handlers
                .lock()
                .get(&message.to)
                .cloned()
                .unwrap_or_default()
        };

        trace!(id = %message.id, to = %message.to, handlers = chain.len(), "in-memory send");

        for handler in chain {
            handler(message.clone()).await;
        }

        Ok(())
    }

    async fn receive(&self, agent_id: &AgentId) -> Result<Vec<Message>, TransportError> {
        self.check_open()?;
        Ok(self.queues.lock().remove(agent_id).unwrap_or_default())
    }

    async fn subscribe(
        &self,
        agent_id: &AgentId,
        handler: MessageHandler,
    ) -> Result<(), TransportError> {
        self.check_open()?;
        self.handlers
            .lock()
            .entry(agent_id.clone())
            .or_default()
            .push(handler);
        Ok(())
    }

    async fn unsubscribe(&self, agent_id: &AgentId) -> Result<(), TransportError> {
        self.handlers.lock().remove(agent_id);
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::Release);
        self.queues.lock().clear();
        self.handlers.lock().clear();
        Ok(())
    }
}
