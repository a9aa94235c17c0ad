//! The pluggable medium that conveys messages between agents.

use crate::{Message, TransportError};
use axon_types::AgentId;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Push-delivery callback installed via [`Transport::subscribe`].
///
/// Handlers receive an owned copy of every message addressed to their
/// agent. A transport must never invoke a handler while holding one of its
/// own locks: a handler is free to call back into the transport (e.g. to
/// send a reply) without deadlocking.
///
/// Failures inside a handler are the subscriber's problem; the handler
/// signature is infallible so a misbehaving subscriber cannot break
/// delivery to its siblings.
pub type MessageHandler = Arc<dyn Fn(Message) -> BoxFuture<'static, ()> + Send + Sync>;

/// A medium that moves [`Message`] values between named endpoints.
///
/// Implement this trait to integrate a new medium (queue-based, RPC-based,
/// ...). The kernel ships [`InMemoryTransport`](crate::InMemoryTransport)
/// as the reference implementation.
///
/// # Contract
///
/// | Operation | Guarantee |
/// |-----------|-----------|
/// | `send` | Delivers to the endpoint named by `message.to` |
/// | `receive` | Drains currently available messages for one agent |
/// | `subscribe` | Appends a handler; each delivered message is offered to every handler in registration order |
/// | `unsubscribe` | Removes all handlers for the agent and stops push delivery |
/// | `cleanup` | Releases background resources (pollers); default no-op |
///
/// A remote transport may be asynchronous and poll on an interval (the
/// interval is a transport parameter, not a kernel concern). It must
/// preserve per-sender ordering between any one sender and one recipient
/// when the underlying medium preserves it, and must never reorder
/// messages of the same priority from the same sender. The kernel only
/// requires that subscribed handlers eventually see every message
/// addressed to their agent.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers `message` to the endpoint named by `message.to`.
    async fn send(&self, message: Message) -> Result<(), TransportError>;

    /// Drains and returns the currently available messages for `agent_id`.
    async fn receive(&self, agent_id: &AgentId) -> Result<Vec<Message>, TransportError>;

    /// Installs a push handler for `agent_id`.
    ///
    /// Multiple subscribes for the same agent append handlers.
    async fn subscribe(
        &self,
        agent_id: &AgentId,
        handler: MessageHandler,
    ) -> Result<(), TransportError>;

    /// Removes all handlers for `agent_id` and stops push delivery.
    ///
    /// Idempotent: unsubscribing an agent with no handlers is a no-op.
    async fn unsubscribe(&self, agent_id: &AgentId) -> Result<(), TransportError>;

    /// Releases resources owned by the transport (background pollers,
    /// connections). Default implementation does nothing.
    async fn cleanup(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
