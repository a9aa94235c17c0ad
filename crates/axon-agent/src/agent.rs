//! The agent capability set.

use crate::{AgentConfig, AgentError, Context};
use axon_message::Message;
use axon_types::AgentId;
use async_trait::async_trait;
use serde_json::Value;

/// A named unit of user code hosted by the kernel.
///
/// Implementations provide a `run` body and may override how the agent
/// reacts to inbound messages. Everything else (status transitions,
/// metrics, error mapping, cleanup) is framing applied by
/// [`AgentHandle`](crate::AgentHandle); the agent value itself stays
/// stateless as far as the kernel is concerned.
///
/// # Required Methods
///
/// | Method | Purpose |
/// |--------|---------|
/// | `config` | Identity and policy (id, retry, fallback, ...) |
/// | `run` | The user body; may fail |
///
/// # Concurrency
///
/// Agents take `&self`: the kernel may drive two invocations of the same
/// registered id concurrently when the caller asks it to, so bodies keep
/// their mutable state behind interior mutability or externally.
///
/// # Example
///
/// ```
/// use axon_agent::{Agent, AgentConfig, AgentError, Context};
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
///
/// struct Classifier {
///     config: AgentConfig,
/// }
///
/// #[async_trait]
/// impl Agent for Classifier {
///     fn config(&self) -> &AgentConfig {
///         &self.config
///     }
///
///     async fn run(&self, _ctx: &Context, input: Value) -> Result<Value, AgentError> {
///         Ok(json!({ "label": input["text"].as_str().map_or("empty", |_| "text") }))
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's immutable configuration.
    fn config(&self) -> &AgentConfig;

    /// The agent's identity, from its configuration.
    fn id(&self) -> &AgentId {
        &self.config().id
    }

    /// The user body. Input and output are opaque to the kernel.
    async fn run(&self, ctx: &Context, input: Value) -> Result<Value, AgentError>;

    /// How this agent reacts to an inbound message.
    ///
    /// The default treats the message payload as execution input, the
    /// typical reaction. Override to route on `message.kind`, ignore
    /// certain types, or reply over a bus handle held by the agent.
    async fn on_message(&self, ctx: &Context, message: &Message) -> Result<Value, AgentError> {
        self.run(ctx, message.payload.clone()).await
    }

    /// Releases per-execution resources.
    ///
    /// Invoked by the lifecycle framing on every exit path: success,
    /// failure, and cancellation. Default is a no-op.
    fn cleanup(&self) {}
}
