//! Per-invocation execution context.

use axon_message::Message;
use axon_types::{AgentId, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Value passed through to user code on every execution.
///
/// The kernel treats a context as opaque: it builds one per invocation
/// (authoritative `agent_id`, fresh `request_id`, current `timestamp`) and
/// hands it to the agent body unchanged. Callers may only influence
/// `correlation_id` and `metadata`, via [`ContextOverrides`].
///
/// # Example
///
/// ```
/// use axon_agent::Context;
/// use axon_types::AgentId;
///
/// let ctx = Context::new(AgentId::new("worker")).with_correlation_id("trace-1");
/// assert_eq!(ctx.agent_id.as_str(), "worker");
/// assert_eq!(ctx.correlation_id.as_deref(), Some("trace-1"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Target agent of this invocation.
    pub agent_id: AgentId,

    /// Unique per execution; generated by the kernel.
    pub request_id: RequestId,

    /// Construction time.
    pub timestamp: DateTime<Utc>,

    /// Optional caller-supplied id linking related executions and messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Free-form metadata, passed through untouched.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Context {
    /// Creates a fresh context for one invocation of `agent_id`.
    #[must_use]
    pub fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            request_id: RequestId::new(),
            timestamp: Utc::now(),
            correlation_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Synthesizes a context for reacting to an inbound message.
    ///
    /// Carries the message's correlation id over and records the message
    /// identity in metadata so downstream logs can tie the execution back
    /// to its trigger.
    #[must_use]
    pub fn for_message(agent_id: AgentId, message: &Message) -> Self {
        let mut ctx = Self::new(agent_id);
        ctx.correlation_id = message.correlation_id.clone();
        ctx.metadata
            .insert("message_id".into(), Value::String(message.id.to_string()));
        ctx.metadata
            .insert("message_type".into(), Value::String(message.kind.clone()));
        ctx
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Inserts one metadata entry.
    #[must_use]
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Applies caller overrides. Only `correlation_id` and `metadata` are
    /// caller-suppliable; identity fields stay authoritative.
    #[must_use]
    pub fn apply(mut self, overrides: ContextOverrides) -> Self {
        if overrides.correlation_id.is_some() {
            self.correlation_id = overrides.correlation_id;
        }
        if let Some(metadata) = overrides.metadata {
            self.metadata = metadata;
        }
        self
    }
}

/// The caller-suppliable subset of [`Context`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextOverrides {
    /// Correlation id to stamp on the generated context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Metadata to stamp on the generated context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

impl ContextOverrides {
    /// Overrides carrying only a correlation id.
    #[must_use]
    pub fn correlated(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            metadata: None,
        }
    }
}
