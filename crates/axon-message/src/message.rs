//! The unit of inter-agent traffic.

use crate::Priority;
use axon_types::{AgentId, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A message accepted by the bus.
///
/// After bus acceptance, `id`, `from`, `to`, `kind`, `priority`, and
/// `timestamp` are always present; `payload` is opaque to the kernel and
/// shape validation is the receiving agent's responsibility.
///
/// # Construction
///
/// Integrators normally do not build messages directly: the bus assigns
/// identity and timestamp in `Bus::send`. [`Message::new`] exists for
/// transports and tests that need a fully formed message.
///
/// # Example
///
/// ```
/// use axon_message::{Message, Priority};
/// use serde_json::json;
///
/// let msg = Message::new("a", "b", "task.created", json!({"k": 1}))
///     .with_correlation_id("corr-7");
///
/// assert_eq!(msg.from.as_str(), "a");
/// assert_eq!(msg.priority, Priority::Normal);
/// assert_eq!(msg.correlation_id.as_deref(), Some("corr-7"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Bus-assigned unique identity.
    pub id: MessageId,

    /// Sending endpoint.
    pub from: AgentId,

    /// Receiving endpoint.
    pub to: AgentId,

    /// Free-form message type, e.g. `"task.created"`.
    ///
    /// Named `kind` in Rust; serialized as `type` on the wire.
    #[serde(rename = "type")]
    pub kind: String,

    /// Opaque payload; the kernel never inspects it.
    pub payload: Value,

    /// Delivery priority hint.
    pub priority: Priority,

    /// Assignment time, set when the bus accepts the message.
    pub timestamp: DateTime<Utc>,

    /// Optional caller-supplied id linking related messages and executions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Optional id of the message this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,

    /// Optional free-form metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl Message {
    /// Creates a fully formed message with a fresh id and the current time.
    ///
    /// Priority defaults to [`Priority::Normal`]; use the `with_*` builders
    /// or [`Message::with_options`] to override.
    #[must_use]
    pub fn new(
        from: impl Into<AgentId>,
        to: impl Into<AgentId>,
        kind: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            id: MessageId::new(),
            from: from.into(),
            to: to.into(),
            kind: kind.into(),
            payload,
            priority: Priority::default(),
            timestamp: Utc::now(),
            correlation_id: None,
            reply_to: None,
            metadata: HashMap::new(),
        }
    }

    /// Applies the optional fields of [`SendOptions`].
    #[must_use]
    pub fn with_options(mut self, options: SendOptions) -> Self {
        if let Some(priority) = options.priority {
            self.priority = priority;
        }
        self.correlation_id = options.correlation_id;
        self.reply_to = options.reply_to;
        if let Some(metadata) = options.metadata {
            self.metadata = metadata;
        }
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets the replied-to message id.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: MessageId) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

/// Optional per-send settings.
///
/// Everything here defaults to "absent"; the bus fills `priority` with
/// [`Priority::Normal`] when unspecified.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Delivery priority; `None` means [`Priority::Normal`].
    pub priority: Option<Priority>,

    /// Correlation id propagated to the delivered message.
    pub correlation_id: Option<String>,

    /// Id of the message being replied to.
    pub reply_to: Option<MessageId>,

    /// Free-form metadata attached to the message.
    pub metadata: Option<HashMap<String, Value>>,
}

impl SendOptions {
    /// Options carrying only a correlation id.
    #[must_use]
    pub fn correlated(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Self::default()
        }
    }

    /// Options carrying only a priority.
    #[must_use]
    pub fn prioritized(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_defaults() {
        let msg = Message::new("a", "b", "t", json!({"v": 1}));
        assert_eq!(msg.priority, Priority::Normal);
        assert!(msg.correlation_id.is_none());
        assert!(msg.reply_to.is_none());
        assert!(msg.metadata.is_empty());
    }

    #[test]
    fn message_with_options() {
        let opts = SendOptions {
            priority: Some(Priority::High),
            correlation_id: Some("X".into()),
            reply_to: None,
            metadata: Some(HashMap::from([("k".to_string(), json!(true))])),
        };

        let msg = Message::new("a", "b", "t", Value::Null).with_options(opts);
        assert_eq!(msg.priority, Priority::High);
        assert_eq!(msg.correlation_id.as_deref(), Some("X"));
        assert_eq!(msg.metadata["k"], json!(true));
    }

    #[test]
    fn message_wire_round_trip() {
        let msg = Message::new("sender", "receiver", "task.created", json!({"k": 1}))
            .with_priority(Priority::Critical)
            .with_correlation_id("corr");

        let json = serde_json::to_string(&msg).unwrap();
        // The Rust-side `kind` field serializes as `type`.
        assert!(json.contains("\"type\":\"task.created\""));
        assert!(json.contains("\"priority\":\"CRITICAL\""));

        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, msg.id);
        assert_eq!(restored.from, msg.from);
        assert_eq!(restored.to, msg.to);
        assert_eq!(restored.kind, msg.kind);
        assert_eq!(restored.priority, msg.priority);
        assert_eq!(restored.timestamp, msg.timestamp);
        assert_eq!(restored.correlation_id, msg.correlation_id);
    }

    #[test]
    fn send_options_shortcuts() {
        let opts = SendOptions::correlated("X");
        assert_eq!(opts.correlation_id.as_deref(), Some("X"));
        assert!(opts.priority.is_none());

        let opts = SendOptions::prioritized(Priority::Low);
        assert_eq!(opts.priority, Some(Priority::Low));
    }

    #[test]
    fn reply_to_round_trip() {
        let original = Message::new("a", "b", "ask", Value::Null);
        let reply = Message::new("b", "a", "answer", Value::Null).with_reply_to(original.id);

        let json = serde_json::to_string(&reply).unwrap();
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.reply_to, Some(original.id));
    }
}
