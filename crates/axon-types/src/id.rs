//! Identifier types for the AXON kernel.
//!
//! Agent identity is a caller-chosen string; execution and message
//! identities are kernel-generated UUIDs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for an agent registered with an orchestrator.
///
/// The id is the sole identity key: two configurations with the same id
/// cannot coexist within one orchestrator, and all routing (execution,
/// messages, circuit state) is keyed by it.
///
/// Unlike [`RequestId`] and [`MessageId`], agent ids are chosen by the
/// integrator, not generated. They must be non-empty and should be stable
/// across process restarts so that transports and stores can key on them.
///
/// # Example
///
/// ```
/// use axon_types::AgentId;
///
/// let id = AgentId::new("ingest-worker");
/// assert_eq!(id.as_str(), "ingest-worker");
/// assert_eq!(id.to_string(), "ingest-worker");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates a new [`AgentId`] from a non-empty string.
    ///
    /// Emptiness is a caller bug, checked in debug builds.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "agent id must be non-empty");
        Self(id)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a single execution through the orchestrator.
///
/// Generated by the orchestrator when it builds the per-invocation
/// `Context`; unique per execution, including retries of the same agent.
///
/// # Example
///
/// ```
/// use axon_types::RequestId;
///
/// let a = RequestId::new();
/// let b = RequestId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - generated by the orchestrator only
impl RequestId {
    /// Creates a new [`RequestId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

// NOTE: RequestId intentionally does NOT implement Default. A defaulted
// request id would not correspond to any admitted execution.

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req:{}", self.0)
    }
}

/// Identifier assigned by the bus to every accepted message.
///
/// The id returned by a send is the id observed by the recipient; tests
/// and correlation logic rely on that round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - assigned by the bus only
impl MessageId {
    /// Creates a new [`MessageId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_round_trip() {
        let id = AgentId::new("worker-1");
        assert_eq!(id.as_str(), "worker-1");
        assert_eq!(format!("{id}"), "worker-1");
    }

    #[test]
    fn agent_id_from_impls() {
        let a: AgentId = "a".into();
        let b: AgentId = String::from("a").into();
        assert_eq!(a, b);
    }

    #[test]
    fn agent_id_serde_transparent() {
        let id = AgentId::new("worker-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"worker-1\"");

        let restored: AgentId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }

    #[test]
    fn request_ids_are_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn request_id_display_prefix() {
        let id = RequestId::new();
        assert!(id.to_string().starts_with("req:"));
    }

    #[test]
    fn message_ids_are_unique() {
        let a = MessageId::new();
        let b = MessageId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("msg:"));
    }

    #[test]
    fn message_id_serde_round_trip() {
        let id = MessageId::new();
        let json = serde_json::to_string(&id).unwrap();
        let restored: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }
}
