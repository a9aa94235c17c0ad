//! Optional observer surfaces around the kernel.
//!
//! Nothing in this module influences scheduling: publishers and stores
//! watch the kernel, they do not steer it. Publisher failures never fail
//! the originating operation, which is why [`EventPublisher::publish`]
//! is infallible; implementations swallow and log their own errors.

mod remote;
mod store;

pub use remote::{RemoteAgent, RemoteError, RemoteExecutor};
pub use store::{AgentStateRecord, InMemoryStateStore, StateStore, StoreError};

use axon_types::{AgentId, MessageId, RequestId};
use parking_lot::Mutex;
use serde::Serialize;

/// Observable kernel event.
///
/// # Event Kinds
///
/// | Variant | `kind()` |
/// |---------|----------|
/// | `AgentStarted` | `agent.started` |
/// | `AgentCompleted` | `agent.completed` |
/// | `AgentFailed` | `agent.failed` |
/// | `MessageSent` | `message.sent` |
/// | `MessageReceived` | `message.received` |
/// | `FallbackTriggered` | `fallback.triggered` |
/// | `CircuitOpened` | `circuit.breaker.opened` |
/// | `CircuitClosed` | `circuit.breaker.closed` |
#[derive(Debug, Clone, Serialize)]
pub enum KernelEvent {
    /// An admitted execution entered the running region.
    AgentStarted {
        /// Executing agent.
        agent: AgentId,
        /// The execution's request id.
        request: RequestId,
    },

    /// An execution finished successfully.
    AgentCompleted {
        /// Executing agent.
        agent: AgentId,
        /// The execution's request id.
        request: RequestId,
        /// Wall-clock duration from the result metrics.
        execution_time_ms: u64,
    },

    /// An execution finished with a failure result.
    AgentFailed {
        /// Executing agent.
        agent: AgentId,
        /// The execution's request id.
        request: RequestId,
        /// Stable failure code.
        code: String,
    },

    /// The bus accepted and delivered a message.
    MessageSent {
        /// Assigned message id.
        id: MessageId,
        /// Sender.
        from: AgentId,
        /// Recipient.
        to: AgentId,
    },

    /// A subscribed agent processed an inbound message.
    MessageReceived {
        /// Message id.
        id: MessageId,
        /// Receiving agent.
        agent: AgentId,
        /// Whether the handler execution succeeded.
        success: bool,
    },

    /// A primary agent was exhausted and its fallback invoked.
    FallbackTriggered {
        /// The exhausted primary.
        agent: AgentId,
        /// The fallback taking over.
        fallback: AgentId,
        /// Code of the failure that triggered the fallback.
        cause: String,
    },

    /// An agent's circuit transitioned to open.
    CircuitOpened {
        /// The gated agent.
        agent: AgentId,
    },

    /// An agent's circuit recovered to closed.
    CircuitClosed {
        /// The gated agent.
        agent: AgentId,
    },
}

impl KernelEvent {
    /// The stable dotted event kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentStarted { .. } => "agent.started",
            Self::AgentCompleted { .. } => "agent.completed",
            Self::AgentFailed { .. } => "agent.failed",
            Self::MessageSent { .. } => "message.sent",
            Self::MessageReceived { .. } => "message.received",
            Self::FallbackTriggered { .. } => "fallback.triggered",
            Self::CircuitOpened { .. } => "circuit.breaker.opened",
            Self::CircuitClosed { .. } => "circuit.breaker.closed",
        }
    }
}

/// Sink for kernel events.
///
/// Implementations must not block the calling path and must not fail it:
/// the signature is infallible on purpose. An implementation that talks
/// to an external system should buffer internally and log its own
/// delivery problems.
pub trait EventPublisher: Send + Sync {
    /// Observes one event.
    fn publish(&self, event: &KernelEvent);
}

/// Publisher that drops every event. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: &KernelEvent) {}
}

/// Publisher that records events in memory, for tests and introspection.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<KernelEvent>>,
}

impl RecordingPublisher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<KernelEvent> {
        self.events.lock().clone()
    }

    /// The kinds of all recorded events, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(KernelEvent::kind).collect()
    }

    /// Clears the recording.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &KernelEvent) {
        self.events.lock().push(event.clone());
    }
}
