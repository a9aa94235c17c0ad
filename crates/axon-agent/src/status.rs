//! Agent execution status.
//!
//! # Status Lifecycle
//!
//! ```text
//!        execute()           success
//! Idle ───────────► Running ─────────► Completed ──┐
//!  ▲                   │                           │ (reuse)
//!  │                   │ failure                   │
//!  │                   ▼                           │
//!  ├─────────────── Failed ◄───────────────────────┘
//!  │ resume()
//! Suspended ◄── suspend() (from any state)
//! ```

use serde::{Deserialize, Serialize};

/// Current execution state of an agent, as observed on its handle.
///
/// # State Categories
///
/// | Category | States | Meaning |
/// |----------|--------|---------|
/// | Ready | `Idle` | Can accept an execution |
/// | Active | `Running` | Body in flight |
/// | Settled | `Completed`, `Failed` | Last execution's outcome; may return to `Idle` for reuse |
/// | Held | `Suspended` | Forced out of rotation until `resume()` |
///
/// # Example
///
/// ```
/// use axon_agent::AgentStatus;
///
/// assert!(AgentStatus::Idle.is_ready());
/// assert!(AgentStatus::Running.is_active());
/// assert!(AgentStatus::Failed.is_settled());
/// assert_eq!(AgentStatus::default(), AgentStatus::Idle);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    /// Ready to accept an execution.
    #[default]
    Idle,

    /// An execution is in flight.
    Running,

    /// The most recent execution succeeded.
    Completed,

    /// The most recent execution failed (error or panic).
    Failed,

    /// Forced out of rotation via `suspend()`; only `resume()` leaves
    /// this state.
    Suspended,
}

impl AgentStatus {
    /// Returns `true` if the agent can accept an execution.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` if an execution is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns `true` if the status reflects a finished execution.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Suspended => write!(f, "suspended"),
        }
    }
}
