//! Agent body errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`AgentError::Failed`] | `AGENT_ERROR` | Yes |
//! | [`AgentError::Unknown`] | `UNKNOWN_ERROR` | No |
//!
//! Both codes are part of the kernel's wire contract and therefore
//! un-prefixed.

use crate::ErrorInfo;
use axon_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by an agent's `run` body.
///
/// `Failed` is the ordinary path: the body recognized a problem and said
/// so. `Unknown` is the catch-all the lifecycle framing uses when it
/// captures a failure the body never returned (a panic).
///
/// # Example
///
/// ```
/// use axon_agent::AgentError;
/// use axon_types::ErrorCode;
///
/// let err = AgentError::Failed("upstream returned 503".into());
/// assert_eq!(err.code(), "AGENT_ERROR");
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum AgentError {
    /// The body failed and reported why.
    #[error("agent execution failed: {0}")]
    Failed(String),

    /// A non-standard failure value was captured (panic payload or other
    /// value the body never returned).
    #[error("unknown agent failure: {0}")]
    Unknown(String),
}

impl ErrorCode for AgentError {
    fn code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "AGENT_ERROR",
            Self::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<&AgentError> for ErrorInfo {
    fn from(err: &AgentError) -> Self {
        ErrorInfo::new(err.code(), err.to_string())
    }
}
