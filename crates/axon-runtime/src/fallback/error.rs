//! Fallback layer errors.
//!
//! These codes are the kernel's wire contract and therefore un-prefixed:
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`BreakerError::Open`] | `CIRCUIT_OPEN` | Yes (after the open timeout) |
//! | [`FallbackError::AgentNotFound`] | `AGENT_NOT_FOUND` | No |
//! | [`FallbackError::ExecutionFailed`] | `EXECUTION_FAILED` | Yes |
//! | [`FallbackError::FallbackAgentNotFound`] | `FALLBACK_AGENT_NOT_FOUND` | No |
//! | [`FallbackError::FallbackFailed`] | `FALLBACK_FAILED` | Yes |

use axon_agent::ErrorInfo;
use axon_types::{AgentId, ErrorCode};
use thiserror::Error;

/// Refusal raised by a circuit breaker gate.
#[derive(Debug, Clone, Error)]
pub enum BreakerError {
    /// The circuit is open; the wrapped call was not invoked.
    #[error("circuit open, retry after {remaining_ms}ms")]
    Open {
        /// Time until the breaker will probe again.
        remaining_ms: u64,
    },
}

impl ErrorCode for BreakerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "CIRCUIT_OPEN",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

impl From<&BreakerError> for ErrorInfo {
    fn from(err: &BreakerError) -> Self {
        ErrorInfo::new(err.code(), err.to_string())
    }
}

/// Failure produced by the fallback manager.
#[derive(Debug, Clone, Error)]
pub enum FallbackError {
    /// The primary agent id is not registered.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// The primary exhausted its retry sequence (or was refused by the
    /// circuit) and no viable fallback existed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The configured fallback agent id is not registered.
    #[error("fallback agent not found: {0}")]
    FallbackAgentNotFound(AgentId),

    /// The fallback agent exhausted its attempts.
    #[error("fallback failed after {attempts} attempts")]
    FallbackFailed {
        /// Attempts the fallback agent was given.
        attempts: u32,
    },
}

impl ErrorCode for FallbackError {
    fn code(&self) -> &'static str {
        match self {
            Self::AgentNotFound(_) => "AGENT_NOT_FOUND",
            Self::ExecutionFailed(_) => "EXECUTION_FAILED",
            Self::FallbackAgentNotFound(_) => "FALLBACK_AGENT_NOT_FOUND",
            Self::FallbackFailed { .. } => "FALLBACK_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::ExecutionFailed(_) | Self::FallbackFailed { .. })
    }
}

impl From<&FallbackError> for ErrorInfo {
    fn from(err: &FallbackError) -> Self {
        ErrorInfo::new(err.code(), err.to_string())
    }
}
