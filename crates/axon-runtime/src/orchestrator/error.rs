//! Orchestrator errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`OrchestratorError::AgentNotFound`] | `AGENT_NOT_FOUND` | No |
//! | [`OrchestratorError::AlreadyRegistered`] | `ALREADY_REGISTERED` | No |
//! | [`OrchestratorError::MaxConcurrentLimit`] | `MAX_CONCURRENT_LIMIT` | Yes |
//! | [`OrchestratorError::Bus`] | inherited | inherited |
//!
//! The first three codes are the kernel's wire contract and therefore
//! un-prefixed.

use crate::BusError;
use axon_types::{AgentId, ErrorCode};
use thiserror::Error;

/// Failure of an orchestrator operation.
///
/// Execution failures are *not* represented here: `execute_agent` always
/// returns an `ExecutionResult`, never an error. This enum covers
/// registration and messaging surfaces.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The target agent id is not registered.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent with this id is already registered.
    #[error("agent already registered: {0}")]
    AlreadyRegistered(AgentId),

    /// The global admission cap is reached.
    #[error("concurrency limit reached ({limit} running)")]
    MaxConcurrentLimit {
        /// The configured cap.
        limit: usize,
    },

    /// A bus operation failed underneath the orchestrator.
    #[error(transparent)]
    Bus(#[from] BusError),
}

impl ErrorCode for OrchestratorError {
    fn code(&self) -> &'static str {
        match self {
            Self::AgentNotFound(_) => "AGENT_NOT_FOUND",
            Self::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            Self::MaxConcurrentLimit { .. } => "MAX_CONCURRENT_LIMIT",
            Self::Bus(inner) => inner.code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::AgentNotFound(_) | Self::AlreadyRegistered(_) => false,
            Self::MaxConcurrentLimit { .. } => true,
            Self::Bus(inner) => inner.is_recoverable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_types::assert_error_codes;

    fn contract_variants() -> Vec<OrchestratorError> {
        vec![
            OrchestratorError::AgentNotFound(AgentId::new("x")),
            OrchestratorError::AlreadyRegistered(AgentId::new("x")),
            OrchestratorError::MaxConcurrentLimit { limit: 10 },
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        // Wire-contract codes carry no prefix.
        assert_error_codes(&contract_variants(), "");
    }

    #[test]
    fn codes_verbatim() {
        assert_eq!(
            OrchestratorError::AgentNotFound(AgentId::new("x")).code(),
            "AGENT_NOT_FOUND"
        );
        assert_eq!(
            OrchestratorError::AlreadyRegistered(AgentId::new("x")).code(),
            "ALREADY_REGISTERED"
        );
        assert_eq!(
            OrchestratorError::MaxConcurrentLimit { limit: 1 }.code(),
            "MAX_CONCURRENT_LIMIT"
        );
    }

    #[test]
    fn bus_code_inherited() {
        let err = OrchestratorError::Bus(BusError::SendFailed("x".into()));
        assert_eq!(err.code(), "BUS_SEND_FAILED");
        assert!(err.is_recoverable());
    }
}
