//! Out-of-process execution behind the Agent trait.
//!
//! A remote executor invokes a named agent body in another process. The
//! kernel does not treat it specially: [`RemoteAgent`] adapts any
//! executor into an ordinary [`Agent`], so registration, admission,
//! retry, and circuit protection all apply unchanged.

use axon_agent::{Agent, AgentConfig, AgentError, Context, ExecutionResult};
use axon_types::{AgentId, ErrorCode};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Transport-level failure of a remote invocation.
///
/// | Variant | Code | Recoverable |
/// |---------|------|-------------|
/// | [`RemoteError::Unreachable`] | `REMOTE_UNREACHABLE` | Yes |
/// | [`RemoteError::Protocol`] | `REMOTE_PROTOCOL` | No |
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The remote endpoint could not be reached.
    #[error("remote executor unreachable: {0}")]
    Unreachable(String),

    /// The remote endpoint answered with something unintelligible.
    #[error("remote protocol error: {0}")]
    Protocol(String),
}

impl ErrorCode for RemoteError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "REMOTE_UNREACHABLE",
            Self::Protocol(_) => "REMOTE_PROTOCOL",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Invokes a named agent body out of process.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Runs the named body with the given context and input.
    async fn invoke(
        &self,
        agent_id: &AgentId,
        ctx: &Context,
        input: Value,
    ) -> Result<ExecutionResult, RemoteError>;
}

/// Adapter making a [`RemoteExecutor`] just another [`Agent`].
pub struct RemoteAgent {
    config: AgentConfig,
    executor: Arc<dyn RemoteExecutor>,
}

impl RemoteAgent {
    /// Binds a configuration to an executor.
    #[must_use]
    pub fn new(config: AgentConfig, executor: Arc<dyn RemoteExecutor>) -> Self {
        Self { config, executor }
    }
}

#[async_trait]
impl Agent for RemoteAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, ctx: &Context, input: Value) -> Result<Value, AgentError> {
        let result = self
            .executor
            .invoke(&self.config.id, ctx, input)
            .await
            .map_err(|err| AgentError::Failed(err.to_string()))?;

        if result.success {
            Ok(result.data.unwrap_or(Value::Null))
        } else {
            let message = result
                .error
                .map_or_else(|| "remote failure without error info".to_string(), |e| e.to_string());
            Err(AgentError::Failed(message))
        }
    }
}
