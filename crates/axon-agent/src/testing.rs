//! Test agents and a harness for exercising agents without the runtime.
//!
//! The stock agents here cover the shapes resilience tests need: always
//! succeed, always fail, fail N times then succeed. The harness frames
//! executions through a real [`AgentHandle`] and keeps a log suitable for
//! asserting on sequences.
//!
//! # Example
//!
//! ```
//! use axon_agent::testing::{AgentTestHarness, EchoAgent};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let mut harness = AgentTestHarness::new(EchoAgent::new("echo"));
//!
//! let result = harness.execute(json!({"msg": "hi"})).await;
//! assert!(result.success);
//! assert_eq!(harness.log().len(), 1);
//! # });
//! ```

use crate::{
    Agent, AgentConfig, AgentError, AgentHandle, AgentStatus, Context, ExecutionResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Agent whose body returns its input unchanged.
pub struct EchoAgent {
    config: AgentConfig,
}

impl EchoAgent {
    /// Creates an echo agent with the given id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            config: AgentConfig::new(id, id, "echo"),
        }
    }

    /// Creates an echo agent from a full configuration.
    #[must_use]
    pub fn with_config(config: AgentConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, _ctx: &Context, input: Value) -> Result<Value, AgentError> {
        Ok(input)
    }
}

/// Agent whose body always fails with `AGENT_ERROR`.
pub struct AlwaysFailAgent {
    config: AgentConfig,
    calls: AtomicU32,
}

impl AlwaysFailAgent {
    /// Creates a failing agent with the given id.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            config: AgentConfig::new(id, id, "failing"),
            calls: AtomicU32::new(0),
        }
    }

    /// Creates a failing agent from a full configuration.
    #[must_use]
    pub fn with_config(config: AgentConfig) -> Self {
        Self {
            config,
            calls: AtomicU32::new(0),
        }
    }

    /// How many times the body has been invoked.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for AlwaysFailAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, _ctx: &Context, _input: Value) -> Result<Value, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Err(AgentError::Failed(format!("permanent failure (call {n})")))
    }
}

/// Agent that fails its first `n` invocations, then succeeds.
///
/// The success payload is `{"attempt": <1-based call number>}`, so tests
/// can assert which attempt won.
pub struct FailNTimesAgent {
    config: AgentConfig,
    failures: u32,
    calls: AtomicU32,
}

impl FailNTimesAgent {
    /// Creates an agent that fails the first `failures` calls.
    #[must_use]
    pub fn new(id: &str, failures: u32) -> Self {
        Self {
            config: AgentConfig::new(id, id, "flaky"),
            failures,
            calls: AtomicU32::new(0),
        }
    }

    /// Creates a flaky agent from a full configuration.
    #[must_use]
    pub fn with_config(config: AgentConfig, failures: u32) -> Self {
        Self {
            config,
            failures,
            calls: AtomicU32::new(0),
        }
    }

    /// How many times the body has been invoked.
    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for FailNTimesAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, _ctx: &Context, _input: Value) -> Result<Value, AgentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(AgentError::Failed(format!("transient failure {call}")))
        } else {
            Ok(json!({ "attempt": call }))
        }
    }
}

/// Record of one harness execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Input passed to the body.
    pub input: Value,
    /// Whether the framed execution succeeded.
    pub success: bool,
    /// Failure code, when the execution failed.
    pub error_code: Option<String>,
    /// Wall-clock duration reported in the result metrics.
    pub elapsed_ms: u64,
}

/// Drives an agent through real lifecycle framing, without bus,
/// orchestrator, or fallback layer.
pub struct AgentTestHarness {
    handle: Arc<AgentHandle>,
    log: Vec<ExecutionRecord>,
}

impl AgentTestHarness {
    /// Wraps the agent in an [`AgentHandle`] and an empty log.
    #[must_use]
    pub fn new(agent: impl Agent + 'static) -> Self {
        Self {
            handle: Arc::new(AgentHandle::new(Arc::new(agent))),
            log: Vec::new(),
        }
    }

    /// Executes the agent with a fresh context and logs the outcome.
    pub async fn execute(&mut self, input: Value) -> ExecutionResult {
        let ctx = Context::new(self.handle.id().clone());
        let result = self.handle.execute(&ctx, input.clone()).await;

        self.log.push(ExecutionRecord {
            input,
            success: result.success,
            error_code: result.error_code().map(str::to_string),
            elapsed_ms: result.metrics.execution_time_ms,
        });

        result
    }

    /// The handle under test.
    #[must_use]
    pub fn handle(&self) -> &Arc<AgentHandle> {
        &self.handle
    }

    /// Current agent status.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        self.handle.status()
    }

    /// The execution log.
    #[must_use]
    pub fn log(&self) -> &[ExecutionRecord] {
        &self.log
    }

    /// Clears the execution log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_agent_round_trips() {
        let mut harness = AgentTestHarness::new(EchoAgent::new("echo"));
        let result = harness.execute(json!({"k": 1})).await;

        assert!(result.success);
        assert_eq!(result.data, Some(json!({"k": 1})));
        assert_eq!(harness.status(), AgentStatus::Completed);
    }

    #[tokio::test]
    async fn always_fail_agent_fails_and_counts() {
        let mut harness = AgentTestHarness::new(AlwaysFailAgent::new("down"));

        let result = harness.execute(Value::Null).await;
        assert!(!result.success);
        assert_eq!(result.error_code(), Some("AGENT_ERROR"));

        harness.execute(Value::Null).await;
        assert_eq!(harness.log().len(), 2);
        assert!(harness.log().iter().all(|r| !r.success));
    }

    #[tokio::test]
    async fn fail_n_times_agent_recovers() {
        let mut harness = AgentTestHarness::new(FailNTimesAgent::new("flaky", 2));

        assert!(!harness.execute(Value::Null).await.success);
        assert!(!harness.execute(Value::Null).await.success);

        let third = harness.execute(Value::Null).await;
        assert!(third.success);
        assert_eq!(third.data, Some(json!({"attempt": 3})));
    }

    #[tokio::test]
    async fn harness_log_records_codes() {
        let mut harness = AgentTestHarness::new(AlwaysFailAgent::new("down"));
        harness.execute(Value::Null).await;

        assert_eq!(harness.log()[0].error_code.as_deref(), Some("AGENT_ERROR"));

        harness.clear_log();
        assert!(harness.log().is_empty());
    }
}
