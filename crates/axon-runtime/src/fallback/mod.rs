//! FallbackManager - circuit gate, bounded retry, and fallback agents.
//!
//! One [`CircuitBreaker`] per registered agent, composed around every
//! execution:
//!
//! ```text
//! execute_with_fallback(id, ctx, input, config)
//!   └─ circuit.gate(
//!        retry( handle.execute(ctx, input), agent retry policy )
//!      )
//!        │ raised (circuit open, or retries exhausted)
//!        ▼
//!   fallback agent enabled? ── yes ──► execute_fallback (plain bounded
//!        │ no                          retries, no backoff, no circuit)
//!        ▼
//!   EXECUTION_FAILED result carrying the underlying cause
//! ```
//!
//! The manager never observes or mutates an agent's status directly; it
//! interacts only through [`AgentHandle::execute`].

mod breaker;
mod error;
mod retry;

pub use breaker::{BreakerConfig, CircuitBreaker, CircuitSnapshot, CircuitState};
pub use error::{BreakerError, FallbackError};

use crate::observe::{EventPublisher, KernelEvent, NoopPublisher};
use axon_agent::{AgentHandle, Context, ErrorInfo, ExecutionMetrics, ExecutionResult};
use axon_types::AgentId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// How a failed primary is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    /// Circuit-gated primary with a fallback agent on exhaustion.
    #[default]
    CircuitBreaker,
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CircuitBreaker => write!(f, "circuit-breaker"),
        }
    }
}

/// Per-invocation fallback settings, built by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Whether a fallback agent may be invoked at all.
    pub enabled: bool,

    /// The fallback agent, from the primary's configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_agent: Option<AgentId>,

    /// Plain attempts granted to the fallback agent.
    pub max_attempts: u32,

    /// Strategy marker.
    pub strategy: FallbackStrategy,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_agent: None,
            max_attempts: 2,
            strategy: FallbackStrategy::CircuitBreaker,
        }
    }
}

/// Owns the agents it protects and one breaker per agent.
pub struct FallbackManager {
    agents: RwLock<HashMap<AgentId, Arc<AgentHandle>>>,
    breakers: RwLock<HashMap<AgentId, Arc<CircuitBreaker>>>,
    breaker_config: BreakerConfig,
    publisher: Arc<dyn EventPublisher>,
}

impl FallbackManager {
    /// Creates a manager whose breakers use `breaker_config`, with no
    /// event publisher.
    #[must_use]
    pub fn new(breaker_config: BreakerConfig) -> Self {
        Self::with_publisher(breaker_config, Arc::new(NoopPublisher))
    }

    /// Creates a manager publishing kernel events to `publisher`.
    #[must_use]
    pub fn with_publisher(
        breaker_config: BreakerConfig,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
            breakers: RwLock::new(HashMap::new()),
            breaker_config,
            publisher,
        }
    }

    /// Registers an agent and creates its circuit breaker.
    pub fn register(&self, handle: Arc<AgentHandle>) {
        let id = handle.id().clone();
        self.agents.write().insert(id.clone(), handle);
        self.breakers.write().insert(
            id,
            Arc::new(CircuitBreaker::new(self.breaker_config.clone())),
        );
    }

    /// Removes an agent and drops its breaker. Idempotent.
    pub fn unregister(&self, agent_id: &AgentId) {
        self.agents.write().remove(agent_id);
        self.breakers.write().remove(agent_id);
    }

    /// Removes every agent and breaker.
    pub fn clear(&self) {
        self.agents.write().clear();
        self.breakers.write().clear();
    }

    /// Current circuit state for an agent, if registered.
    #[must_use]
    pub fn circuit_state(&self, agent_id: &AgentId) -> Option<CircuitState> {
        self.breakers.read().get(agent_id).map(|b| b.state())
    }

    /// Point-in-time breaker counters for an agent, if registered.
    #[must_use]
    pub fn circuit_snapshot(&self, agent_id: &AgentId) -> Option<CircuitSnapshot> {
        self.breakers.read().get(agent_id).map(|b| b.snapshot())
    }

    /// Runs the primary under circuit and retry protection, falling back
    /// when configured.
    pub async fn execute_with_fallback(
        &self,
        agent_id: &AgentId,
        ctx: &Context,
        input: Value,
        config: &FallbackConfig,
    ) -> ExecutionResult {
        let (Some(handle), Some(breaker)) = (
            self.agents.read().get(agent_id).cloned(),
            self.breakers.read().get(agent_id).cloned(),
        ) else {
            let err = FallbackError::AgentNotFound(agent_id.clone());
            return ExecutionResult::failure(ErrorInfo::from(&err), ExecutionMetrics::default());
        };

        let policy = handle.config().retry_policy.unwrap_or_default();
        let started = Instant::now();
        let state_before = breaker.state();

        let attempt_handle = Arc::clone(&handle);
        let attempt_ctx = ctx.clone();
        let attempt_input = input.clone();
        let outcome = breaker
            .gate(retry::run_with_retry(&policy, move || {
                let handle = Arc::clone(&attempt_handle);
                let ctx = attempt_ctx.clone();
                let input = attempt_input.clone();
                async move { handle.execute(&ctx, input).await }
            }))
            .await;

        self.publish_circuit_transition(agent_id, state_before, breaker.state());

        let cause = match outcome {
            Ok(result) => return result,
            Err(cause) => cause,
        };

        if config.enabled {
            if let Some(fallback_id) = &config.fallback_agent {
                warn!(
                    agent = %agent_id,
                    fallback = %fallback_id,
                    cause = %cause.code,
                    "primary exhausted, invoking fallback"
                );
                self.publisher.publish(&KernelEvent::FallbackTriggered {
                    agent: agent_id.clone(),
                    fallback: fallback_id.clone(),
                    cause: cause.code.clone(),
                });
                return self
                    .execute_fallback(fallback_id, ctx, input, config.max_attempts)
                    .await;
            }
        }

        // A refused gate never ran the body; otherwise the whole retry
        // sequence was spent.
        let retries = if cause.code == "CIRCUIT_OPEN" {
            0
        } else {
            policy.attempts().saturating_sub(1)
        };
        let mut metrics = ExecutionMetrics::timed(started.elapsed());
        metrics.retry_count = Some(retries);

        let err = FallbackError::ExecutionFailed(cause.message.clone());
        ExecutionResult::failure(
            ErrorInfo::from(&err).with_details(json!({ "cause": cause.code })),
            metrics,
        )
    }

    /// Runs the fallback agent: up to `max_attempts` plain executions,
    /// no backoff, no circuit. First success wins.
    pub async fn execute_fallback(
        &self,
        fallback_id: &AgentId,
        ctx: &Context,
        input: Value,
        max_attempts: u32,
    ) -> ExecutionResult {
        let Some(handle) = self.agents.read().get(fallback_id).cloned() else {
            let err = FallbackError::FallbackAgentNotFound(fallback_id.clone());
            return ExecutionResult::failure(ErrorInfo::from(&err), ExecutionMetrics::default());
        };

        let attempts = max_attempts.max(1);
        let started = Instant::now();

        for attempt in 0..attempts {
            let result = handle.execute(ctx, input.clone()).await;
            if result.success {
                debug!(fallback = %fallback_id, attempt, "fallback succeeded");
                return result;
            }
        }

        let err = FallbackError::FallbackFailed { attempts };
        ExecutionResult::failure(
            ErrorInfo::from(&err),
            ExecutionMetrics::timed(started.elapsed()),
        )
    }

    fn publish_circuit_transition(
        &self,
        agent_id: &AgentId,
        before: CircuitState,
        after: CircuitState,
    ) {
        if before == after {
            return;
        }
        match after {
            CircuitState::Open => self.publisher.publish(&KernelEvent::CircuitOpened {
                agent: agent_id.clone(),
            }),
            CircuitState::Closed => self.publisher.publish(&KernelEvent::CircuitClosed {
                agent: agent_id.clone(),
            }),
            CircuitState::HalfOpen => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::RecordingPublisher;
    use axon_agent::testing::{AlwaysFailAgent, EchoAgent, FailNTimesAgent};
    use axon_agent::{AgentConfig, RetryPolicy};
    use serde_json::json;

    fn handle(agent: impl axon_agent::Agent + 'static) -> Arc<AgentHandle> {
        Arc::new(AgentHandle::new(Arc::new(agent)))
    }

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay_ms: 1,
            backoff_multiplier: 2.0,
            max_delay_ms: 5,
        }
    }

    fn manager() -> FallbackManager {
        FallbackManager::new(BreakerConfig::default())
    }

    #[tokio::test]
    async fn unknown_agent_fails_with_agent_not_found() {
        let mgr = manager();
        let ctx = Context::new(AgentId::new("ghost"));

        let result = mgr
            .execute_with_fallback(
                &AgentId::new("ghost"),
                &ctx,
                Value::Null,
                &FallbackConfig::default(),
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error_code(), Some("AGENT_NOT_FOUND"));
    }

    #[tokio::test]
    async fn success_passes_through_with_retry_count() {
        let mgr = manager();
        mgr.register(handle(EchoAgent::new("a")));

        let ctx = Context::new(AgentId::new("a"));
        let result = mgr
            .execute_with_fallback(
                &AgentId::new("a"),
                &ctx,
                json!({"v": 1}),
                &FallbackConfig::default(),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.data, Some(json!({"v": 1})));
        assert_eq!(result.metrics.retry_count, Some(0));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let mgr = manager();
        let config = AgentConfig::new("b", "B", "flaky").with_retry_policy(quick_policy(3));
        mgr.register(handle(FailNTimesAgent::with_config(config, 2)));

        let ctx = Context::new(AgentId::new("b"));
        let result = mgr
            .execute_with_fallback(
                &AgentId::new("b"),
                &ctx,
                Value::Null,
                &FallbackConfig::default(),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.metrics.retry_count, Some(2));
    }

    #[tokio::test]
    async fn exhaustion_without_fallback_is_execution_failed() {
        let mgr = manager();
        let config = AgentConfig::new("p", "P", "down").with_retry_policy(quick_policy(2));
        mgr.register(handle(AlwaysFailAgent::with_config(config)));

        let ctx = Context::new(AgentId::new("p"));
        let result = mgr
            .execute_with_fallback(
                &AgentId::new("p"),
                &ctx,
                Value::Null,
                &FallbackConfig {
                    enabled: false,
                    ..FallbackConfig::default()
                },
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error_code(), Some("EXECUTION_FAILED"));
        let details = result.error.unwrap().details.unwrap();
        assert_eq!(details["cause"], json!("AGENT_ERROR"));
    }

    #[tokio::test]
    async fn fallback_takes_over() {
        let publisher = Arc::new(RecordingPublisher::new());
        let publisher_dyn: Arc<dyn EventPublisher> = publisher.clone();
        let mgr = FallbackManager::with_publisher(BreakerConfig::default(), publisher_dyn);

        mgr.register(handle(AlwaysFailAgent::new("p")));
        mgr.register(handle(EchoAgent::with_config(AgentConfig::new(
            "f", "F", "echo",
        ))));

        let ctx = Context::new(AgentId::new("p"));
        let result = mgr
            .execute_with_fallback(
                &AgentId::new("p"),
                &ctx,
                json!({"fallback": true}),
                &FallbackConfig {
                    enabled: true,
                    fallback_agent: Some(AgentId::new("f")),
                    ..FallbackConfig::default()
                },
            )
            .await;

        assert!(result.success);
        assert_eq!(result.data, Some(json!({"fallback": true})));
        assert!(publisher.kinds().contains(&"fallback.triggered"));
    }

    #[tokio::test]
    async fn missing_fallback_agent_reported() {
        let mgr = manager();
        mgr.register(handle(AlwaysFailAgent::new("p")));

        let ctx = Context::new(AgentId::new("p"));
        let result = mgr
            .execute_with_fallback(
                &AgentId::new("p"),
                &ctx,
                Value::Null,
                &FallbackConfig {
                    enabled: true,
                    fallback_agent: Some(AgentId::new("ghost")),
                    ..FallbackConfig::default()
                },
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error_code(), Some("FALLBACK_AGENT_NOT_FOUND"));
    }

    #[tokio::test]
    async fn failing_fallback_reports_fallback_failed() {
        let mgr = manager();
        mgr.register(handle(AlwaysFailAgent::new("p")));
        mgr.register(handle(AlwaysFailAgent::new("f")));

        let ctx = Context::new(AgentId::new("p"));
        let result = mgr
            .execute_with_fallback(
                &AgentId::new("p"),
                &ctx,
                Value::Null,
                &FallbackConfig {
                    enabled: true,
                    fallback_agent: Some(AgentId::new("f")),
                    max_attempts: 2,
                    strategy: FallbackStrategy::CircuitBreaker,
                },
            )
            .await;

        assert!(!result.success);
        assert_eq!(result.error_code(), Some("FALLBACK_FAILED"));
    }

    #[tokio::test]
    async fn breaker_opens_and_publishes() {
        let publisher = Arc::new(RecordingPublisher::new());
        let publisher_dyn: Arc<dyn EventPublisher> = publisher.clone();
        let mgr = FallbackManager::with_publisher(
            BreakerConfig {
                threshold: 2,
                open_timeout_ms: 60_000,
                half_open_successes: 1,
            },
            publisher_dyn,
        );
        mgr.register(handle(AlwaysFailAgent::new("p")));

        let ctx = Context::new(AgentId::new("p"));
        let no_fallback = FallbackConfig {
            enabled: false,
            ..FallbackConfig::default()
        };

        for _ in 0..2 {
            mgr.execute_with_fallback(&AgentId::new("p"), &ctx, Value::Null, &no_fallback)
                .await;
        }

        assert_eq!(
            mgr.circuit_state(&AgentId::new("p")),
            Some(CircuitState::Open)
        );
        assert!(publisher.kinds().contains(&"circuit.breaker.opened"));

        // The gated call fails fast with the open-circuit cause.
        let result = mgr
            .execute_with_fallback(&AgentId::new("p"), &ctx, Value::Null, &no_fallback)
            .await;
        assert_eq!(result.error_code(), Some("EXECUTION_FAILED"));
        let details = result.error.unwrap().details.unwrap();
        assert_eq!(details["cause"], json!("CIRCUIT_OPEN"));
    }

    #[tokio::test]
    async fn unregister_drops_agent_and_breaker() {
        let mgr = manager();
        mgr.register(handle(EchoAgent::new("a")));
        assert!(mgr.circuit_state(&AgentId::new("a")).is_some());

        mgr.unregister(&AgentId::new("a"));
        assert!(mgr.circuit_state(&AgentId::new("a")).is_none());

        // Idempotent.
        mgr.unregister(&AgentId::new("a"));
    }

    #[test]
    fn strategy_display() {
        assert_eq!(FallbackStrategy::CircuitBreaker.to_string(), "circuit-breaker");
    }
}
