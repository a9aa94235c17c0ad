//! Orchestrator - registration, admission control, execution delegation,
//! message routing.
//!
//! The orchestrator is the top-level facade. It owns the set of
//! registered agents and the [`FallbackManager`]; it borrows a [`Bus`]
//! whose transport outlives it.
//!
//! # Admission
//!
//! `execute_agent` performs an atomic check-and-insert against the
//! running set: the cap can never be violated by a burst, and an RAII
//! guard removes the id again on every exit path: result, panic capture
//! below, or cancellation of the call future.
//!
//! # Message Routing
//!
//! Registration installs one bus handler per agent that forwards each
//! delivered message to the agent's lifecycle framing. Handler failures
//! are caught and logged; they never propagate back into the transport's
//! delivery path, so one failing agent cannot break delivery for its
//! siblings.

mod config;
mod error;

pub use config::OrchestratorConfig;
pub use error::OrchestratorError;

use crate::fallback::{
    BreakerConfig, CircuitSnapshot, CircuitState, FallbackConfig, FallbackManager,
    FallbackStrategy,
};
use crate::observe::{EventPublisher, KernelEvent, NoopPublisher};
use crate::Bus;
use axon_agent::{
    Agent, AgentHandle, AgentStatus, Context, ContextOverrides, ErrorInfo, ExecutionMetrics,
    ExecutionResult,
};
use axon_message::{Message, MessageHandler, SendOptions};
use axon_types::{AgentId, ErrorCode, MessageId};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Top-level facade over registration, admission, execution, and routing.
///
/// All methods take `&self`; the orchestrator is usually shared as an
/// `Arc` across tasks.
///
/// # Example
///
/// ```
/// use axon_agent::testing::EchoAgent;
/// use axon_message::InMemoryTransport;
/// use axon_runtime::{Bus, Orchestrator, OrchestratorConfig};
/// use axon_types::AgentId;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let bus = Arc::new(Bus::new(Arc::new(InMemoryTransport::new())));
/// let orchestrator = Orchestrator::new(OrchestratorConfig::default(), bus);
///
/// orchestrator
///     .register_agent(Arc::new(EchoAgent::new("echo")))
///     .await
///     .unwrap();
///
/// let result = orchestrator
///     .execute_agent(&AgentId::new("echo"), json!({"v": 1}), None)
///     .await;
/// assert!(result.success);
/// # });
/// ```
pub struct Orchestrator {
    config: OrchestratorConfig,
    agents: RwLock<HashMap<AgentId, Arc<AgentHandle>>>,
    fallback: FallbackManager,
    bus: Arc<Bus>,
    running: Arc<Mutex<HashSet<AgentId>>>,
    publisher: Arc<dyn EventPublisher>,
}

impl Orchestrator {
    /// Creates an orchestrator with default breakers and no event
    /// publisher.
    #[must_use]
    pub fn new(config: OrchestratorConfig, bus: Arc<Bus>) -> Self {
        Self::with_publisher(
            config,
            BreakerConfig::default(),
            bus,
            Arc::new(NoopPublisher),
        )
    }

    /// Creates a fully parameterized orchestrator.
    #[must_use]
    pub fn with_publisher(
        config: OrchestratorConfig,
        breaker_config: BreakerConfig,
        bus: Arc<Bus>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            agents: RwLock::new(HashMap::new()),
            fallback: FallbackManager::with_publisher(breaker_config, Arc::clone(&publisher)),
            bus,
            running: Arc::new(Mutex::new(HashSet::new())),
            publisher,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The bus this orchestrator routes through.
    #[must_use]
    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    /// Registers an agent, creates its circuit breaker, and subscribes
    /// it to its inbound messages.
    ///
    /// # Errors
    ///
    /// `ALREADY_REGISTERED` when the id is taken; a bus error when the
    /// subscription fails (the registration is rolled back).
    pub async fn register_agent(&self, agent: Arc<dyn Agent>) -> Result<(), OrchestratorError> {
        let id = agent.id().clone();
        let handle = Arc::new(AgentHandle::new(agent));

        {
            let mut agents = self.agents.write();
            if agents.contains_key(&id) {
                return Err(OrchestratorError::AlreadyRegistered(id));
            }
            agents.insert(id.clone(), Arc::clone(&handle));
        }
        self.fallback.register(Arc::clone(&handle));

        let handler = self.message_handler(Arc::clone(&handle));
        if let Err(err) = self.bus.subscribe(&id, handler).await {
            self.agents.write().remove(&id);
            self.fallback.unregister(&id);
            return Err(err.into());
        }

        debug!(agent = %id, "agent registered");
        Ok(())
    }

    /// Removes an agent from the registry, the bus, and the running set.
    /// Idempotent.
    pub async fn unregister_agent(&self, agent_id: &AgentId) -> Result<(), OrchestratorError> {
        self.agents.write().remove(agent_id);
        self.fallback.unregister(agent_id);
        self.running.lock().remove(agent_id);
        self.bus.unsubscribe(agent_id).await?;

        debug!(agent = %agent_id, "agent unregistered");
        Ok(())
    }

    /// Executes a registered agent under admission control and the full
    /// resilience composition.
    ///
    /// Never raises: every failure is returned as a failure
    /// [`ExecutionResult`] with a stable code (`AGENT_NOT_FOUND`,
    /// `MAX_CONCURRENT_LIMIT`, `EXECUTION_FAILED`, ...).
    ///
    /// `overrides` may supply `correlation_id` and `metadata`; the
    /// generated `agent_id` and `request_id` are authoritative.
    pub async fn execute_agent(
        &self,
        agent_id: &AgentId,
        input: Value,
        overrides: Option<ContextOverrides>,
    ) -> ExecutionResult {
        let Some(handle) = self.agents.read().get(agent_id).cloned() else {
            let err = OrchestratorError::AgentNotFound(agent_id.clone());
            return ExecutionResult::failure(
                ErrorInfo::new(err.code(), err.to_string()),
                ExecutionMetrics::default(),
            );
        };

        // Atomic check-and-insert; the guard removes the id on drop, so
        // removal is guaranteed even if this future is cancelled.
        let _guard = {
            let mut running = self.running.lock();
            if running.len() >= self.config.max_concurrent_agents {
                let err = OrchestratorError::MaxConcurrentLimit {
                    limit: self.config.max_concurrent_agents,
                };
                warn!(agent = %agent_id, limit = self.config.max_concurrent_agents, "admission refused");
                return ExecutionResult::failure(
                    ErrorInfo::new(err.code(), err.to_string()),
                    ExecutionMetrics::default(),
                );
            }
            running.insert(agent_id.clone());
            RunningGuard {
                running: Arc::clone(&self.running),
                agent_id: agent_id.clone(),
            }
        };

        let mut ctx = Context::new(agent_id.clone());
        if let Some(overrides) = overrides {
            ctx = ctx.apply(overrides);
        }

        self.publisher.publish(&KernelEvent::AgentStarted {
            agent: agent_id.clone(),
            request: ctx.request_id,
        });

        let fallback_config = FallbackConfig {
            enabled: self.config.fallback_enabled,
            fallback_agent: handle.config().fallback_agent,
            max_attempts: 2,
            strategy: FallbackStrategy::CircuitBreaker,
        };

        let result = self
            .fallback
            .execute_with_fallback(agent_id, &ctx, input, &fallback_config)
            .await;

        if result.success {
            self.publisher.publish(&KernelEvent::AgentCompleted {
                agent: agent_id.clone(),
                request: ctx.request_id,
                execution_time_ms: result.metrics.execution_time_ms,
            });
        } else {
            self.publisher.publish(&KernelEvent::AgentFailed {
                agent: agent_id.clone(),
                request: ctx.request_id,
                code: result
                    .error_code()
                    .unwrap_or("UNKNOWN_ERROR")
                    .to_string(),
            });
        }

        result
    }

    /// Sends one message through the bus.
    pub async fn send_message(
        &self,
        from: impl Into<AgentId>,
        to: impl Into<AgentId>,
        kind: impl Into<String>,
        payload: Value,
        options: SendOptions,
    ) -> Result<MessageId, OrchestratorError> {
        let from = from.into();
        let to = to.into();

        let id = self
            .bus
            .send(from.clone(), to.clone(), kind, payload, options)
            .await?;

        self.publisher
            .publish(&KernelEvent::MessageSent { id, from, to });
        Ok(id)
    }

    /// Broadcasts through the bus; see [`Bus::broadcast`] for the
    /// partial-failure contract.
    pub async fn broadcast_message(
        &self,
        from: impl Into<AgentId>,
        recipients: &[AgentId],
        kind: impl Into<String>,
        payload: Value,
        options: SendOptions,
    ) -> Result<Vec<MessageId>, crate::BroadcastError> {
        let from = from.into();
        let ids = self
            .bus
            .broadcast(from.clone(), recipients, kind, payload, options)
            .await?;

        for (id, to) in ids.iter().zip(recipients) {
            self.publisher.publish(&KernelEvent::MessageSent {
                id: *id,
                from: from.clone(),
                to: to.clone(),
            });
        }
        Ok(ids)
    }

    /// Status of a registered agent.
    #[must_use]
    pub fn agent_status(&self, agent_id: &AgentId) -> Option<AgentStatus> {
        self.agents.read().get(agent_id).map(|h| h.status())
    }

    /// Circuit state of a registered agent.
    #[must_use]
    pub fn circuit_state(&self, agent_id: &AgentId) -> Option<CircuitState> {
        self.fallback.circuit_state(agent_id)
    }

    /// Breaker counters of a registered agent.
    #[must_use]
    pub fn circuit_snapshot(&self, agent_id: &AgentId) -> Option<CircuitSnapshot> {
        self.fallback.circuit_snapshot(agent_id)
    }

    /// Number of executions currently in the running region.
    #[must_use]
    pub fn running_agent_count(&self) -> usize {
        self.running.lock().len()
    }

    /// Ids of all registered agents, sorted.
    #[must_use]
    pub fn registered_agents(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agents.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// The lifecycle handle of a registered agent, for suspend/resume
    /// and direct status access.
    #[must_use]
    pub fn agent_handle(&self, agent_id: &AgentId) -> Option<Arc<AgentHandle>> {
        self.agents.read().get(agent_id).cloned()
    }

    /// Unsubscribes every agent, clears the registry and the running
    /// set. Safe to call multiple times.
    pub async fn shutdown(&self) {
        let ids: Vec<AgentId> = self.agents.read().keys().cloned().collect();
        for id in &ids {
            if let Err(err) = self.bus.unsubscribe(id).await {
                warn!(agent = %id, error = %err, "unsubscribe during shutdown failed");
            }
        }

        self.agents.write().clear();
        self.fallback.clear();
        self.running.lock().clear();
        debug!(agents = ids.len(), "orchestrator shut down");
    }

    fn message_handler(&self, handle: Arc<AgentHandle>) -> MessageHandler {
        let publisher = Arc::clone(&self.publisher);
        Arc::new(move |message: Message| {
            let handle = Arc::clone(&handle);
            let publisher = Arc::clone(&publisher);
            Box::pin(async move {
                // Failures are caught here and reported; raising into the
                // transport's delivery loop would break siblings.
                let result = handle.handle_message(&message).await;
                if !result.success {
                    warn!(
                        agent = %handle.id(),
                        message = %message.id,
                        code = result.error_code().unwrap_or("UNKNOWN_ERROR"),
                        "message handler failed"
                    );
                }
                publisher.publish(&KernelEvent::MessageReceived {
                    id: message.id,
                    agent: handle.id().clone(),
                    success: result.success,
                });
            })
        })
    }
}

struct RunningGuard {
    running: Arc<Mutex<HashSet<AgentId>>>,
    agent_id: AgentId,
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.running.lock().remove(&self.agent_id);
    }
}
