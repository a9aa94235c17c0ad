//! Shared fixtures for the e2e suites.

#![allow(dead_code)]

use axon_agent::{Agent, AgentConfig, AgentError, Context};
use axon_message::{InMemoryTransport, Message, MessageHandler};
use axon_runtime::observe::{EventPublisher, RecordingPublisher};
use axon_runtime::{BreakerConfig, Bus, Orchestrator, OrchestratorConfig};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Bus over a fresh in-memory transport.
pub fn test_bus() -> Arc<Bus> {
    Arc::new(Bus::new(Arc::new(InMemoryTransport::new())))
}

/// Orchestrator with a recording publisher, default breakers.
pub fn observed_orchestrator(
    config: OrchestratorConfig,
) -> (Orchestrator, Arc<RecordingPublisher>, Arc<Bus>) {
    observed_orchestrator_with_breakers(config, BreakerConfig::default())
}

/// Orchestrator with a recording publisher and explicit breaker tuning.
pub fn observed_orchestrator_with_breakers(
    config: OrchestratorConfig,
    breakers: BreakerConfig,
) -> (Orchestrator, Arc<RecordingPublisher>, Arc<Bus>) {
    let bus = test_bus();
    let publisher = Arc::new(RecordingPublisher::new());
    let publisher_dyn: Arc<dyn EventPublisher> = publisher.clone();
    let orchestrator =
        Orchestrator::with_publisher(config, breakers, Arc::clone(&bus), publisher_dyn);
    (orchestrator, publisher, bus)
}

/// Agent that wraps its input as `{"processed": <input>}`, optionally
/// after a delay.
pub struct ProcessedAgent {
    config: AgentConfig,
    delay: Duration,
}

impl ProcessedAgent {
    pub fn new(id: &str) -> Self {
        Self {
            config: AgentConfig::new(id, id, "worker"),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_config(config: AgentConfig) -> Self {
        Self {
            config,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl Agent for ProcessedAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, _ctx: &Context, input: Value) -> Result<Value, AgentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(json!({ "processed": input }))
    }
}

/// Agent that returns a fixed value, for fallback scenarios.
pub struct FixedAgent {
    config: AgentConfig,
    value: Value,
}

impl FixedAgent {
    pub fn new(id: &str, value: Value) -> Self {
        Self {
            config: AgentConfig::new(id, id, "fixed"),
            value,
        }
    }
}

#[async_trait]
impl Agent for FixedAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, _ctx: &Context, _input: Value) -> Result<Value, AgentError> {
        Ok(self.value.clone())
    }
}

/// Agent that records every payload it processes.
pub struct CollectingAgent {
    config: AgentConfig,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl CollectingAgent {
    pub fn new(id: &str) -> (Self, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let agent = Self {
            config: AgentConfig::new(id, id, "collector"),
            seen: Arc::clone(&seen),
        };
        (agent, seen)
    }
}

#[async_trait]
impl Agent for CollectingAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn run(&self, _ctx: &Context, input: Value) -> Result<Value, AgentError> {
        self.seen.lock().push(input);
        Ok(Value::Null)
    }
}

/// Transport-level handler that records delivered messages.
pub fn recording_handler() -> (MessageHandler, Arc<Mutex<Vec<Message>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let handler: MessageHandler = Arc::new(move |message| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().push(message);
        })
    });
    (handler, seen)
}
