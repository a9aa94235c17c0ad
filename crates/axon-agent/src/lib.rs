//! Agent contract and lifecycle framing for the AXON kernel.
//!
//! An agent is a named unit of user code: a [`run`](Agent::run) body plus
//! an optional message reaction ([`on_message`](Agent::on_message)). The
//! kernel wraps every invocation in lifecycle framing (status
//! transitions, metric collection, error mapping, cleanup) provided by
//! [`AgentHandle`], not by a superclass.
//!
//! # Division of Labor
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │            Orchestrator (axon-runtime)                    │
//! │  admission · context construction · retry · circuit       │
//! └───────────────────────────────────────────────────────────┘
//!                            │ execute(ctx, input)
//!                            ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                      AgentHandle                          │
//! │  Idle → Running → Completed/Failed · metrics · cleanup    │
//! └───────────────────────────────────────────────────────────┘
//!                            │ run(ctx, input)
//!                            ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                  impl Agent (user code)                   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AgentHandle::execute`] itself never retries, times out, or consults
//! a circuit breaker; that is the fallback layer's job. The handle's only
//! promises are the status transitions of [`AgentStatus`], a populated
//! [`ExecutionMetrics`], mapping of every failure (including panics) to a
//! failure [`ExecutionResult`], and [`Agent::cleanup`] on every exit path
//! on success, failure, and cancellation alike.
//!
//! # Example
//!
//! ```
//! use axon_agent::{Agent, AgentConfig, AgentError, AgentHandle, AgentStatus, Context};
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! struct Doubler {
//!     config: AgentConfig,
//! }
//!
//! #[async_trait]
//! impl Agent for Doubler {
//!     fn config(&self) -> &AgentConfig {
//!         &self.config
//!     }
//!
//!     async fn run(&self, _ctx: &Context, input: Value) -> Result<Value, AgentError> {
//!         let n = input["n"]
//!             .as_i64()
//!             .ok_or_else(|| AgentError::Failed("expected {\"n\": int}".into()))?;
//!         Ok(json!({ "n": n * 2 }))
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let agent = Doubler {
//!     config: AgentConfig::new("doubler", "Doubler", "math"),
//! };
//! let handle = AgentHandle::new(Arc::new(agent));
//!
//! let ctx = Context::new(handle.id().clone());
//! let result = handle.execute(&ctx, json!({"n": 21})).await;
//!
//! assert!(result.success);
//! assert_eq!(result.data, Some(json!({"n": 42})));
//! assert_eq!(handle.status(), AgentStatus::Completed);
//! # });
//! ```

mod agent;
mod config;
mod context;
mod error;
mod handle;
mod result;
mod status;
pub mod testing;

pub use agent::Agent;
pub use config::{AgentConfig, RetryPolicy};
pub use context::{Context, ContextOverrides};
pub use error::AgentError;
pub use handle::AgentHandle;
pub use result::{ErrorInfo, ExecutionMetrics, ExecutionResult};
pub use status::AgentStatus;
