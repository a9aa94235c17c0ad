//! Execution and routing runtime for the AXON kernel.
//!
//! This crate assembles the SDK layer (`axon-types`, `axon-message`,
//! `axon-agent`) into the running system:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        Orchestrator                           │
//! │   registration · admission cap · context construction ·      │
//! │   bus subscriptions · shutdown                                │
//! └───────────────────────────────────────────────────────────────┘
//!         │ execute                         │ send / broadcast
//!         ▼                                 ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      FallbackManager     │   │             Bus              │
//! │  circuit gate → retry →  │   │  identity · defaults ·       │
//! │  execute → fallback      │   │  fan-out · handler chains    │
//! └──────────────────────────┘   └──────────────────────────────┘
//!         │                                 │
//!         ▼                                 ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │  AgentHandle (framing)   │   │     Transport (pluggable)    │
//! └──────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! # Execution Path
//!
//! `Orchestrator::execute_agent` → admission check →
//! `FallbackManager::execute_with_fallback` → `CircuitBreaker::gate` →
//! retry loop → `AgentHandle::execute` → user `run` → `ExecutionResult`.
//!
//! # Message Path
//!
//! `Bus::send` → `Transport::send` → delivery → subscribed handler →
//! `AgentHandle::handle_message`.
//!
//! # Failure Contract
//!
//! Nothing on the execution path raises out of an orchestrator call: every
//! failure becomes an [`ExecutionResult`](axon_agent::ExecutionResult)
//! with a stable code. Internally, the retry and circuit layers raise
//! failures at their boundary to talk to each other; externally the kernel
//! only speaks results.

mod bus;
mod fallback;
pub mod observe;
mod orchestrator;

pub use bus::{BroadcastError, Bus, BusError};
pub use fallback::{
    BreakerConfig, BreakerError, CircuitBreaker, CircuitSnapshot, CircuitState, FallbackConfig,
    FallbackError, FallbackManager, FallbackStrategy,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorError};
