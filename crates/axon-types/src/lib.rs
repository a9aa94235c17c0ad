//! Core types for the AXON kernel.
//!
//! This crate is the leaf of the workspace: identifier types shared by
//! every other crate, plus the unified error-code contract.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SDK Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  axon-types    : AgentId, RequestId, MessageId, ErrorCode   │
//! │  axon-message  : Message, Priority, Transport               │
//! │  axon-agent    : Agent trait, Context, ExecutionResult      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  axon-runtime  : Bus, CircuitBreaker, FallbackManager,      │
//! │                  Orchestrator               ◄── above HERE   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identity Model
//!
//! | Type | Chosen by | Representation |
//! |------|-----------|----------------|
//! | [`AgentId`] | Integrator | Stable non-empty string |
//! | [`RequestId`] | Orchestrator | UUID v4, unique per execution |
//! | [`MessageId`] | Bus | UUID v4, unique per accepted message |
//!
//! Agent identity is deliberately a caller-chosen string: agents are
//! registered, addressed, and routed by name, and the same id must mean
//! the same agent across process restarts.
//!
//! # Error Codes
//!
//! Every error type in the workspace implements [`ErrorCode`]. The kernel's
//! externally visible failure codes (`AGENT_NOT_FOUND`, `CIRCUIT_OPEN`, ...)
//! are a wire contract and never change once published. See
//! [`assert_error_codes`] for the test helper that enforces the convention.

mod error;
mod id;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{AgentId, MessageId, RequestId};
