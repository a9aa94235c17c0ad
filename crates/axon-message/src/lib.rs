//! Message types and the transport abstraction for the AXON kernel.
//!
//! This crate defines the unit of inter-agent traffic ([`Message`]), the
//! pluggable medium that conveys it ([`Transport`]), and the in-memory
//! reference transport used by tests and single-process deployments.
//!
//! # Message Flow
//!
//! ```text
//! ┌──────────┐  send(from, to, ...)   ┌──────────┐
//! │   Bus    │ ─────────────────────► │Transport │
//! │ (runtime)│                        │          │
//! └──────────┘                        └──────────┘
//!                                          │
//!                       ┌──────────────────┼──────────────────┐
//!                       ▼                  ▼                  ▼
//!                  per-agent          per-agent          per-agent
//!                  queue (pull)       handlers (push)    ordering (FIFO
//!                                                        per sender)
//! ```
//!
//! The bus (in `axon-runtime`) assigns identity and timestamps; a
//! transport only moves accepted messages. Subscribed handlers are offered
//! every message addressed to their agent, in registration order, and are
//! never invoked while a transport lock is held.
//!
//! # Wire Form
//!
//! [`Message`] derives `Serialize`/`Deserialize`; any representation that
//! round-trips serde (JSON, MessagePack, ...) is a valid wire form for an
//! inter-process transport. The free-form `type` field is exposed in Rust
//! as `kind` and renamed on the wire.
//!
//! # Ordering Guarantees
//!
//! Within the in-memory transport, messages from one sender to one
//! recipient are delivered in send order. No guarantee is made between
//! senders or across priority classes; [`Priority`] is a transport hint,
//! not a kernel guarantee.

mod error;
mod memory;
mod message;
mod priority;
mod transport;

pub use error::TransportError;
pub use memory::InMemoryTransport;
pub use message::{Message, SendOptions};
pub use priority::Priority;
pub use transport::{MessageHandler, Transport};
