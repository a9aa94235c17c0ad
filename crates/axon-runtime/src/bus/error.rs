//! Bus layer errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`BusError::Transport`] | `BUS_TRANSPORT` | inherited |
//! | [`BusError::SendFailed`] | `BUS_SEND_FAILED` | Yes |

use axon_message::TransportError;
use axon_types::{ErrorCode, MessageId};
use thiserror::Error;

/// Failure in a bus operation.
#[derive(Debug, Clone, Error)]
pub enum BusError {
    /// The underlying transport refused or failed the operation.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The bus itself could not complete a send.
    #[error("send failed: {0}")]
    SendFailed(String),
}

impl ErrorCode for BusError {
    fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "BUS_TRANSPORT",
            Self::SendFailed(_) => "BUS_SEND_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(inner) => inner.is_recoverable(),
            Self::SendFailed(_) => true,
        }
    }
}

/// Partial failure of a broadcast.
///
/// Broadcast stops at the first failing recipient; `sent` holds the ids
/// of the messages that were delivered before the failure, in recipient
/// order, so callers can reason about what went out.
#[derive(Debug, Error)]
#[error("broadcast failed at recipient {failed_recipient} after {} sends: {source}", .sent.len())]
pub struct BroadcastError {
    /// Ids assigned to the messages sent before the failure.
    pub sent: Vec<MessageId>,

    /// The recipient whose send failed.
    pub failed_recipient: String,

    /// The underlying send failure.
    #[source]
    pub source: BusError,
}

impl ErrorCode for BroadcastError {
    fn code(&self) -> &'static str {
        self.source.code()
    }

    fn is_recoverable(&self) -> bool {
        self.source.is_recoverable()
    }
}
