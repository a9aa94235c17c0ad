//! Transport layer errors.
//!
//! # Error Codes
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`TransportError::SendFailed`] | `TRANSPORT_SEND_FAILED` | Yes |
//! | [`TransportError::Closed`] | `TRANSPORT_CLOSED` | No |
//! | [`TransportError::Io`] | `TRANSPORT_IO` | Yes |

use axon_types::ErrorCode;
use thiserror::Error;

/// Failure inside a [`Transport`](crate::Transport) implementation.
///
/// The in-memory reference transport only produces [`Closed`]
/// (after `cleanup`); the other variants exist for remote transports.
///
/// [`Closed`]: TransportError::Closed
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Delivery to the named endpoint failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The transport has been cleaned up and no longer moves messages.
    #[error("transport closed")]
    Closed,

    /// Underlying medium I/O failure.
    #[error("transport i/o: {0}")]
    Io(String),
}

impl ErrorCode for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::SendFailed(_) => "TRANSPORT_SEND_FAILED",
            Self::Closed => "TRANSPORT_CLOSED",
            Self::Io(_) => "TRANSPORT_IO",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::SendFailed(_) | Self::Io(_))
    }
}
