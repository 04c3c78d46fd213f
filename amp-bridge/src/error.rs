//! Bridge error taxonomy
//!
//! Three classes, with different fates at the request layer:
//!
//! - invalid requests (bad zone id, unknown attribute) are detected before
//!   any device I/O and map to client errors
//! - timeouts mean the device did not confirm within the deadline and map
//!   to server errors; the caller may retry
//! - transport errors are unrecoverable and should terminate the process

use std::time::Duration;

use thiserror::Error;

use amp_protocol::ProtocolError;
use amp_serial::TransportError;

/// Errors surfaced by bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Request rejected before any device I/O
    #[error("{0}")]
    InvalidRequest(#[from] ProtocolError),

    /// The device did not confirm the expected state in time
    ///
    /// The registry is left in whatever partial state the replies reached;
    /// the next operation's clear takes care of it.
    #[error("timed out after {timeout:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: String,
        timeout: Duration,
    },

    /// The serial connection failed; no further progress is possible
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl BridgeError {
    /// Whether the caller, not the device, is at fault
    ///
    /// Supports the request layer's status mapping: client-error class for
    /// validation failures, server-error class for timeouts, process
    /// termination for transport failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, BridgeError::InvalidRequest(_))
    }

    /// Whether the process should terminate rather than keep serving
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::Transport(_))
    }
}

/// Type alias for results of bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let invalid = BridgeError::InvalidRequest(ProtocolError::InvalidZone("70".into()));
        assert!(invalid.is_client_error());
        assert!(!invalid.is_fatal());

        let timeout = BridgeError::Timeout {
            waiting_for: "zone 11".to_string(),
            timeout: Duration::from_secs(3),
        };
        assert!(!timeout.is_client_error());
        assert!(!timeout.is_fatal());
    }

    #[test]
    fn test_protocol_error_message_passthrough() {
        let err = BridgeError::InvalidRequest(ProtocolError::InvalidAttribute("dt".into()));
        assert_eq!(format!("{}", err), "'dt' is not a valid zone control attribute");
    }
}
