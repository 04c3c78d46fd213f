//! Transport seam
//!
//! The write side of the device connection, abstracted so the layers
//! above can run against real hardware or a scripted mock. The read side
//! is not part of the trait: opening a transport hands back a line
//! channel once, and that stream is infinite and non-restartable.

use thiserror::Error;
use tokio::sync::mpsc;

/// Receiving half of the device's line stream
///
/// Lines arrive with the `\n` delimiter stripped. The stream ends only
/// when the transport is gone; there is no reconnect at this layer.
pub type LineReceiver = mpsc::UnboundedReceiver<String>;

/// Sending half of the line stream, held by the transport's reader
pub type LineSender = mpsc::UnboundedSender<String>;

/// Errors from the device connection
///
/// A transport error is an unrecoverable operating condition: a
/// controller chain that cannot be reached cannot be bridged, and the
/// process should terminate rather than silently serve stale state.
/// Reconnection, if desired, belongs to process supervision outside this
/// system.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The serial device could not be opened at startup
    #[error("failed to open serial device {device}: {source}")]
    Open {
        device: String,
        #[source]
        source: serialport::Error,
    },

    /// A write to the open port failed
    #[error("serial write failed: {0}")]
    Write(#[from] std::io::Error),

    /// The port is no longer usable
    #[error("serial port closed")]
    Closed,
}

/// Byte-write access to the device
///
/// Writes are fire-and-forget: the device answers asynchronously on the
/// line stream, never inline.
pub trait Transport: Send + Sync {
    /// Sends raw bytes on the serial line
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError>;
}
