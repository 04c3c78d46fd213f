//! In-memory transport for tests
//!
//! Records every write and can play a scripted device: an optional
//! responder closure maps each written command to the reply lines the
//! "device" broadcasts back on the line stream.

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::transport::{LineReceiver, LineSender, Transport, TransportError};

/// Maps one written command to the device's reply lines
pub type Responder = dyn Fn(&str) -> Vec<String> + Send + Sync;

/// Scriptable in-memory transport
///
/// # Example
///
/// ```rust
/// use amp_serial::{MockTransport, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mock, mut lines) = MockTransport::new();
/// mock.set_responder(|cmd| {
///     if cmd == "ping\r" {
///         vec!["pong".to_string()]
///     } else {
///         vec![]
///     }
/// });
///
/// mock.send(b"ping\r").unwrap();
/// assert_eq!(lines.recv().await.unwrap(), "pong");
/// assert_eq!(mock.sent(), vec!["ping\r"]);
/// # }
/// ```
pub struct MockTransport {
    sent: Mutex<Vec<String>>,
    responder: Mutex<Option<Box<Responder>>>,
    line_tx: LineSender,
}

impl MockTransport {
    /// Creates a mock and the line stream it feeds
    pub fn new() -> (Arc<Self>, LineReceiver) {
        let (line_tx, line_rx) = tokio::sync::mpsc::unbounded_channel();
        let mock = Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            responder: Mutex::new(None),
            line_tx,
        });
        (mock, line_rx)
    }

    /// Installs the scripted device behavior
    pub fn set_responder<F>(&self, responder: F)
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        *self.responder.lock().unwrap() = Some(Box::new(responder));
    }

    /// Injects a line as if the device had broadcast it unprompted
    pub fn inject_line(&self, line: &str) {
        let _ = self.line_tx.send(line.to_string());
    }

    /// Every command written so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let command = String::from_utf8_lossy(bytes).into_owned();
        trace!(?command, "mock write");
        self.sent.lock().unwrap().push(command.clone());

        if let Some(responder) = self.responder.lock().unwrap().as_ref() {
            for line in responder(&command) {
                let _ = self.line_tx.send(line);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_writes() {
        let (mock, _lines) = MockTransport::new();
        mock.send(b"?10\r").unwrap();
        mock.send(b"<11vo20\r").unwrap();
        assert_eq!(mock.sent(), vec!["?10\r", "<11vo20\r"]);
    }

    #[tokio::test]
    async fn test_responder_feeds_line_stream() {
        let (mock, mut lines) = MockTransport::new();
        mock.set_responder(|cmd| vec![format!("echo:{}", cmd.trim_end())]);

        mock.send(b"?10\r").unwrap();
        assert_eq!(lines.recv().await.unwrap(), "echo:?10");
    }

    #[tokio::test]
    async fn test_inject_unsolicited_line() {
        let (mock, mut lines) = MockTransport::new();
        mock.inject_line("#>1101000030050505050101");
        assert_eq!(lines.recv().await.unwrap(), "#>1101000030050505050101");
    }

    #[tokio::test]
    async fn test_send_ok_after_receiver_dropped() {
        let (mock, lines) = MockTransport::new();
        drop(lines);
        // Writes never fail on the mock even with no listener
        assert!(mock.send(b"?10\r").is_ok());
    }
}
