//! Real serial port transport
//!
//! Blocking I/O from the `serialport` crate, wrapped the simple way: the
//! write handle lives behind a mutex, and a dedicated reader thread turns
//! the port's byte stream into newline-delimited ASCII lines on a tokio
//! channel. A line protocol at amplifier-control rates needs nothing
//! faster.

use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::transport::{LineReceiver, LineSender, Transport, TransportError};

/// Read timeout on the blocking port; expiry is a normal idle tick
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Transport over a real serial device
///
/// Opening the device is a one-shot operation and failure is fatal to the
/// caller - the single persistent connection is the process's reason to
/// exist. No retries happen at this layer.
pub struct SerialTransport {
    port: Mutex<Box<dyn serialport::SerialPort>>,
}

impl SerialTransport {
    /// Opens the device and starts the reader thread
    ///
    /// Returns the transport (write side) and the infinite line stream
    /// (read side). The stream ends only if the port dies.
    pub fn open(
        device: &str,
        baud_rate: u32,
    ) -> Result<(Arc<Self>, LineReceiver), TransportError> {
        let open_err = |source| TransportError::Open {
            device: device.to_string(),
            source,
        };

        let port = serialport::new(device, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(open_err)?;
        let reader = port.try_clone().map_err(open_err)?;

        info!(device, baud_rate, "serial device open");

        let (line_tx, line_rx) = tokio::sync::mpsc::unbounded_channel();
        thread::Builder::new()
            .name("amp-serial-reader".to_string())
            .spawn(move || read_lines(reader, line_tx))
            .map_err(TransportError::Write)?;

        let transport = Arc::new(Self {
            port: Mutex::new(port),
        });
        Ok((transport, line_rx))
    }
}

impl Transport for SerialTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut port = self.port.lock().map_err(|_| TransportError::Closed)?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }
}

/// Reader-thread loop: accumulate bytes, emit one String per `\n`
///
/// Read timeouts are idle ticks. Any other I/O error ends the stream,
/// which the consumer observes as channel closure.
fn read_lines(mut port: Box<dyn serialport::SerialPort>, line_tx: LineSender) {
    let mut pending = Vec::new();
    let mut chunk = [0u8; 256];

    loop {
        match port.read(&mut chunk) {
            Ok(0) => continue,
            Ok(n) => {
                for &byte in &chunk[..n] {
                    if byte == b'\n' {
                        let line = String::from_utf8_lossy(&pending).into_owned();
                        pending.clear();
                        if line_tx.send(line).is_err() {
                            debug!("line consumer gone, reader exiting");
                            return;
                        }
                    } else {
                        pending.push(byte);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                error!(error = %e, "serial read failed, line stream ends");
                return;
            }
        }
    }
}
