//! Serial transport for amplifier controller chains
//!
//! Owns the single persistent serial connection: a byte-write operation
//! behind the [`Transport`] trait, and a lazy, infinite stream of
//! newline-delimited ASCII lines read from the device.
//!
//! Two implementations:
//!
//! - [`SerialTransport`] - real hardware via the `serialport` crate, with
//!   a dedicated reader thread feeding the line channel
//! - [`MockTransport`] - in-memory, scriptable, for tests
//!
//! Failure to open the device is fatal. The bridge exists to
//! speak to one controller chain over one connection; when that
//! connection cannot be established there is nothing useful left to do,
//! and recovery (restart, supervision) lives outside the process.

pub mod mock;
pub mod serial;
pub mod transport;

pub use mock::MockTransport;
pub use serial::SerialTransport;
pub use transport::{LineReceiver, LineSender, Transport, TransportError};
