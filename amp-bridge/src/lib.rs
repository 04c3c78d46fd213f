//! Protocol bridge for daisy-chained multi-zone amplifier controllers
//!
//! Bridges a line-oriented serial control protocol to a request/response
//! API. Each controller unit in the chain exposes six zones with mutable
//! attributes (power, mute, volume, treble, bass, balance, channel,
//! keypad lock). Callers query zone state or submit attribute changes;
//! the bridge issues the serial commands, waits for the asynchronous
//! replies that confirm the effect, and returns the resulting state.
//!
//! # Architecture
//!
//! ```text
//! serial device ──lines──▶ frame pump ──▶ ZoneRegistry ◀── wait predicates
//!                                              ▲                 │
//! AmpBridge ──▶ CommandSequencer ──writes──────┘                 │
//!    ▲                  └────────────────────────────────────────┘
//!    └── request layer (HTTP, CLI, ...) - out of scope here
//! ```
//!
//! The registry is the only shared mutable state; the sequencer's single
//! in-flight-operation lock is the only ordering guarantee, and it is
//! sufficient: an operation holds it from its opening clear/write until
//! its resolving wait has been consumed.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ampbridge::{AmpBridge, BridgeConfig, logging};
//!
//! logging::init_logging_from_env()?;
//!
//! let config = BridgeConfig::from_env()?;
//! let bridge = AmpBridge::open(config)?; // fatal if the device is unreachable
//!
//! // One call per logical route
//! let all = bridge.zones(false).await?;
//! let one = bridge.zone("11").await?;
//! let volume = bridge.attribute("11", "volume").await?;
//! let confirmed = bridge.set_attribute("11", "volume", "20").await?;
//! ```
//!
//! # Error classes
//!
//! Invalid zone ids and unknown attribute names are rejected before any
//! device I/O ([`BridgeError::is_client_error`]). Waits that miss their
//! deadline surface [`BridgeError::Timeout`] and may be retried. A failed
//! serial connection is fatal ([`BridgeError::is_fatal`]); the process
//! should exit rather than serve stale state.

pub mod bridge;
pub mod config;
pub mod error;
pub mod logging;
pub mod sequencer;

pub use bridge::AmpBridge;
pub use config::{BridgeConfig, ConfigError};
pub use error::{BridgeError, Result};
pub use sequencer::{CommandSequencer, ZoneRegistry};

// The protocol model is part of the public surface: callers receive
// ZoneStatus values and may construct typed ids/attributes directly.
pub use amp_protocol::{Attribute, ProtocolError, ZoneId, ZoneStatus, ZONES_PER_CONTROLLER};
pub use amp_serial::{MockTransport, SerialTransport, Transport, TransportError};

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::bridge::AmpBridge;
    pub use crate::config::BridgeConfig;
    pub use crate::error::{BridgeError, Result};
    pub use crate::sequencer::ZoneRegistry;
    pub use amp_protocol::{Attribute, ZoneId, ZoneStatus};
}
