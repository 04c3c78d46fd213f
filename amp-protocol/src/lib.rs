//! Wire protocol for daisy-chained multi-zone amplifier controllers
//!
//! Each controller unit in the chain manages six amplifier zones and
//! speaks a line-oriented ASCII protocol over RS-232:
//!
//! - Query: `?<controller>0\r` - every zone of the controller replies
//! - Control: `<<zone><code><value>\r` - change one attribute
//! - Status reply: `#>` + eleven two-digit groups (zone id + ten fields)
//!
//! This crate holds the protocol model and nothing else: zone identity,
//! attribute codes and aliases, status frames with their fixed-width
//! decoder, and the outbound command encoders. Transport and state
//! synchronization live in the crates above it.
//!
//! # Example
//!
//! ```rust
//! use amp_protocol::{Attribute, ZoneId, ZoneStatus, set_command};
//!
//! let status = ZoneStatus::parse_line("#>1101000030050505050101").unwrap();
//! assert_eq!(status.attribute(Attribute::Volume), "05");
//!
//! let zone: ZoneId = "11".parse().unwrap();
//! let attr = Attribute::resolve("volume").unwrap();
//! assert_eq!(set_command(zone, attr, "20"), "<11vo20\r");
//! ```

pub mod attribute;
pub mod command;
pub mod error;
pub mod status;
pub mod zone;

pub use attribute::Attribute;
pub use command::{query_command, set_command};
pub use error::{ProtocolError, Result};
pub use status::ZoneStatus;
pub use zone::{ZoneId, ZONES_PER_CONTROLLER};
