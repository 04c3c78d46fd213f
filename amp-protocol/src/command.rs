//! Outbound command encoding
//!
//! Commands are ASCII and `\r`-terminated. Two forms exist: a controller
//! query that makes all six zones of one controller broadcast their
//! status, and a control command that changes one attribute of one zone.

use crate::attribute::Attribute;
use crate::zone::ZoneId;

/// Encodes the status query for one controller (`?c0\r`)
///
/// The `0` addresses the whole controller; each of its six zones answers
/// with its own status frame, in no guaranteed order.
pub fn query_command(controller: u8) -> String {
    format!("?{}0\r", controller)
}

/// Encodes a control command (`<CZxxVV\r`)
///
/// The value is passed through verbatim; whether it is semantically legal
/// for the target device is the device's business, not the bridge's.
pub fn set_command(zone: ZoneId, attribute: Attribute, value: &str) -> String {
    format!("<{}{}{}\r", zone, attribute.code(), value)
}
