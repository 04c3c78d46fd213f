//! Zone identity type

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProtocolError;

/// Zones per controller unit, fixed by the hardware
pub const ZONES_PER_CONTROLLER: u8 = 6;

/// Unique identifier for one amplifier zone
///
/// On the wire a zone is addressed by a two-digit code `CZ`: the first
/// digit is the controller's position in the daisy chain (1-9), the second
/// is the zone number within that controller (1-6, never 0 - `C0` is the
/// controller broadcast address used by query commands, not a zone).
///
/// # Example
///
/// ```rust
/// use amp_protocol::ZoneId;
///
/// let zone: ZoneId = "12".parse().unwrap();
/// assert_eq!(zone.controller(), 1);
/// assert_eq!(zone.zone(), 2);
/// assert_eq!(zone.to_string(), "12");
///
/// assert!("10".parse::<ZoneId>().is_err()); // zone digit 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId {
    controller: u8,
    zone: u8,
}

impl ZoneId {
    /// Creates a ZoneId, enforcing the shape invariant
    ///
    /// Returns `InvalidZone` unless controller is 1-9 and zone is 1-6.
    pub fn new(controller: u8, zone: u8) -> Result<Self, ProtocolError> {
        if !(1..=9).contains(&controller) || !(1..=ZONES_PER_CONTROLLER).contains(&zone) {
            return Err(ProtocolError::InvalidZone(format!(
                "{}{}",
                controller, zone
            )));
        }
        Ok(Self { controller, zone })
    }

    /// Controller position in the chain (1-9)
    pub fn controller(&self) -> u8 {
        self.controller
    }

    /// Zone number within the controller (1-6)
    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// All six zone ids of one controller, in zone order
    pub fn zones_of(controller: u8) -> impl Iterator<Item = ZoneId> {
        (1..=ZONES_PER_CONTROLLER).filter_map(move |z| ZoneId::new(controller, z).ok())
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.controller, self.zone)
    }
}

impl FromStr for ZoneId {
    type Err = ProtocolError;

    /// Parses the two-digit wire form
    ///
    /// Anything that is not exactly two ASCII digits satisfying the shape
    /// invariant is `InvalidZone`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidZone(s.to_string());

        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        ZoneId::new(bytes[0] - b'0', bytes[1] - b'0').map_err(|_| invalid())
    }
}

impl Serialize for ZoneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ZoneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
