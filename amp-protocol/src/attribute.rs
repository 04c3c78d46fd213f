//! Settable zone attributes and their wire codes

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// A controllable zone attribute
///
/// Each attribute maps to the canonical two-letter code the controller
/// understands. Human-friendly aliases (`volume`, `source`, ...) resolve
/// to the same codes via [`Attribute::resolve`].
///
/// The `dt` diagnostic field reported in status frames is deliberately not
/// an `Attribute`: it can be read from a [`ZoneStatus`](crate::ZoneStatus)
/// but the controller accepts no command to set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Power amplifier flag (`pa`)
    PowerAmp,
    /// Zone power (`pr`)
    Power,
    /// Mute (`mu`)
    Mute,
    /// Volume (`vo`)
    Volume,
    /// Treble (`tr`)
    Treble,
    /// Bass (`bs`)
    Bass,
    /// Balance (`bl`)
    Balance,
    /// Input channel / source selection (`ch`)
    Channel,
    /// Keypad lock (`ls`)
    KeypadLock,
}

impl Attribute {
    /// All settable attributes, in status-frame field order
    pub const ALL: [Attribute; 9] = [
        Attribute::PowerAmp,
        Attribute::Power,
        Attribute::Mute,
        Attribute::Volume,
        Attribute::Treble,
        Attribute::Bass,
        Attribute::Balance,
        Attribute::Channel,
        Attribute::KeypadLock,
    ];

    /// Canonical two-letter wire code
    pub fn code(&self) -> &'static str {
        match self {
            Attribute::PowerAmp => "pa",
            Attribute::Power => "pr",
            Attribute::Mute => "mu",
            Attribute::Volume => "vo",
            Attribute::Treble => "tr",
            Attribute::Bass => "bs",
            Attribute::Balance => "bl",
            Attribute::Channel => "ch",
            Attribute::KeypadLock => "ls",
        }
    }

    /// Resolves a canonical code or human-friendly alias, case-insensitively
    ///
    /// Returns `InvalidAttribute` for anything outside the alias table.
    pub fn resolve(name: &str) -> Result<Self, ProtocolError> {
        match name.to_ascii_lowercase().as_str() {
            "pa" => Ok(Attribute::PowerAmp),
            "pr" | "power" => Ok(Attribute::Power),
            "mu" | "mute" => Ok(Attribute::Mute),
            "vo" | "volume" => Ok(Attribute::Volume),
            "tr" | "treble" => Ok(Attribute::Treble),
            "bs" | "bass" => Ok(Attribute::Bass),
            "bl" | "balance" => Ok(Attribute::Balance),
            "ch" | "channel" | "source" => Ok(Attribute::Channel),
            "ls" | "keypad" => Ok(Attribute::KeypadLock),
            _ => Err(ProtocolError::InvalidAttribute(name.to_string())),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Attribute {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::resolve(s)
    }
}
