//! Zone status frames and the fixed-width line decoder

use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::zone::ZoneId;

/// Number of two-digit groups in a status frame (zone id + ten fields)
const GROUP_COUNT: usize = 11;

/// Literal prefix of every status frame
const FRAME_PREFIX: &str = "#>";

/// One zone's full attribute set, decoded from a single status frame
///
/// Field values are the verbatim two-character decimal strings from the
/// wire. Leading zeros are significant and the value ranges are
/// device-defined, so they are never parsed to integers - the bridge
/// passes them through untouched.
///
/// A `ZoneStatus` is always created whole from one frame; there are no
/// partial updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStatus {
    /// Zone the frame describes
    pub zone: ZoneId,
    /// Power amplifier flag
    pub pa: String,
    /// Zone power flag
    pub pr: String,
    /// Mute flag
    pub mu: String,
    /// Device timestamp/diagnostic field (read-only)
    pub dt: String,
    /// Volume
    pub vo: String,
    /// Treble
    pub tr: String,
    /// Bass
    pub bs: String,
    /// Balance
    pub bl: String,
    /// Input channel
    pub ch: String,
    /// Keypad lock flag
    pub ls: String,
}

impl ZoneStatus {
    /// Attempts to decode one raw serial line as a status frame
    ///
    /// The grammar is strict on purpose: literal `#>` followed by exactly
    /// eleven two-digit groups, nothing else. Fixed digit counts mean
    /// malformed device output cannot desynchronize field boundaries.
    /// A trailing `\r` is tolerated (the reply delimiter is `\n`, but some
    /// firmware revisions emit `\r\n`).
    ///
    /// Returns `None` for anything that does not match. Partial or noise
    /// lines are a normal occurrence on a shared serial bus and are not
    /// errors.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let digits = line.strip_prefix(FRAME_PREFIX)?;

        if digits.len() != GROUP_COUNT * 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let group = |i: usize| digits[i * 2..i * 2 + 2].to_string();

        // A frame for an impossible zone (e.g. "10") is noise, not state.
        let zone: ZoneId = digits[0..2].parse().ok()?;

        Some(ZoneStatus {
            zone,
            pa: group(1),
            pr: group(2),
            mu: group(3),
            dt: group(4),
            vo: group(5),
            tr: group(6),
            bs: group(7),
            bl: group(8),
            ch: group(9),
            ls: group(10),
        })
    }

    /// Projects a single settable attribute's verbatim field value
    pub fn attribute(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::PowerAmp => &self.pa,
            Attribute::Power => &self.pr,
            Attribute::Mute => &self.mu,
            Attribute::Volume => &self.vo,
            Attribute::Treble => &self.tr,
            Attribute::Bass => &self.bs,
            Attribute::Balance => &self.bl,
            Attribute::Channel => &self.ch,
            Attribute::KeypadLock => &self.ls,
        }
    }
}
