//! Classic CAN frame as exchanged with the simulated ECU.
//!
//! The text form is the `cansend`/`candump` notation `ID#DATA`, where `ID` is
//! hex and `DATA` is up to 8 hex byte pairs, optionally separated by `.`.

use crate::consts::FRAME_LEN;
use crate::error::FrameParseError;
use std::fmt;
use std::str::FromStr;

/// Largest extended (29-bit) identifier.
const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Largest standard (11-bit) identifier.
const MAX_STANDARD_ID: u32 = 0x7FF;

/// A classic CAN data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanFrame {
    /// Frame identifier.
    pub id: u32,
    /// Data length code (number of valid bytes in `data`).
    pub dlc: u8,
    /// Payload; bytes past `dlc` are zero.
    pub data: [u8; FRAME_LEN],
}

impl CanFrame {
    /// Full-length frame with the given payload.
    pub const fn new(id: u32, data: [u8; FRAME_LEN]) -> Self {
        Self {
            id,
            dlc: FRAME_LEN as u8,
            data,
        }
    }

    /// Full-length frame with an all-zero payload.
    pub const fn zeroed(id: u32) -> Self {
        Self::new(id, [0; FRAME_LEN])
    }

    /// Valid payload bytes.
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.dlc).min(FRAME_LEN);
        &self.data[..len]
    }
}

impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id <= MAX_STANDARD_ID {
            write!(f, "{:03X}#", self.id)?;
        } else {
            write!(f, "{:08X}#", self.id)?;
        }
        for byte in self.payload() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for CanFrame {
    type Err = FrameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (id_str, data_str) = s
            .split_once('#')
            .ok_or_else(|| FrameParseError::MissingSeparator(s.to_string()))?;

        let id = u32::from_str_radix(id_str, 16)
            .ok()
            .filter(|id| *id <= MAX_EXTENDED_ID)
            .ok_or_else(|| FrameParseError::InvalidId(id_str.to_string()))?;

        let digits: String = data_str.chars().filter(|c| *c != '.').collect();
        if digits.len() % 2 != 0 || !digits.is_ascii() {
            return Err(FrameParseError::InvalidData(data_str.to_string()));
        }
        let len = digits.len() / 2;
        if len > FRAME_LEN {
            return Err(FrameParseError::TooLong(len));
        }

        let mut data = [0u8; FRAME_LEN];
        for (idx, slot) in data.iter_mut().take(len).enumerate() {
            let pair = &digits[idx * 2..idx * 2 + 2];
            *slot = u8::from_str_radix(pair, 16)
                .map_err(|_| FrameParseError::InvalidData(data_str.to_string()))?;
        }

        Ok(Self {
            id,
            dlc: len as u8,
            data,
        })
    }
}

/// Space-separated upper-case hex dump of `bytes`.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
