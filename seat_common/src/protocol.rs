//! Wire-level enums shared by the command and status frames.
//!
//! Both frame directions pack a 2-bit movement code per motor. Status frames
//! additionally carry a 2-bit learning state directly above it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Motor movement direction (2-bit wire code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Direction {
    /// Motor stopped.
    #[default]
    Off = 0,
    /// Moving towards 100%.
    Inc = 1,
    /// Moving towards 0%.
    Dec = 2,
    /// Reserved / invalid code.
    Invalid = 3,
}

impl Direction {
    /// Decode the low two bits of `bits`.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Off,
            1 => Self::Inc,
            2 => Self::Dec,
            _ => Self::Invalid,
        }
    }

    /// Wire code.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Whether this direction moves the motor.
    #[inline]
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Inc | Self::Dec)
    }

    /// Short upper-case label used in log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Invalid => "INV",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Motor learning (calibration) state reported in status frames.
///
/// Settable only; the simulator never computes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LearningState {
    /// Motor not learned.
    Nok = 0,
    /// Motor learned.
    #[default]
    Ok = 1,
    /// Learning state invalid.
    Invalid = 2,
}

impl LearningState {
    /// Map a raw numeric code (as given via `SAE_LRN`).
    pub const fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Self::Nok),
            1 => Some(Self::Ok),
            2 => Some(Self::Invalid),
            _ => None,
        }
    }

    /// Wire code.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Short upper-case label used in log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nok => "NOK",
            Self::Ok => "OK",
            Self::Invalid => "INV",
        }
    }
}

impl fmt::Display for LearningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pack a motor's status nibble: direction in bits 0-1, learning state in bits 2-3.
#[inline]
pub const fn status_nibble(direction: Direction, learning: LearningState) -> u8 {
    (direction.bits() & 0x3) | ((learning.bits() & 0x3) << 2)
}
