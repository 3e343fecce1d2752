//! Fixed-point motor position.
//!
//! Positions are stored as percent shifted left by [`POS_SHIFT`] bits, giving
//! 1/1024 percent resolution. Converting back to percent is an arithmetic
//! right shift, so the fraction is dropped (and negative raw values floor to -1).

use seat_common::consts::POS_SHIFT;
use std::fmt;

/// Sub-units per percent.
pub const POS_SCALE: i32 = 1 << POS_SHIFT;

/// Position in 1/1024 percent units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FixedPos(i32);

impl FixedPos {
    /// Wrap a raw fixed-point value.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Convert whole percent to fixed point.
    #[inline]
    pub const fn from_percent(percent: i32) -> Self {
        Self(percent << POS_SHIFT)
    }

    /// Raw fixed-point value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole percent, fraction discarded.
    #[inline]
    pub const fn percent(self) -> i32 {
        self.0 >> POS_SHIFT
    }

    /// Fractional percent, for diagnostics only.
    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / f64::from(POS_SCALE)
    }

    /// Position moved by a signed step.
    #[inline]
    pub const fn offset(self, step: i32) -> Self {
        Self(self.0.saturating_add(step))
    }
}

impl fmt::Display for FixedPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}
