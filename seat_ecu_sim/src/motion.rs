//! Motion profile estimation.
//!
//! A commanded speed maps linearly onto the time a motor needs to travel its
//! full 0-100% range; that time, together with the tick delay, gives the
//! fixed-point step applied on every tick.

use crate::position::POS_SCALE;
use seat_common::consts::{
    FULL_RANGE_TIME_CLAMPED_MS, POS_MAX_PERCENT, SPEED_MAX_LINEAR, SPEED_MIN_MOVING,
    TICK_OVERHEAD_MS,
};

/// Estimated full-range traversal time in milliseconds. `0` means the motor cannot move.
///
/// | speed | time |
/// |-------|------|
/// | < 30 | 0 |
/// | 30..=130 | `8000 + 200 * (100 - speed)` |
/// | > 130 | 1000 |
pub const fn estimate_full_range_time_ms(speed: u8) -> u32 {
    if speed < SPEED_MIN_MOVING {
        return 0;
    }
    if speed > SPEED_MAX_LINEAR {
        // Linear model goes negative past ~140.
        return FULL_RANGE_TIME_CLAMPED_MS;
    }
    let speed = speed as i32;
    (8000 + 200 * (100 - speed)) as u32
}

/// Unsigned fixed-point step per tick for `speed` at the given tick delay.
///
/// Truncating integer division; callers negate it for DEC.
pub fn per_tick_increment(speed: u8, tick_delay_ms: u64) -> i32 {
    let move_time = estimate_full_range_time_ms(speed);
    if move_time == 0 {
        return 0;
    }
    let tick_ms = i64::try_from(tick_delay_ms.saturating_add(TICK_OVERHEAD_MS)).unwrap_or(i64::MAX);
    let step = i64::from(POS_SCALE)
        .saturating_mul(i64::from(POS_MAX_PERCENT))
        .saturating_mul(tick_ms)
        / i64::from(move_time);
    i32::try_from(step).unwrap_or(i32::MAX)
}
