//! Seat ECU wire and simulation constants.
//!
//! Frame identifiers follow the seat ECU (SECU) message catalogue: two inbound
//! command frames and two outbound status frames, all carrying 8 data bytes.

use static_assertions::const_assert;

/// Canonical simulator service name (used for logging).
pub const SIM_SERVICE_NAME: &str = "seat_ecu_sim";

/// Payload size of every frame exchanged with the simulated ECU.
pub const FRAME_LEN: usize = 8;

/// SECU1_CMD_1: height motor command (slot 0 drives the height motor).
pub const SECU1_CMD_1_FRAME_ID: u32 = 0x705;

/// SECU2_CMD_1: fore/aft + tilt command (slot 0 = position, slot 2 = tilt).
pub const SECU2_CMD_1_FRAME_ID: u32 = 0x707;

/// SECU1_STAT: height motor status.
pub const SECU1_STAT_FRAME_ID: u32 = 0x712;

/// SECU2_STAT: fore/aft + tilt motor status.
pub const SECU2_STAT_FRAME_ID: u32 = 0x714;

/// Number of motor slots packed into one command frame.
pub const MOTOR_SLOTS: usize = 4;

/// Fixed-point shift used for motor positions (2^10 sub-units per percent).
pub const POS_SHIFT: u32 = 10;

/// Lowest valid position in percent.
pub const POS_MIN_PERCENT: i32 = 0;

/// Highest valid position in percent.
pub const POS_MAX_PERCENT: i32 = 100;

/// Position an uncalibrated motor jumps to on its first tick.
pub const CALIBRATION_PERCENT: i32 = 42;

/// Moving DEC stops once at or below this percentage.
pub const THRESHOLD_LO_PERCENT: i32 = 14;

/// Moving INC stops once at or above this percentage.
pub const THRESHOLD_HI_PERCENT: i32 = 85;

/// Default simulated read latency in milliseconds.
pub const DEFAULT_TICK_DELAY_MS: u64 = 10;

/// Fixed processing overhead added to the tick delay when deriving the step.
pub const TICK_OVERHEAD_MS: u64 = 10;

/// Commanded speeds below this cannot move a motor.
pub const SPEED_MIN_MOVING: u8 = 30;

/// Commanded speeds above this use the clamped full-range time.
pub const SPEED_MAX_LINEAR: u8 = 130;

/// Full-range traversal time used for speeds above [`SPEED_MAX_LINEAR`].
pub const FULL_RANGE_TIME_CLAMPED_MS: u32 = 1000;

/// Environment variable names read at initialization.
pub mod env {
    /// Per-command / per-tick diagnostic lines.
    pub const DEBUG: &str = "SAE_DEBUG";
    /// Raw frame hex dumps.
    pub const VERBOSE: &str = "SAE_VERBOSE";
    /// Tick delay override in milliseconds.
    pub const DELAY: &str = "SAE_DELAY";
    /// Initial position for all motors (`-1`/`255` = uncalibrated).
    pub const POS: &str = "SAE_POS";
    /// Initial learning state for all motors.
    pub const LRN: &str = "SAE_LRN";
    /// Threshold auto-stop enable.
    pub const STOP: &str = "SAE_STOP";
    /// Apply-to-all-motors flag (reserved).
    pub const ALL: &str = "SAE_ALL";
}

const_assert!(THRESHOLD_LO_PERCENT < CALIBRATION_PERCENT);
const_assert!(CALIBRATION_PERCENT < THRESHOLD_HI_PERCENT);
const_assert!(THRESHOLD_HI_PERCENT < POS_MAX_PERCENT);
const_assert!(SPEED_MIN_MOVING < SPEED_MAX_LINEAR);
