//! Prelude module for common re-exports.
//!
//! ```rust
//! use seat_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SimConfig, SimFileConfig};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::error::{FrameParseError, SimError};

// ─── Wire ───────────────────────────────────────────────────────────
pub use crate::consts::{
    FRAME_LEN, SECU1_CMD_1_FRAME_ID, SECU1_STAT_FRAME_ID, SECU2_CMD_1_FRAME_ID,
    SECU2_STAT_FRAME_ID,
};
pub use crate::frame::CanFrame;
pub use crate::protocol::{Direction, LearningState};
