//! Status frame encoding and the alternating read schedule.
//!
//! Reads alternate between two phases. Each phase ticks its motors and
//! reports them in its own frame:
//!
//! | phase | id | byte 0 | byte 1 | byte 2 | byte 4 |
//! |-------|----|--------|--------|--------|--------|
//! | height | 0x712 | height dir/lrn | 0 | height % | 0 |
//! | pos+tilt | 0x714 | pos dir/lrn | tilt dir/lrn | pos % | tilt % |

use crate::motor::{Motor, MotorId};
use seat_common::consts::{FRAME_LEN, SECU1_STAT_FRAME_ID, SECU2_STAT_FRAME_ID};
use seat_common::frame::CanFrame;
use seat_common::protocol::{Direction, LearningState, status_nibble};
use std::fmt;

/// Read schedule cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Height motor, SECU1_STAT.
    #[default]
    Height,
    /// Fore/aft and tilt motors, SECU2_STAT.
    PositionTilt,
}

impl Phase {
    /// Phase of the following read.
    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Self::Height => Self::PositionTilt,
            Self::PositionTilt => Self::Height,
        }
    }

    /// Motors ticked and reported in this phase.
    pub const fn motors(self) -> &'static [MotorId] {
        match self {
            Self::Height => &[MotorId::Height],
            Self::PositionTilt => &[MotorId::Position, MotorId::Tilt],
        }
    }

    /// Status frame identifier.
    pub const fn frame_id(self) -> u32 {
        match self {
            Self::Height => SECU1_STAT_FRAME_ID,
            Self::PositionTilt => SECU2_STAT_FRAME_ID,
        }
    }

    /// Phase reporting the given status identifier.
    pub const fn from_frame_id(id: u32) -> Option<Self> {
        match id {
            SECU1_STAT_FRAME_ID => Some(Self::Height),
            SECU2_STAT_FRAME_ID => Some(Self::PositionTilt),
            _ => None,
        }
    }

    /// Message name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Height => "SECU1_STAT",
            Self::PositionTilt => "SECU2_STAT",
        }
    }

    /// (status byte, position byte) offsets per reported motor.
    const fn layout(self) -> &'static [(MotorId, usize, usize)] {
        match self {
            Self::Height => &[(MotorId::Height, 0, 2)],
            Self::PositionTilt => &[(MotorId::Position, 0, 2), (MotorId::Tilt, 1, 4)],
        }
    }
}

/// Serialize the phase's motors into its status frame.
///
/// `motor` resolves a motor id to its current state.
pub fn encode_status<'a, F>(phase: Phase, motor: F) -> CanFrame
where
    F: Fn(MotorId) -> &'a Motor,
{
    let mut data = [0u8; FRAME_LEN];
    for &(id, status_byte, position_byte) in phase.layout() {
        let m = motor(id);
        data[status_byte] = status_nibble(m.direction(), m.learning_state());
        data[position_byte] = m.status_percent();
    }
    CanFrame::new(phase.frame_id(), data)
}

/// One motor entry of a decoded status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorStatus {
    /// Reported motor.
    pub motor: MotorId,
    /// Reported direction.
    pub direction: Direction,
    /// Reported learning state (`None` for the reserved code 3).
    pub learning_state: Option<LearningState>,
    /// Reported position in percent.
    pub percent: u8,
}

/// A decoded status frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFrame {
    /// Phase that produced the frame.
    pub phase: Phase,
    /// Reported motors.
    pub motors: Vec<MotorStatus>,
}

impl StatusFrame {
    /// Decode a status frame; `None` for other identifiers.
    pub fn decode(frame: &CanFrame) -> Option<Self> {
        let phase = Phase::from_frame_id(frame.id)?;
        let motors = phase
            .layout()
            .iter()
            .map(|&(motor, status_byte, position_byte)| {
                let nibble = frame.data[status_byte];
                MotorStatus {
                    motor,
                    direction: Direction::from_bits(nibble),
                    learning_state: LearningState::from_raw(i64::from((nibble >> 2) & 0x3)),
                    percent: frame.data[position_byte],
                }
            })
            .collect();
        Some(Self { phase, motors })
    }

    /// Entry for a motor, if reported in this frame.
    pub fn motor(&self, id: MotorId) -> Option<&MotorStatus> {
        self.motors.iter().find(|m| m.motor == id)
    }
}

impl fmt::Display for StatusFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase.name())?;
        for m in &self.motors {
            let lrn = m.learning_state.map_or("UNKNOWN", LearningState::label);
            write!(
                f,
                " {{ {}: pos:{:3}%, state:{:>3}, lrn:{:>3} }}",
                m.motor, m.percent, m.direction, lrn
            )?;
        }
        Ok(())
    }
}
