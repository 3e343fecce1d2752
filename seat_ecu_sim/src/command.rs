//! Command frame decoding.
//!
//! Both command frames share one layout:
//!
//! | byte | content |
//! |------|---------|
//! | 0 | 2-bit direction per slot (slot 0 = bits 0-1 ... slot 3 = bits 6-7) |
//! | 1-4 | speed per slot |
//! | 5-7 | unused |
//!
//! SECU2_CMD_1 routes slot 0 to the fore/aft motor and slot 2 to tilt;
//! SECU1_CMD_1 routes slot 0 to height. Other slots are decoded and dropped.

use crate::motor::MotorId;
use seat_common::consts::{FRAME_LEN, MOTOR_SLOTS, SECU1_CMD_1_FRAME_ID, SECU2_CMD_1_FRAME_ID};
use seat_common::frame::CanFrame;
use seat_common::protocol::Direction;

/// Slot routing for SECU2_CMD_1.
const POSITION_TILT_ROUTES: &[(usize, MotorId)] = &[(0, MotorId::Position), (2, MotorId::Tilt)];

/// Slot routing for SECU1_CMD_1.
const HEIGHT_ROUTES: &[(usize, MotorId)] = &[(0, MotorId::Height)];

/// Which command frame was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// SECU1_CMD_1 (height).
    Height,
    /// SECU2_CMD_1 (fore/aft + tilt).
    PositionTilt,
}

impl CommandKind {
    /// Map a frame identifier.
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            SECU1_CMD_1_FRAME_ID => Some(Self::Height),
            SECU2_CMD_1_FRAME_ID => Some(Self::PositionTilt),
            _ => None,
        }
    }

    /// Frame identifier.
    pub const fn frame_id(self) -> u32 {
        match self {
            Self::Height => SECU1_CMD_1_FRAME_ID,
            Self::PositionTilt => SECU2_CMD_1_FRAME_ID,
        }
    }

    /// Message name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Height => "SECU1_CMD_1",
            Self::PositionTilt => "SECU2_CMD_1",
        }
    }

    fn routes(self) -> &'static [(usize, MotorId)] {
        match self {
            Self::Height => HEIGHT_ROUTES,
            Self::PositionTilt => POSITION_TILT_ROUTES,
        }
    }
}

/// Direction and speed for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorCommand {
    /// Commanded direction.
    pub direction: Direction,
    /// Commanded speed (rpm-like unit).
    pub speed: u8,
}

impl MotorCommand {
    /// Build a slot command.
    pub const fn new(direction: Direction, speed: u8) -> Self {
        Self { direction, speed }
    }

    /// OFF with zero speed.
    pub const fn off() -> Self {
        Self::new(Direction::Off, 0)
    }
}

/// A decoded command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// Frame kind.
    pub kind: CommandKind,
    /// All four slots as decoded.
    pub slots: [MotorCommand; MOTOR_SLOTS],
}

impl CommandFrame {
    /// Decode a frame; `None` for identifiers that are not motor commands.
    pub fn decode(frame: &CanFrame) -> Option<Self> {
        let kind = CommandKind::from_id(frame.id)?;
        let data = &frame.data;
        let mut slots = [MotorCommand::default(); MOTOR_SLOTS];
        for (idx, slot) in slots.iter_mut().enumerate() {
            *slot = MotorCommand {
                direction: Direction::from_bits(data[0] >> (idx * 2)),
                speed: data[1 + idx],
            };
        }
        Some(Self { kind, slots })
    }

    /// SECU2_CMD_1 for fore/aft and tilt; other slots OFF.
    pub fn position_tilt(position: MotorCommand, tilt: MotorCommand) -> Self {
        let mut slots = [MotorCommand::off(); MOTOR_SLOTS];
        slots[0] = position;
        slots[2] = tilt;
        Self {
            kind: CommandKind::PositionTilt,
            slots,
        }
    }

    /// SECU1_CMD_1 for height; other slots OFF.
    pub fn height(height: MotorCommand) -> Self {
        let mut slots = [MotorCommand::off(); MOTOR_SLOTS];
        slots[0] = height;
        Self {
            kind: CommandKind::Height,
            slots,
        }
    }

    /// Encode into a full-length frame.
    pub fn encode(&self) -> CanFrame {
        let mut data = [0u8; FRAME_LEN];
        for (idx, slot) in self.slots.iter().enumerate() {
            data[0] |= (slot.direction.bits() & 0x3) << (idx * 2);
            data[1 + idx] = slot.speed;
        }
        CanFrame::new(self.kind.frame_id(), data)
    }

    /// Slot commands for the modelled motors.
    pub fn routed(&self) -> impl Iterator<Item = (MotorId, MotorCommand)> + '_ {
        self.kind
            .routes()
            .iter()
            .map(|&(slot, motor)| (motor, self.slots[slot]))
    }

    /// Slots not mapped to a modelled motor, with their index.
    pub fn unrouted(&self) -> impl Iterator<Item = (usize, MotorCommand)> + '_ {
        let routes = self.kind.routes();
        self.slots
            .iter()
            .enumerate()
            .filter(move |(idx, _)| !routes.iter().any(|(slot, _)| slot == idx))
            .map(|(idx, cmd)| (idx, *cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_ignored() {
        let frame = CanFrame::new(0x123, [0x55; FRAME_LEN]);
        assert_eq!(CommandFrame::decode(&frame), None);
        assert_eq!(CommandFrame::decode(&CanFrame::zeroed(0x712)), None);
    }

    #[test]
    fn test_decode_bit_packing() {
        // slot0=INC, slot1=DEC, slot2=INVALID, slot3=OFF
        let frame = CanFrame::new(0x707, [0b00_11_10_01, 80, 90, 100, 110, 0xAA, 0xBB, 0xCC]);
        let cmd = CommandFrame::decode(&frame).unwrap();
        assert_eq!(cmd.kind, CommandKind::PositionTilt);
        assert_eq!(cmd.slots[0], MotorCommand::new(Direction::Inc, 80));
        assert_eq!(cmd.slots[1], MotorCommand::new(Direction::Dec, 90));
        assert_eq!(cmd.slots[2], MotorCommand::new(Direction::Invalid, 100));
        assert_eq!(cmd.slots[3], MotorCommand::new(Direction::Off, 110));
    }

    #[test]
    fn test_position_tilt_routing() {
        let frame = CanFrame::new(0x707, [0b00_10_00_01, 80, 0, 60, 0, 0, 0, 0]);
        let cmd = CommandFrame::decode(&frame).unwrap();
        let routed: Vec<_> = cmd.routed().collect();
        assert_eq!(
            routed,
            vec![
                (MotorId::Position, MotorCommand::new(Direction::Inc, 80)),
                (MotorId::Tilt, MotorCommand::new(Direction::Dec, 60)),
            ]
        );
        let unrouted: Vec<_> = cmd.unrouted().map(|(idx, _)| idx).collect();
        assert_eq!(unrouted, vec![1, 3]);
    }

    #[test]
    fn test_height_routing() {
        let frame = CanFrame::new(0x705, [0b10, 120, 0, 0, 0, 0, 0, 0]);
        let cmd = CommandFrame::decode(&frame).unwrap();
        assert_eq!(cmd.kind, CommandKind::Height);
        let routed: Vec<_> = cmd.routed().collect();
        assert_eq!(
            routed,
            vec![(MotorId::Height, MotorCommand::new(Direction::Dec, 120))]
        );
        assert_eq!(cmd.unrouted().count(), 3);
    }

    #[test]
    fn test_builders_encode_expected_bytes() {
        let frame = CommandFrame::position_tilt(
            MotorCommand::new(Direction::Inc, 80),
            MotorCommand::new(Direction::Dec, 50),
        )
        .encode();
        assert_eq!(frame.id, 0x707);
        assert_eq!(frame.data, [0x21, 80, 0, 50, 0, 0, 0, 0]);

        let frame = CommandFrame::height(MotorCommand::new(Direction::Inc, 100)).encode();
        assert_eq!(frame.id, 0x705);
        assert_eq!(frame.data, [0x01, 100, 0, 0, 0, 0, 0, 0]);
    }
}
