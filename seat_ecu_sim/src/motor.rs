//! Per-motor motion state machine.
//!
//! One [`Motor`] models a linear seat motor: direction, commanded speed,
//! fixed-point position and the one-shot threshold stop latches. The same type
//! is instantiated for the fore/aft, tilt and height motors.
//!
//! # Tick sequence
//!
//! 1. Uncalibrated motors jump to [`CALIBRATION_PERCENT`].
//! 2. With thresholds enabled, latches whose band has been left are cleared
//!    (lo above 14%, hi below 85%).
//! 3. The step is applied in the commanded direction unless it would leave
//!    0..=100%, in which case the motor stops where it is.
//! 4. With thresholds enabled, an unlatched motor reaching the band stops and latches.

use crate::motion::{estimate_full_range_time_ms, per_tick_increment};
use crate::position::FixedPos;
use seat_common::consts::{
    CALIBRATION_PERCENT, POS_MAX_PERCENT, POS_MIN_PERCENT, THRESHOLD_HI_PERCENT,
    THRESHOLD_LO_PERCENT,
};
use seat_common::protocol::{Direction, LearningState};
use std::fmt;
use std::time::Instant;

/// Status byte value for a motor without a position.
pub const POSITION_INVALID_BYTE: u8 = 0xFF;

/// Identity of a simulated motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorId {
    /// Fore/aft (motor 1).
    Position,
    /// Backrest tilt (motor 2).
    Tilt,
    /// Seat height (motor 3).
    Height,
}

impl MotorId {
    /// All modelled motors, in storage order.
    pub const ALL: [MotorId; 3] = [MotorId::Position, MotorId::Tilt, MotorId::Height];

    /// Storage index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Position => 0,
            Self::Tilt => 1,
            Self::Height => 2,
        }
    }

    /// Name used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "motor1(pos)",
            Self::Tilt => "motor2(tilt)",
            Self::Height => "motor3(height)",
        }
    }
}

impl fmt::Display for MotorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of applying a command to a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// OFF accepted.
    Stopped,
    /// INC/DEC accepted.
    Moving {
        /// Signed per-tick step.
        step: i32,
        /// Estimated full-range time used for the step.
        move_time_ms: u32,
    },
    /// Invalid direction code, or INC/DEC with zero speed. State unchanged.
    Unhandled,
}

/// Threshold band that stopped a motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// At or below 14% while moving DEC.
    Low,
    /// At or above 85% while moving INC.
    High,
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Motor that ticked.
    pub motor: MotorId,
    /// Motor was uncalibrated and jumped to the calibration position.
    pub calibrated: bool,
    /// Low latch cleared at the start of this tick.
    pub lo_latch_cleared: bool,
    /// High latch cleared at the start of this tick.
    pub hi_latch_cleared: bool,
    /// Direction in effect when the tick started.
    pub direction: Direction,
    /// Position before the step.
    pub from: FixedPos,
    /// Candidate position (`from + step`), applied only if within range.
    pub next: FixedPos,
    /// Position after the tick.
    pub position: FixedPos,
    /// Signed step in effect.
    pub step: i32,
    /// Step rejected because it would leave 0..=100%.
    pub end_stop: bool,
    /// Threshold stop that fired (and latched) this tick.
    pub threshold_stop: Option<Threshold>,
    /// When the current move started, if moving at tick start.
    pub move_started_at: Option<Instant>,
}

impl TickReport {
    /// Whether the motor was forced OFF during this tick.
    pub fn stopped(&self) -> bool {
        self.end_stop || self.threshold_stop.is_some()
    }
}

/// Read-only copy of a motor's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorSnapshot {
    /// Current position, `None` while uncalibrated.
    pub position: Option<FixedPos>,
    /// Learning state.
    pub learning_state: LearningState,
    /// Current direction.
    pub direction: Direction,
    /// Last accepted speed.
    pub speed: u8,
    /// Signed per-tick step.
    pub step: i32,
    /// Move start, `None` when stopped.
    pub move_started_at: Option<Instant>,
    /// High threshold latch.
    pub hi_latched: bool,
    /// Low threshold latch.
    pub lo_latched: bool,
}

/// Simulated seat motor.
#[derive(Debug, Clone)]
pub struct Motor {
    /// Motor identity
    id: MotorId,
    /// Fixed-point position; `None` until calibrated
    position: Option<FixedPos>,
    /// Reported learning state
    learning_state: LearningState,
    /// Commanded direction
    direction: Direction,
    /// Commanded speed
    speed: u8,
    /// Signed step per tick
    step: i32,
    /// Start of the current move
    move_started_at: Option<Instant>,
    /// Stopped at the high threshold, not yet left the band
    hi_latched: bool,
    /// Stopped at the low threshold, not yet left the band
    lo_latched: bool,
    /// Last percent written to a status frame (log de-duplication only)
    last_reported_percent: Option<i32>,
}

impl Motor {
    /// Create a stopped motor.
    pub fn new(id: MotorId, initial_percent: Option<u8>, learning_state: LearningState) -> Self {
        Self {
            id,
            position: initial_percent.map(|p| FixedPos::from_percent(i32::from(p))),
            learning_state,
            direction: Direction::Off,
            speed: 0,
            step: 0,
            move_started_at: None,
            hi_latched: false,
            lo_latched: false,
            last_reported_percent: None,
        }
    }

    /// Apply a decoded direction/speed command.
    ///
    /// The step is derived from `tick_delay_ms` at acceptance time.
    pub fn apply_command(&mut self, direction: Direction, speed: u8, tick_delay_ms: u64) -> CommandOutcome {
        match direction {
            Direction::Off => {
                self.halt();
                CommandOutcome::Stopped
            }
            Direction::Inc | Direction::Dec if speed > 0 => {
                let increment = per_tick_increment(speed, tick_delay_ms);
                self.direction = direction;
                self.speed = speed;
                self.step = if direction == Direction::Inc {
                    increment
                } else {
                    -increment
                };
                self.move_started_at = Some(Instant::now());
                CommandOutcome::Moving {
                    step: self.step,
                    move_time_ms: estimate_full_range_time_ms(speed),
                }
            }
            _ => CommandOutcome::Unhandled,
        }
    }

    /// Advance the motor by one tick.
    pub fn tick(&mut self, thresholds_enabled: bool) -> TickReport {
        let (current, calibrated) = match self.position {
            Some(pos) => (pos, false),
            None => {
                let pos = FixedPos::from_percent(CALIBRATION_PERCENT);
                self.position = Some(pos);
                (pos, true)
            }
        };

        let mut report = TickReport {
            motor: self.id,
            calibrated,
            lo_latch_cleared: false,
            hi_latch_cleared: false,
            direction: self.direction,
            from: current,
            next: current.offset(self.step),
            position: current,
            step: self.step,
            end_stop: false,
            threshold_stop: None,
            move_started_at: self.move_started_at,
        };

        if thresholds_enabled {
            if self.lo_latched && current.percent() > THRESHOLD_LO_PERCENT {
                self.lo_latched = false;
                report.lo_latch_cleared = true;
            }
            if self.hi_latched && current.percent() < THRESHOLD_HI_PERCENT {
                self.hi_latched = false;
                report.hi_latch_cleared = true;
            }
        }

        let next = report.next;
        match self.direction {
            Direction::Inc => {
                // TODO: carry the sub-percent fraction into the range check (99.x reads as 99).
                if next.percent() <= POS_MAX_PERCENT {
                    self.position = Some(next);
                } else {
                    self.halt();
                    report.end_stop = true;
                }
                if thresholds_enabled
                    && !self.hi_latched
                    && self.percent_or(current) >= THRESHOLD_HI_PERCENT
                {
                    self.halt();
                    self.hi_latched = true;
                    report.threshold_stop = Some(Threshold::High);
                }
            }
            Direction::Dec => {
                if next.percent() >= POS_MIN_PERCENT {
                    self.position = Some(next);
                } else {
                    self.halt();
                    report.end_stop = true;
                }
                if thresholds_enabled
                    && !self.lo_latched
                    && self.percent_or(current) <= THRESHOLD_LO_PERCENT
                {
                    self.halt();
                    self.lo_latched = true;
                    report.threshold_stop = Some(Threshold::Low);
                }
            }
            Direction::Off | Direction::Invalid => {}
        }

        report.position = self.position.unwrap_or(current);
        report
    }

    /// Stop and clear all motion state.
    fn halt(&mut self) {
        self.direction = Direction::Off;
        self.speed = 0;
        self.step = 0;
        self.move_started_at = None;
    }

    fn percent_or(&self, fallback: FixedPos) -> i32 {
        self.position.unwrap_or(fallback).percent()
    }

    /// Position byte for status frames.
    pub fn status_percent(&self) -> u8 {
        match self.position {
            Some(pos) => pos.percent().clamp(POS_MIN_PERCENT, POS_MAX_PERCENT) as u8,
            None => POSITION_INVALID_BYTE,
        }
    }

    /// Record the percent just reported; returns `true` if it changed.
    pub fn mark_reported(&mut self, percent: i32) -> bool {
        let changed = self.last_reported_percent != Some(percent);
        self.last_reported_percent = Some(percent);
        changed
    }

    /// Motor identity.
    pub fn id(&self) -> MotorId {
        self.id
    }

    /// Current position, `None` while uncalibrated.
    pub fn position(&self) -> Option<FixedPos> {
        self.position
    }

    /// Override the position (`None` = uncalibrated).
    pub fn set_position(&mut self, percent: Option<u8>) {
        self.position = percent.map(|p| FixedPos::from_percent(i32::from(p)));
    }

    /// Current direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Learning state.
    pub fn learning_state(&self) -> LearningState {
        self.learning_state
    }

    /// Set the reported learning state.
    pub fn set_learning_state(&mut self, state: LearningState) {
        self.learning_state = state;
    }

    /// Copy of the full motor state.
    pub fn snapshot(&self) -> MotorSnapshot {
        MotorSnapshot {
            position: self.position,
            learning_state: self.learning_state,
            direction: self.direction,
            speed: self.speed,
            step: self.step,
            move_started_at: self.move_started_at,
            hi_latched: self.hi_latched,
            lo_latched: self.lo_latched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY_MS: u64 = 10;

    fn motor_at(percent: u8) -> Motor {
        Motor::new(MotorId::Position, Some(percent), LearningState::Ok)
    }

    fn tick_until_stopped(motor: &mut Motor, thresholds: bool) -> usize {
        for n in 1..=10_000 {
            if motor.tick(thresholds).stopped() {
                return n;
            }
        }
        panic!("motor never stopped");
    }

    #[test]
    fn test_new_motor_is_stopped() {
        let motor = Motor::new(MotorId::Tilt, None, LearningState::Nok);
        let snap = motor.snapshot();
        assert_eq!(snap.position, None);
        assert_eq!(snap.direction, Direction::Off);
        assert_eq!(snap.speed, 0);
        assert_eq!(snap.step, 0);
        assert_eq!(snap.move_started_at, None);
        assert_eq!(motor.status_percent(), POSITION_INVALID_BYTE);
    }

    #[test]
    fn test_first_tick_calibrates() {
        let mut motor = Motor::new(MotorId::Height, None, LearningState::Ok);
        let report = motor.tick(true);
        assert!(report.calibrated);
        assert_eq!(motor.status_percent(), 42);

        let report = motor.tick(true);
        assert!(!report.calibrated);
    }

    #[test]
    fn test_inc_command_sets_motion() {
        let mut motor = motor_at(50);
        let outcome = motor.apply_command(Direction::Inc, 80, DELAY_MS);
        assert_eq!(
            outcome,
            CommandOutcome::Moving {
                step: 170,
                move_time_ms: 12_000
            }
        );
        let snap = motor.snapshot();
        assert_eq!(snap.direction, Direction::Inc);
        assert_eq!(snap.speed, 80);
        assert_eq!(snap.step, 170);
        assert!(snap.move_started_at.is_some());
    }

    #[test]
    fn test_dec_command_negates_step() {
        let mut motor = motor_at(50);
        motor.apply_command(Direction::Dec, 80, DELAY_MS);
        assert_eq!(motor.snapshot().step, -170);
        motor.tick(true);
        assert_eq!(motor.position().unwrap().raw(), 50 * 1024 - 170);
    }

    #[test]
    fn test_off_is_idempotent() {
        let mut motor = motor_at(50);
        motor.apply_command(Direction::Inc, 100, DELAY_MS);

        assert_eq!(motor.apply_command(Direction::Off, 100, DELAY_MS), CommandOutcome::Stopped);
        let first = motor.snapshot();
        assert_eq!(motor.apply_command(Direction::Off, 0, DELAY_MS), CommandOutcome::Stopped);
        let second = motor.snapshot();

        assert_eq!(first, second);
        assert_eq!(second.direction, Direction::Off);
        assert_eq!(second.speed, 0);
        assert_eq!(second.step, 0);
        assert_eq!(second.move_started_at, None);
    }

    #[test]
    fn test_unhandled_commands_leave_state() {
        let mut motor = motor_at(30);
        motor.apply_command(Direction::Dec, 90, DELAY_MS);
        let before = motor.snapshot();

        assert_eq!(motor.apply_command(Direction::Inc, 0, DELAY_MS), CommandOutcome::Unhandled);
        assert_eq!(motor.apply_command(Direction::Dec, 0, DELAY_MS), CommandOutcome::Unhandled);
        assert_eq!(motor.apply_command(Direction::Invalid, 80, DELAY_MS), CommandOutcome::Unhandled);
        assert_eq!(motor.snapshot(), before);
    }

    #[test]
    fn test_slow_speed_moves_with_zero_step() {
        let mut motor = motor_at(50);
        let outcome = motor.apply_command(Direction::Inc, 10, DELAY_MS);
        assert_eq!(
            outcome,
            CommandOutcome::Moving {
                step: 0,
                move_time_ms: 0
            }
        );
        motor.tick(true);
        assert_eq!(motor.direction(), Direction::Inc);
        assert_eq!(motor.status_percent(), 50);
    }

    #[test]
    fn test_off_tick_keeps_position() {
        let mut motor = motor_at(70);
        let report = motor.tick(true);
        assert_eq!(report.direction, Direction::Off);
        assert!(!report.stopped());
        assert_eq!(motor.status_percent(), 70);
    }

    #[test]
    fn test_high_threshold_stops_once() {
        let mut motor = motor_at(80);
        motor.apply_command(Direction::Inc, 130, DELAY_MS);
        tick_until_stopped(&mut motor, true);

        let snap = motor.snapshot();
        assert_eq!(snap.direction, Direction::Off);
        assert!(snap.hi_latched);
        let stopped_at = motor.status_percent();
        assert!(stopped_at >= 85);

        // Forced OFF: further ticks do not move.
        for _ in 0..5 {
            motor.tick(true);
        }
        assert_eq!(motor.status_percent(), stopped_at);

        // Latched: a new INC runs through the band to the end stop.
        motor.apply_command(Direction::Inc, 130, DELAY_MS);
        let mut last = None;
        for _ in 0..1000 {
            let report = motor.tick(true);
            if report.stopped() {
                last = Some(report);
                break;
            }
        }
        let last = last.unwrap();
        assert!(last.end_stop);
        assert_eq!(last.threshold_stop, None);
        assert_eq!(motor.status_percent(), 100);
    }

    #[test]
    fn test_high_latch_clears_below_band() {
        let mut motor = motor_at(84);
        motor.apply_command(Direction::Inc, 130, DELAY_MS);
        tick_until_stopped(&mut motor, true);
        assert!(motor.snapshot().hi_latched);

        motor.apply_command(Direction::Dec, 130, DELAY_MS);
        let mut cleared = false;
        for _ in 0..100 {
            if motor.tick(true).hi_latch_cleared {
                cleared = true;
                break;
            }
        }
        assert!(cleared);
        assert!(motor.status_percent() < 85);

        // Re-approach from below stops again.
        motor.apply_command(Direction::Inc, 130, DELAY_MS);
        let report = loop {
            let report = motor.tick(true);
            if report.stopped() {
                break report;
            }
        };
        assert_eq!(report.threshold_stop, Some(Threshold::High));
    }

    #[test]
    fn test_low_threshold_stops() {
        let mut motor = motor_at(20);
        motor.apply_command(Direction::Dec, 100, DELAY_MS);
        tick_until_stopped(&mut motor, true);
        let snap = motor.snapshot();
        assert!(snap.lo_latched);
        assert_eq!(snap.direction, Direction::Off);
        assert!(motor.status_percent() <= 14);
    }

    #[test]
    fn test_low_latch_clears_above_band() {
        let mut motor = motor_at(16);
        motor.apply_command(Direction::Dec, 130, DELAY_MS);
        tick_until_stopped(&mut motor, true);
        assert!(motor.snapshot().lo_latched);
        assert_eq!(motor.status_percent(), 14);

        motor.apply_command(Direction::Inc, 130, DELAY_MS);
        let mut cleared = false;
        for _ in 0..100 {
            if motor.tick(true).lo_latch_cleared {
                cleared = true;
                break;
            }
        }
        assert!(cleared);
        assert!(!motor.snapshot().lo_latched);
        assert!(motor.status_percent() > 14);

        // Re-approach from above stops again.
        motor.apply_command(Direction::Dec, 130, DELAY_MS);
        let report = loop {
            let report = motor.tick(true);
            if report.stopped() {
                break report;
            }
        };
        assert_eq!(report.threshold_stop, Some(Threshold::Low));
        assert_eq!(motor.status_percent(), 14);
    }

    #[test]
    fn test_low_latched_dec_runs_to_end_stop() {
        let mut motor = motor_at(16);
        motor.apply_command(Direction::Dec, 130, DELAY_MS);
        tick_until_stopped(&mut motor, true);
        assert!(motor.snapshot().lo_latched);

        motor.apply_command(Direction::Dec, 130, DELAY_MS);
        let mut last = None;
        for _ in 0..1000 {
            let report = motor.tick(true);
            if report.stopped() {
                last = Some(report);
                break;
            }
        }
        let last = last.unwrap();
        assert!(last.end_stop);
        assert_eq!(last.threshold_stop, None);
        assert_eq!(motor.status_percent(), 0);
        assert_eq!(motor.direction(), Direction::Off);
    }

    #[test]
    fn test_thresholds_disabled_runs_to_end_stop() {
        let mut motor = motor_at(50);
        motor.apply_command(Direction::Dec, 130, DELAY_MS);
        tick_until_stopped(&mut motor, false);
        let snap = motor.snapshot();
        assert!(!snap.lo_latched);
        assert_eq!(motor.status_percent(), 0);
        assert!(snap.position.unwrap().raw() >= 0);
    }

    #[test]
    fn test_end_stop_does_not_clamp() {
        let mut motor = Motor::new(MotorId::Position, None, LearningState::Ok);
        motor.set_position(Some(100));
        motor.apply_command(Direction::Inc, 200, DELAY_MS);
        let before = motor.position();
        let report = motor.tick(false);
        // 100% + 2% -> 102% is rejected; position stays.
        assert!(report.end_stop);
        assert_eq!(motor.position(), before);
        assert_eq!(motor.direction(), Direction::Off);
    }

    #[test]
    fn test_mark_reported_dedupes() {
        let mut motor = motor_at(10);
        assert!(motor.mark_reported(10));
        assert!(!motor.mark_reported(10));
        assert!(motor.mark_reported(11));
    }
}
