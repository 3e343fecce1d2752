//! Diagnostics observers.
//!
//! The engine reports what it does through [`SimObserver`]; nothing in the
//! motion or codec path depends on logging or wall-clock time. The default
//! [`TracingObserver`] renders events with `tracing`, gated by the `debug`
//! and `verbose` configuration flags.

use crate::command::{CommandFrame, MotorCommand};
use crate::motor::{CommandOutcome, MotorId, Threshold, TickReport};
use crate::position::FixedPos;
use crate::status::StatusFrame;
use seat_common::config::SimConfig;
use seat_common::frame::{CanFrame, hex_dump};
use seat_common::protocol::Direction;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Receives engine events. All methods default to no-ops.
pub trait SimObserver: Send {
    /// Context initialized with `config`.
    fn on_init(&mut self, _config: &SimConfig) {}

    /// Raw frame accepted by a write, before decoding.
    fn on_frame_written(&mut self, _frame: &CanFrame) {}

    /// Write carried an identifier that is not a motor command.
    fn on_frame_ignored(&mut self, _frame: &CanFrame) {}

    /// Command frame decoded.
    fn on_command_frame(&mut self, _command: &CommandFrame) {}

    /// Slot command applied to a motor.
    fn on_command(
        &mut self,
        _motor: MotorId,
        _command: MotorCommand,
        _outcome: CommandOutcome,
        _tick_delay_ms: u64,
    ) {
    }

    /// Motor ticked.
    fn on_tick(&mut self, _report: &TickReport) {}

    /// Status frame produced; `changed` if any reported position differs from the last report.
    fn on_status(&mut self, _frame: &CanFrame, _changed: bool) {}
}

/// Observer that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimObserver for NullObserver {}

/// Observer logging through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    debug: bool,
    verbose: bool,
}

impl TracingObserver {
    /// Observer with explicit flags.
    pub const fn new(debug: bool, verbose: bool) -> Self {
        Self { debug, verbose }
    }

    /// Observer using the flags of `config`.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.debug, config.verbose)
    }
}

impl SimObserver for TracingObserver {
    fn on_init(&mut self, config: &SimConfig) {
        if !self.debug {
            return;
        }
        let pos = config
            .initial_position
            .map_or_else(|| "INV".to_string(), |p| p.to_string());
        info!(
            "Initialized with [ SAE_POS:{}, SAE_DELAY:{}, SAE_LRN:{}, SAE_STOP:{}, SAE_ALL:{}, SAE_DEBUG:{}, SAE_VERBOSE:{} ]",
            pos,
            config.tick_delay_ms,
            config.learning_state,
            config.threshold_enabled,
            config.all_motors,
            config.debug,
            config.verbose
        );
    }

    fn on_frame_written(&mut self, frame: &CanFrame) {
        if self.verbose {
            trace!("TX buf: {}", hex_dump(&frame.data));
        }
        if self.debug {
            debug!(
                "TX: can_frame {{ canID:{:4x}, dlc:{}, data: [{}] }}",
                frame.id,
                frame.dlc,
                hex_dump(frame.payload())
            );
        }
    }

    fn on_frame_ignored(&mut self, frame: &CanFrame) {
        debug!("Ignoring frame with id {:#05x}", frame.id);
    }

    fn on_command_frame(&mut self, command: &CommandFrame) {
        let s = &command.slots;
        info!(
            "{} {{ m1_dir:{}, m1_rpm:{},  m2_dir:{}, m2_rpm:{},  m3_dir:{}, m3_rpm:{},  m4_dir:{}, m4_rpm:{} }}",
            command.kind.name(),
            s[0].direction.bits(),
            s[0].speed,
            s[1].direction.bits(),
            s[1].speed,
            s[2].direction.bits(),
            s[2].speed,
            s[3].direction.bits(),
            s[3].speed
        );
        for (slot, cmd) in command.unrouted() {
            trace!("Slot {} not modelled, dropped: {:?}", slot, cmd);
        }
    }

    fn on_command(
        &mut self,
        motor: MotorId,
        command: MotorCommand,
        outcome: CommandOutcome,
        tick_delay_ms: u64,
    ) {
        match outcome {
            CommandOutcome::Stopped => info!("*** {}::OFF", motor),
            CommandOutcome::Moving { step, move_time_ms } if self.debug => info!(
                "*** {}::{} [ step:{}, delay:{}, move_time:{} ]",
                motor,
                command.direction,
                FixedPos::from_raw(step),
                tick_delay_ms,
                move_time_ms
            ),
            CommandOutcome::Moving { .. } => info!("*** {}::{}", motor, command.direction),
            CommandOutcome::Unhandled => warn!(
                "Unhandled motor status for {}: {:#04x} (speed {})",
                motor,
                command.direction.bits(),
                command.speed
            ),
        }
    }

    fn on_tick(&mut self, report: &TickReport) {
        let motor = report.motor;
        if report.calibrated {
            info!("*** {}: resetting invalid position to {}", motor, report.from.percent());
        }
        if report.lo_latch_cleared {
            info!("*** {}: low threshold stop reset", motor);
        }
        if report.hi_latch_cleared {
            info!("*** {}: high threshold stop reset", motor);
        }
        if self.verbose && report.step != 0 {
            let elapsed_ms = report
                .move_started_at
                .map_or(0, |started| Instant::now().duration_since(started).as_millis());
            trace!(
                "--> {} pos:{}, new:{}, step:{}, elapsed:{}",
                motor,
                report.from,
                report.next,
                FixedPos::from_raw(report.step),
                elapsed_ms
            );
        }
        if report.end_stop {
            debug!("{}: end of range, stopping at {}%", motor, report.position.percent());
        }
        match report.threshold_stop {
            Some(Threshold::High) => info!(
                "* [{}] {}: stopping at {}%",
                Direction::Inc,
                motor,
                report.position.percent()
            ),
            Some(Threshold::Low) => info!(
                "* [{}] {}: stopping at {}%",
                Direction::Dec,
                motor,
                report.position.percent()
            ),
            None => {}
        }
    }

    fn on_status(&mut self, frame: &CanFrame, changed: bool) {
        if self.debug && changed {
            if let Some(status) = StatusFrame::decode(frame) {
                debug!("Generated: {}", status);
            }
        }
        if self.verbose {
            trace!("--> {}", hex_dump(&frame.data));
        }
    }
}
