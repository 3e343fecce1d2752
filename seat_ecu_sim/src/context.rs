//! Simulation context: lifecycle and socket entry points.
//!
//! A [`SimContext`] owns the three motors, the configuration and the read
//! phase cursor. It is created from a [`SimConfig`], bound to a transport by
//! [`SimContext::start`] and released by [`SimContext::close`].
//!
//! # Lifecycle
//!
//! | state | read | write |
//! |-------|------|-------|
//! | unbound (new / closed) | `InvalidContext` | `InvalidContext` |
//! | bound, active | tick + status frame | decode + apply command |
//! | bound, suspended | `SimulatedTimeout` after one tick delay | `SimulatedTimeout` |

use crate::command::CommandFrame;
use crate::motor::{Motor, MotorId};
use crate::observer::{SimObserver, TracingObserver};
use crate::status::{Phase, encode_status};
use crate::transport::{SocketCallbacks, TransportHandle};
use seat_common::config::{ConfigError, SimConfig};
use seat_common::consts::FRAME_LEN;
use seat_common::error::SimError;
use seat_common::frame::CanFrame;
use seat_common::protocol::LearningState;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One simulated seat ECU pair driving three motors.
pub struct SimContext {
    /// Configuration captured at creation
    config: SimConfig,
    /// Motors indexed by [`MotorId::index`]
    motors: [Motor; 3],
    /// Group ticked and reported by the next read
    phase: Phase,
    /// Gates reads and writes while bound
    active: bool,
    /// Bound transport, `None` before start and after close
    handle: Option<TransportHandle>,
    /// Diagnostics sink
    observer: Box<dyn SimObserver>,
}

impl SimContext {
    /// Create a context logging through `tracing`.
    pub fn new(config: SimConfig) -> Self {
        let observer = TracingObserver::from_config(&config);
        Self::with_observer(config, Box::new(observer))
    }

    /// Create a context with a custom observer.
    pub fn with_observer(config: SimConfig, mut observer: Box<dyn SimObserver>) -> Self {
        let motors = MotorId::ALL
            .map(|id| Motor::new(id, config.initial_position, config.learning_state));
        observer.on_init(&config);
        Self {
            config,
            motors,
            phase: Phase::default(),
            active: false,
            handle: None,
            observer,
        }
    }

    /// Create a context from defaults plus `SAE_*` environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = SimConfig::default().with_env_overrides()?;
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Bind to a transport and activate.
    pub fn start(&mut self, handle: TransportHandle) {
        info!("Simulation started on {}", handle);
        self.handle = Some(handle);
        self.active = true;
    }

    /// Deactivate and release the transport.
    ///
    /// Does not wait for a read that is still sleeping; callers serialize access.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!("Simulation closed on {}", handle);
        }
        self.active = false;
    }

    /// Stop answering while staying bound; reads time out.
    pub fn suspend(&mut self) {
        debug!("Simulation suspended");
        self.active = false;
    }

    /// Answer again after [`suspend`](Self::suspend). No effect when unbound.
    pub fn resume(&mut self) {
        if self.handle.is_none() {
            warn!("Resume ignored: simulation not started");
            return;
        }
        debug!("Simulation resumed");
        self.active = true;
    }

    /// Read entry point: tick the current phase and emit its status frame.
    pub fn read(&mut self, frame: &mut CanFrame, len: usize) -> Result<usize, SimError> {
        self.ensure_bound()?;
        check_len(len)?;
        if !self.active {
            self.simulate_latency();
            return Err(SimError::SimulatedTimeout {
                delay_ms: self.config.tick_delay_ms,
            });
        }

        let phase = self.phase;
        for &id in phase.motors() {
            let report = self.motors[id.index()].tick(self.config.threshold_enabled);
            if report.calibrated {
                self.simulate_latency();
            }
            self.observer.on_tick(&report);
        }

        let status = encode_status(phase, |id| &self.motors[id.index()]);
        let mut changed = false;
        for &id in phase.motors() {
            let motor = &mut self.motors[id.index()];
            let percent = i32::from(motor.status_percent());
            changed |= motor.mark_reported(percent);
        }
        self.observer.on_status(&status, changed);

        *frame = status;
        self.phase = phase.next();
        self.simulate_latency();
        Ok(FRAME_LEN)
    }

    /// Write entry point: decode a command frame and apply it.
    ///
    /// Unknown identifiers and unhandled direction codes are logged and
    /// otherwise ignored; the frame still counts as consumed.
    pub fn write(&mut self, frame: &CanFrame, len: usize) -> Result<usize, SimError> {
        self.ensure_bound()?;
        check_len(len)?;
        if !self.active {
            return Err(SimError::SimulatedTimeout { delay_ms: 0 });
        }

        self.observer.on_frame_written(frame);
        let Some(command) = CommandFrame::decode(frame) else {
            self.observer.on_frame_ignored(frame);
            return Ok(len);
        };
        self.observer.on_command_frame(&command);

        let tick_delay_ms = self.config.tick_delay_ms;
        for (id, slot) in command.routed() {
            let outcome =
                self.motors[id.index()].apply_command(slot.direction, slot.speed, tick_delay_ms);
            self.observer.on_command(id, slot, outcome, tick_delay_ms);
        }
        Ok(len)
    }

    /// [`read`](Self::read) a full frame.
    pub fn read_frame(&mut self) -> Result<CanFrame, SimError> {
        let mut frame = CanFrame::default();
        self.read(&mut frame, FRAME_LEN)?;
        Ok(frame)
    }

    /// [`write`](Self::write) a full frame.
    pub fn write_frame(&mut self, frame: &CanFrame) -> Result<usize, SimError> {
        self.write(frame, FRAME_LEN)
    }

    fn ensure_bound(&self) -> Result<(), SimError> {
        if self.handle.is_none() {
            return Err(SimError::InvalidContext);
        }
        Ok(())
    }

    fn simulate_latency(&self) {
        if self.config.tick_delay_ms > 0 {
            thread::sleep(Duration::from_millis(self.config.tick_delay_ms));
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Phase of the next read.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether reads and writes are answered.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Bound transport, if any.
    pub fn handle(&self) -> Option<TransportHandle> {
        self.handle
    }

    /// Motor state.
    pub fn motor(&self, id: MotorId) -> &Motor {
        &self.motors[id.index()]
    }

    /// Override a motor's learning state.
    pub fn set_learning_state(&mut self, id: MotorId, state: LearningState) {
        self.motors[id.index()].set_learning_state(state);
    }

    /// Override a motor's position (`None` = uncalibrated).
    pub fn set_position(&mut self, id: MotorId, percent: Option<u8>) {
        self.motors[id.index()].set_position(percent);
    }
}

impl SocketCallbacks for SimContext {
    fn on_read(&mut self, frame: &mut CanFrame, len: usize) -> Result<usize, SimError> {
        self.read(frame, len)
    }

    fn on_write(&mut self, frame: &CanFrame, len: usize) -> Result<usize, SimError> {
        self.write(frame, len)
    }
}

fn check_len(len: usize) -> Result<(), SimError> {
    if len != FRAME_LEN {
        return Err(SimError::InvalidBufferLength {
            expected: FRAME_LEN,
            actual: len,
        });
    }
    Ok(())
}
