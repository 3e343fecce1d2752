//! # Seat ECU Simulator
//!
//! Software stand-in for a seat adjustment ECU on a CAN bus. A mocked socket
//! forwards the driver's `read()`/`write()` calls here; writes carry motor
//! commands, reads return status frames from a simulated fore/aft, tilt and
//! height motor.
//!
//! # Module Structure
//!
//! - [`position`] - Fixed-point position codec
//! - [`motion`] - Speed to per-tick step estimation
//! - [`motor`] - Per-motor state machine with threshold stops
//! - [`command`] - Command frame decoding and routing
//! - [`status`] - Status frame encoding and read phases
//! - [`context`] - `SimContext` lifecycle and entry points
//! - [`observer`] - Diagnostics observers
//! - [`transport`] - Socket mock callback interface
//!
//! # Architecture
//!
//! ```text
//!   socket mock ──write──► CommandFrame::decode ──► Motor::apply_command
//!        │                                             │
//!        └────read───► Phase ──► Motor::tick ──► encode_status ──► CanFrame
//!                                     │
//!                                     ▼
//!                               SimObserver (tracing)
//! ```

#![deny(missing_docs)]

pub mod command;
pub mod context;
pub mod motion;
pub mod motor;
pub mod observer;
pub mod position;
pub mod status;
pub mod transport;

pub use crate::context::SimContext;
pub use crate::motor::{Motor, MotorId};
pub use crate::observer::{NullObserver, SimObserver, TracingObserver};
pub use crate::status::Phase;
pub use crate::transport::{SocketCallbacks, TransportHandle};
