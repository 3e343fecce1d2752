//! Socket mock interface.
//!
//! The mocked CAN socket forwards its `read()`/`write()` calls to a
//! [`SocketCallbacks`] implementation and hands the context a
//! [`TransportHandle`] when it opens.

use seat_common::error::SimError;
use seat_common::frame::CanFrame;
use std::fmt;

/// Opaque handle of the socket a context is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportHandle(pub i32);

impl fmt::Display for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fd:{}", self.0)
    }
}

/// Callbacks invoked by the socket mock.
///
/// `len` is the payload length the caller passed; only full frames are accepted.
/// Calls block for the simulated latency and must not run concurrently on
/// one implementor.
pub trait SocketCallbacks {
    /// Fill `frame` with the next status frame. Returns bytes written.
    fn on_read(&mut self, frame: &mut CanFrame, len: usize) -> Result<usize, SimError>;

    /// Consume a command frame. Returns bytes consumed.
    fn on_write(&mut self, frame: &CanFrame, len: usize) -> Result<usize, SimError>;
}
