//! Error types surfaced by the simulator entry points.
//!
//! Only conditions a caller can act on are errors. Unknown frame identifiers
//! and unhandled direction codes are reported as outcomes and logged instead.

use thiserror::Error;

/// Errors returned by the simulated socket read/write entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// Context was never started or has been closed.
    #[error("Invalid simulation context (not started or closed)")]
    InvalidContext,

    /// Buffer length differs from the frame payload size.
    #[error("Unexpected buffer length: {actual} (expected {expected})")]
    InvalidBufferLength {
        /// Required length.
        expected: usize,
        /// Length supplied by the caller.
        actual: usize,
    },

    /// Simulated ECU is inactive; the read timed out after one tick delay.
    #[error("Simulated read timeout after {delay_ms}ms")]
    SimulatedTimeout {
        /// Latency that elapsed before failing.
        delay_ms: u64,
    },
}

impl SimError {
    /// Whether retrying the same call can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SimulatedTimeout { .. })
    }

    /// errno value the socket mock reports for this error.
    pub const fn errno(&self) -> i32 {
        match self {
            Self::InvalidContext | Self::InvalidBufferLength { .. } => libc::EINVAL,
            Self::SimulatedTimeout { .. } => libc::EAGAIN,
        }
    }
}

impl From<SimError> for std::io::Error {
    fn from(err: SimError) -> Self {
        let kind = match err {
            SimError::InvalidContext | SimError::InvalidBufferLength { .. } => {
                std::io::ErrorKind::InvalidInput
            }
            SimError::SimulatedTimeout { .. } => std::io::ErrorKind::WouldBlock,
        };
        std::io::Error::new(kind, err)
    }
}

/// Errors parsing the `ID#DATA` frame notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameParseError {
    /// Missing `#` separator.
    #[error("Missing '#' separator in frame '{0}'")]
    MissingSeparator(String),

    /// Identifier is not valid hex or exceeds 29 bits.
    #[error("Invalid frame identifier '{0}'")]
    InvalidId(String),

    /// Payload is not valid hex.
    #[error("Invalid frame payload '{0}'")]
    InvalidData(String),

    /// Payload longer than a classic frame.
    #[error("Frame payload too long: {0} bytes (max 8)")]
    TooLong(usize),
}
