//! Seat ECU Simulator Common Library
//!
//! Shared wire constants, frame types, error types and configuration loading
//! for the seat ECU simulator workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Frame identifiers, thresholds and simulation defaults
//! - [`frame`] - `CanFrame` and its `ID#DATA` text notation
//! - [`protocol`] - Direction and learning-state wire codes
//! - [`error`] - Entry point and frame parsing errors
//! - [`config`] - TOML + environment configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use seat_common::prelude::*;
//!
//! let frame: CanFrame = "707#05.50.00.00.00.00.00.00".parse().unwrap();
//! assert_eq!(frame.id, SECU2_CMD_1_FRAME_ID);
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod prelude;
pub mod protocol;
