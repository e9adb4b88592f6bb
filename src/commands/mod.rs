//! Command implementations.
//!
//! CHANGELOG:
//! - 10/18/2026 - Reading, monitor, device info and setup commands

pub mod device;
pub mod monitor;
pub mod reading;
pub mod setup;
