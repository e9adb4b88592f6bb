//! Bridge to the device: adb invocation, device selection, provider queries.

pub mod adb;
pub mod devices;
pub mod queries;

pub use adb::AdbBridge;
