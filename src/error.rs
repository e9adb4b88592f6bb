//! Error taxonomy for device selection, bridge calls, and dump parsing.
//!
//! Individual malformed rows never surface here; they are dropped by the
//! parsers. `Parse` is reserved for a dump that is unusable as a whole.
//!
//! CHANGELOG:
//! - 10/18/2026 - Added Unauthorized and AdbNotFound variants
//! - 10/18/2026 - Initial error enum

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("no authorized Android device connected")]
    NoDevice,

    #[error("multiple devices connected ({}); pick one with --device <id>", .devices.join(", "))]
    AmbiguousDevice { devices: Vec<String> },

    #[error("device not authorized ({}); accept the \"Allow USB debugging\" prompt on the phone", .devices.join(", "))]
    Unauthorized { devices: Vec<String> },

    #[error("'{program}' not found; install Android Platform Tools or pass --adb <path> (see --setup)")]
    AdbNotFound { program: String },

    #[error("`{command}` failed: {message}")]
    Bridge { command: String, message: String },

    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("could not parse {what}: {message}")]
    Parse { what: &'static str, message: String },
}

impl SmsError {
    /// True for failures of a single bridge call, which a monitor can outlive.
    pub fn is_bridge_failure(&self) -> bool {
        matches!(
            self,
            SmsError::Bridge { .. } | SmsError::Timeout { .. } | SmsError::Parse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_lists_devices() {
        let err = SmsError::AmbiguousDevice {
            devices: vec!["emulator-5554".into(), "R58M123".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("emulator-5554, R58M123"));
        assert!(msg.contains("--device"));
    }

    #[test]
    fn test_bridge_failure_kinds() {
        assert!(SmsError::Timeout { command: "adb".into(), secs: 5 }.is_bridge_failure());
        assert!(SmsError::Bridge { command: "adb".into(), message: "closed".into() }.is_bridge_failure());
        assert!(!SmsError::NoDevice.is_bridge_failure());
        assert!(!SmsError::AdbNotFound { program: "adb".into() }.is_bridge_failure());
    }
}
