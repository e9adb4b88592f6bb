//! Device summary: model, Android version, SIM number, operator, IMEI,
//! Android ID.
//!
//! The SIM number and IMEI come from `service call iphonesubinfo`, which
//! prints a binder parcel dump; many ROMs hide both behind READ_PHONE_STATE
//! and return an empty parcel.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::bridge::AdbBridge;
use crate::output::{self, OutputControls};

const UNKNOWN: &str = "Unknown";

/// `iphonesubinfo` transaction codes: line 1 number and device id.
const SIM_NUMBER_CODE: &str = "15";
const IMEI_CODE: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub serial: String,
    pub model: String,
    pub android_version: String,
    pub sim_number: String,
    pub operator: String,
    pub imei: String,
    pub android_id: String,
}

impl DeviceInfo {
    /// Gather properties through `shell`, which runs one device shell
    /// command and returns its stdout or `None` on failure.
    pub fn gather<S>(serial: &str, mut shell: S) -> Self
    where
        S: FnMut(&[&str]) -> Option<String>,
    {
        let mut prop = |args: &[&str]| clean(shell(args));
        let model = prop(&["getprop", "ro.product.model"]);
        let android_version = prop(&["getprop", "ro.build.version.release"]);
        let operator = prop(&["getprop", "gsm.sim.operator.alpha"]);
        let android_id = prop(&["settings", "get", "secure", "android_id"]);

        let mut parcel = |code: &str| {
            let out = shell(&["service", "call", "iphonesubinfo", code]);
            clean(out.and_then(|text| parcel_string(&text)))
        };
        let sim_number = parcel(SIM_NUMBER_CODE);
        let imei = parcel(IMEI_CODE);

        Self {
            serial: serial.to_string(),
            model,
            android_version,
            sim_number,
            operator,
            imei,
            android_id,
        }
    }
}

/// Trim shell output; empty, "null" or failed reads become "Unknown".
fn clean(value: Option<String>) -> String {
    let value = value.unwrap_or_default();
    let value = value.trim().trim_matches(',');
    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

/// Recover the string carried by a parcel dump such as
///
/// ```text
/// Result: Parcel(
///   0x00000000: 00000000 0000000b 00350031 00350035 '........1.5.5.5.'
///   0x00000010: 00300031 00300030 00000000          '1.0.0.0.....    '
/// )
/// ```
///
/// by joining the quoted fragments and dropping padding dots and blanks.
pub fn parcel_string(dump: &str) -> Option<String> {
    let mut text = String::new();
    for line in dump.lines() {
        let (Some(open), Some(close)) = (line.find('\''), line.rfind('\'')) else {
            continue;
        };
        if close > open {
            text.push_str(&line[open + 1..close]);
        }
    }
    let value: String = text.chars().filter(|c| *c != '.' && !c.is_whitespace()).collect();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn info(bridge: &AdbBridge, serial: &str, output: &OutputControls) -> Result<()> {
    let info = DeviceInfo::gather(serial, |args| match bridge.shell(serial, args) {
        Ok(out) => Some(out),
        Err(e) => {
            debug!(error = %e, "device property unavailable");
            None
        }
    });

    if output.json {
        output.print(&info);
    } else {
        print!(
            "{}",
            output::render_fields(
                "Device",
                &[
                    ("Serial", info.serial.as_str()),
                    ("Model", info.model.as_str()),
                    ("Android", info.android_version.as_str()),
                    ("SIM Number", info.sim_number.as_str()),
                    ("Operator", info.operator.as_str()),
                    ("IMEI", info.imei.as_str()),
                    ("Android ID", info.android_id.as_str()),
                ],
            )
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIM_PARCEL: &str = "Result: Parcel(\n  \
        0x00000000: 00000000 00000008 00350031 00350035 '........1.5.5.5.'\n  \
        0x00000010: 00300031 00300030 00000000          '1.0.0.0.....    ')\n";

    const EMPTY_PARCEL: &str = "Result: Parcel(00000000 ffffffff   '........')\n";

    #[test]
    fn test_parcel_string() {
        assert_eq!(parcel_string(SIM_PARCEL).as_deref(), Some("15551000"));
        assert_eq!(parcel_string(EMPTY_PARCEL), None);
        assert_eq!(parcel_string("service: not found"), None);
    }

    #[test]
    fn test_gather_with_fallbacks() {
        let info = DeviceInfo::gather("R58M", |args| match args {
            ["getprop", "ro.product.model"] => Some("Pixel 7\n".to_string()),
            ["getprop", "ro.build.version.release"] => Some("14\r\n".to_string()),
            ["getprop", "gsm.sim.operator.alpha"] => Some("T-Mobile,\n".to_string()),
            ["settings", ..] => Some("null\n".to_string()),
            ["service", "call", "iphonesubinfo", "15"] => Some(SIM_PARCEL.to_string()),
            ["service", "call", "iphonesubinfo", "1"] => Some(EMPTY_PARCEL.to_string()),
            _ => None,
        });
        assert_eq!(info.model, "Pixel 7");
        assert_eq!(info.android_version, "14");
        assert_eq!(info.operator, "T-Mobile");
        assert_eq!(info.android_id, "Unknown");
        assert_eq!(info.sim_number, "15551000");
        assert_eq!(info.imei, "Unknown");
    }

    #[test]
    fn test_all_failures_unknown() {
        let info = DeviceInfo::gather("x", |_| None);
        assert_eq!(info.model, UNKNOWN);
        assert_eq!(info.operator, UNKNOWN);
        assert_eq!(info.sim_number, UNKNOWN);
        assert_eq!(info.imei, UNKNOWN);
    }
}
