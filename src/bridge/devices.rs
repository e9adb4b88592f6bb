//! `adb devices -l` parsing and target-device selection.

use serde::Serialize;

use crate::error::{Result, SmsError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Device,
    Unauthorized,
    Offline,
    Other(String),
}

impl DeviceState {
    fn from_token(token: &str) -> Self {
        match token {
            "device" => DeviceState::Device,
            "unauthorized" => DeviceState::Unauthorized,
            "offline" => DeviceState::Offline,
            other => DeviceState::Other(other.to_string()),
        }
    }
}

/// One line of `adb devices -l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub serial: String,
    pub state: DeviceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl Device {
    pub fn is_authorized(&self) -> bool {
        self.state == DeviceState::Device
    }
}

/// Parse the output of `adb devices -l`.
///
/// Lines look like:
///     List of devices attached
///     R58M12ABCDE    device usb:1-1 product:beyond1 model:SM_G973F device:beyond1 transport_id:3
///     emulator-5554  unauthorized transport_id:1
pub fn parse_devices(text: &str) -> Vec<Device> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
                return None;
            }

            let mut parts = line.split_whitespace();
            let serial = parts.next()?.to_string();
            let state = DeviceState::from_token(parts.next()?);

            let mut model = None;
            let mut product = None;
            for attr in parts {
                if let Some((key, value)) = attr.split_once(':') {
                    match key {
                        "model" => model = Some(value.to_string()),
                        "product" => product = Some(value.to_string()),
                        _ => {}
                    }
                }
            }

            Some(Device { serial, state, model, product })
        })
        .collect()
}

/// Pick the device to talk to.
///
/// An explicit `requested` serial wins unless the listing shows it
/// unauthorized. Otherwise exactly one authorized device must be attached.
pub fn select_device(devices: &[Device], requested: Option<&str>) -> Result<String> {
    if let Some(serial) = requested {
        if let Some(dev) = devices.iter().find(|d| d.serial == serial) {
            if dev.state == DeviceState::Unauthorized {
                return Err(SmsError::Unauthorized { devices: vec![dev.serial.clone()] });
            }
        }
        return Ok(serial.to_string());
    }

    let authorized: Vec<&Device> = devices.iter().filter(|d| d.is_authorized()).collect();
    match authorized.as_slice() {
        [only] => Ok(only.serial.clone()),
        [] => {
            let unauthorized: Vec<String> = devices
                .iter()
                .filter(|d| d.state == DeviceState::Unauthorized)
                .map(|d| d.serial.clone())
                .collect();
            if unauthorized.is_empty() {
                Err(SmsError::NoDevice)
            } else {
                Err(SmsError::Unauthorized { devices: unauthorized })
            }
        }
        many => Err(SmsError::AmbiguousDevice {
            devices: many.iter().map(|d| d.serial.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "List of devices attached\n\
        R58M12ABCDE    device usb:1-1 product:beyond1 model:SM_G973F device:beyond1 transport_id:3\n\
        emulator-5554  offline transport_id:1\n\
        \n";

    #[test]
    fn test_parse_devices_with_attributes() {
        let devices = parse_devices(LISTING);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].serial, "R58M12ABCDE");
        assert_eq!(devices[0].state, DeviceState::Device);
        assert_eq!(devices[0].model.as_deref(), Some("SM_G973F"));
        assert_eq!(devices[0].product.as_deref(), Some("beyond1"));
        assert_eq!(devices[1].state, DeviceState::Offline);
    }

    #[test]
    fn test_parse_skips_daemon_chatter() {
        let text = "* daemon not running; starting now at tcp:5037\n* daemon started successfully\nList of devices attached\n";
        assert!(parse_devices(text).is_empty());
    }

    #[test]
    fn test_select_single_authorized_ignores_offline() {
        let devices = parse_devices(LISTING);
        assert_eq!(select_device(&devices, None).unwrap(), "R58M12ABCDE");
    }

    #[test]
    fn test_select_none() {
        assert!(matches!(select_device(&[], None), Err(SmsError::NoDevice)));
    }

    #[test]
    fn test_select_only_unauthorized() {
        let devices = parse_devices("List of devices attached\nabc unauthorized transport_id:2\n");
        match select_device(&devices, None) {
            Err(SmsError::Unauthorized { devices }) => assert_eq!(devices, vec!["abc".to_string()]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_select_ambiguous() {
        let devices = parse_devices("List of devices attached\na device\nb device\n");
        match select_device(&devices, None) {
            Err(SmsError::AmbiguousDevice { devices }) => assert_eq!(devices, vec!["a", "b"]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_select_explicit() {
        let devices = parse_devices("List of devices attached\na device\nb device\nc unauthorized\n");
        assert_eq!(select_device(&devices, Some("b")).unwrap(), "b");
        // Not listed: passed through, adb reports the failure itself.
        assert_eq!(select_device(&devices, Some("zzz")).unwrap(), "zzz");
        assert!(matches!(
            select_device(&devices, Some("c")),
            Err(SmsError::Unauthorized { .. })
        ));
    }
}
