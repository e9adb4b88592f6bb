//! One-shot reading: fetch, group, print.
//!
//! CHANGELOG:
//! - 10/18/2026 - Contacts failures fall back to unresolved numbers
//! - 10/18/2026 - Initial implementation

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::bridge::{queries, AdbBridge};
use crate::contacts::{build_contact_map, ContactMap, PhoneNormalizer};
use crate::conversation::{self, Mode};
use crate::error::Result as SmsResult;
use crate::output::OutputControls;
use crate::provider::{parse_records, MessageRecord};

/// Query and decode every SMS row on the device.
pub fn fetch_records(bridge: &AdbBridge, serial: &str) -> SmsResult<Vec<MessageRecord>> {
    let raw = bridge.run_query(Some(serial), &queries::SMS_MESSAGES)?;
    let records = parse_records(&raw)?;
    debug!(count = records.len(), "parsed sms records");
    Ok(records)
}

/// Query the contacts provider. Failure is not fatal: senders then show as
/// plain numbers.
pub fn fetch_contacts(bridge: &AdbBridge, serial: &str, normalizer: &PhoneNormalizer) -> ContactMap {
    let result = bridge
        .run_query(Some(serial), &queries::CONTACT_PHONES)
        .and_then(|raw| build_contact_map(&raw, normalizer.clone()));

    match result {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "contacts unavailable, showing raw numbers");
            ContactMap::empty(normalizer.clone())
        }
    }
}

/// Print the `limit` most recent conversations, messages or senders.
pub fn show(
    bridge: &AdbBridge,
    serial: &str,
    limit: usize,
    mode: Mode,
    normalizer: &PhoneNormalizer,
    output: &OutputControls,
) -> Result<()> {
    let records = fetch_records(bridge, serial).context("Failed to read SMS messages")?;
    let contacts = fetch_contacts(bridge, serial, normalizer);

    let view = conversation::group(records, &contacts, limit, mode);
    output.present(&view);
    Ok(())
}
