//! SMS rows decoded into [`MessageRecord`]s.
//!
//! Row policy:
//! - `address` (sender) and `date` (timestamp) are required; a row missing
//!   either is dropped and the rest of the dump is still read.
//! - A `date` that cannot be read as a time becomes timestamp 0. The record
//!   is kept and sorts after every dated message.
//! - Unknown keys are ignored.
//!
//! CHANGELOG:
//! - 10/18/2026 - Accept second and RFC 3339 timestamps
//! - 10/18/2026 - Initial decoder

use chrono::DateTime;
use serde::Serialize;
use tracing::debug;

use super::rows::{self, Row};
use crate::error::Result;

/// Below this an integer timestamp is read as seconds rather than millis.
const SECONDS_CUTOFF: i64 = 100_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Received,
    Sent,
}

impl Direction {
    /// Map the provider's `type` column (1 inbox, 2 sent, 3 draft, 4 outbox,
    /// 5 failed, 6 queued). Anything else reads as received.
    pub fn from_type(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("2") | Some("3") | Some("4") | Some("5") | Some("6") => Direction::Sent,
            _ => Direction::Received,
        }
    }
}

/// One SMS row. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sender_raw: String,
    pub body: String,
    /// Epoch milliseconds; 0 when the row's date was unreadable.
    pub timestamp: i64,
    pub thread_id: String,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

/// Identity of a record across dumps. Row ids are not stable between dumps,
/// so thread, time, and sender stand in for one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub thread_id: String,
    pub timestamp: i64,
    pub sender_raw: String,
}

impl MessageRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            thread_id: self.thread_id.clone(),
            timestamp: self.timestamp,
            sender_raw: self.sender_raw.clone(),
        }
    }

    /// Decode one row, or `None` if a required field is missing.
    pub fn from_row(row: &Row) -> Option<Self> {
        let sender_raw = row.get("address")?.trim().to_string();
        let timestamp = normalize_timestamp(row.get("date")?);

        Some(Self {
            id: row.get("_id").map(String::from),
            sender_raw,
            body: row.get("body").unwrap_or_default().to_string(),
            timestamp,
            thread_id: row.get("thread_id").unwrap_or_default().to_string(),
            direction: Direction::from_type(row.get("type")),
            read: row.get("read").map(|r| r.trim() == "1"),
        })
    }
}

/// Parse a full SMS dump.
///
/// Only a dump that is an error report as a whole fails; malformed rows are
/// skipped.
pub fn parse_records(raw: &str) -> Result<Vec<MessageRecord>> {
    let texts = rows::split_rows(raw)?;
    let total = texts.len();

    let records: Vec<MessageRecord> = texts
        .iter()
        .filter_map(|text| MessageRecord::from_row(&Row::parse(text)))
        .collect();

    if records.len() < total {
        debug!(skipped = total - records.len(), kept = records.len(), "dropped incomplete sms rows");
    }
    Ok(records)
}

/// Read a provider timestamp as epoch milliseconds, 0 if unreadable.
pub fn normalize_timestamp(value: &str) -> i64 {
    let value = value.trim();

    if let Ok(n) = value.parse::<i64>() {
        return match n {
            n if n <= 0 => 0,
            n if n < SECONDS_CUTOFF => n.saturating_mul(1000),
            n => n,
        };
    }

    if let Ok(secs) = value.parse::<f64>() {
        if secs.is_finite() && secs > 0.0 {
            return (secs * 1000.0) as i64;
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.timestamp_millis().max(0);
    }

    debug!(value, "unreadable timestamp, using 0");
    0
}
