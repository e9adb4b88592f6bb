//! Decoding of content-provider dumps.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial module structure

pub mod rows;
pub mod sms;

pub use sms::{parse_records, Direction, MessageRecord, RecordKey};
