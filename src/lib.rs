//! adb-sms library
//!
//! Reads the SMS and contacts content providers of an Android phone through
//! `adb`, groups messages into conversations and renders them.
//!
//! CHANGELOG:
//! - 10/18/2026 - Initial library structure

pub mod bridge;
pub mod commands;
pub mod config;
pub mod contacts;
pub mod conversation;
pub mod error;
pub mod output;
pub mod provider;

pub use error::{Result, SmsError};
