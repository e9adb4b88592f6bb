//! Contact lookup: phone normalization and number -> name resolution.
//!
//! CHANGELOG:
//! - 10/18/2026 - Replaced JSON contacts file with the device contacts dump

pub mod phone;
pub mod resolver;

pub use phone::PhoneNormalizer;
pub use resolver::{build_contact_map, resolve, ContactEntry, ContactMap, SenderKey};
