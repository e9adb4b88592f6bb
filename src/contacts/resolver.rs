//! Contact map built from the contacts-provider dump, and sender resolution.
//!
//! CHANGELOG:
//! - 10/18/2026 - Register every number column a row carries
//! - 10/18/2026 - Initial number -> name map

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::phone::PhoneNormalizer;
use crate::error::Result;
use crate::provider::rows::{self, Row};

const NUMBER_KEYS: &[&str] = &["number", "data1", "normalized_number"];
const NAME_KEYS: &[&str] = &["display_name", "name"];

/// A number as stored in the contacts table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactEntry {
    /// Canonical key (see [`PhoneNormalizer::canonical_key`]).
    pub number: String,
    pub display_name: String,
}

/// What a sender is grouped by: the matched contact, or the canonical
/// number when no contact matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SenderKey {
    Contact(String),
    Number(String),
}

/// Canonical number -> contact. Several numbers may share a name; when the
/// same number appears twice the last row wins.
#[derive(Debug, Clone, Default)]
pub struct ContactMap {
    entries: HashMap<String, ContactEntry>,
    normalizer: PhoneNormalizer,
}

impl ContactMap {
    /// An empty map, used when the contacts dump is unavailable.
    pub fn empty(normalizer: PhoneNormalizer) -> Self {
        Self {
            entries: HashMap::new(),
            normalizer,
        }
    }

    pub fn insert(&mut self, number: &str, display_name: &str) {
        let key = self.normalizer.canonical_key(number);
        if key.is_empty() {
            return;
        }
        self.entries.insert(
            key.clone(),
            ContactEntry {
                number: key,
                display_name: display_name.trim().to_string(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contact name for `number`, if known.
    pub fn lookup(&self, number: &str) -> Option<&str> {
        self.entries
            .get(&self.normalizer.canonical_key(number))
            .map(|e| e.display_name.as_str())
    }

    /// Grouping key for a sender. Formatting variants of one unknown number
    /// share a key, and every number of a contact maps to that contact.
    pub fn sender_key(&self, number: &str) -> SenderKey {
        match self.lookup(number) {
            Some(name) => SenderKey::Contact(name.to_string()),
            None => SenderKey::Number(self.normalizer.canonical_key(number)),
        }
    }

    /// Display identity for a sender: the contact name, or the number in
    /// display form when there is no match.
    pub fn resolve(&self, number: &str) -> String {
        match self.lookup(number) {
            Some(name) => name.to_string(),
            None => self.normalizer.display(number),
        }
    }
}

/// Build the contact map from a contacts-provider dump.
///
/// Rows without both a number and a name are skipped.
pub fn build_contact_map(raw: &str, normalizer: PhoneNormalizer) -> Result<ContactMap> {
    let mut map = ContactMap::empty(normalizer);
    let mut skipped = 0usize;

    for text in rows::split_rows(raw)? {
        let row = Row::parse(&text);
        let Some(name) = row.get_any(NAME_KEYS) else {
            skipped += 1;
            continue;
        };
        let numbers: Vec<&str> = NUMBER_KEYS.iter().filter_map(|k| row.get(k)).collect();
        if numbers.is_empty() {
            skipped += 1;
            continue;
        }
        for number in numbers {
            map.insert(number, name);
        }
    }

    debug!(contacts = map.len(), skipped, "built contact map");
    Ok(map)
}

/// Resolve `number` against `map`; see [`ContactMap::resolve`].
pub fn resolve(number: &str, map: &ContactMap) -> String {
    map.resolve(number)
}
