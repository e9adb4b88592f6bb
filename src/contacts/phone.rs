//! Phone number normalization.
//!
//! The SMS table and the contacts table format the same number differently
//! ("+1 555-0100", "15550100", "5550100"). Both sides are reduced to a
//! canonical lookup key before matching.
//!
//! CHANGELOG:
//! - 10/18/2026 - Configurable country code, national length and trunk prefix
//! - 10/18/2026 - Initial digit-only normalization

/// Rules for collapsing country-code variants onto one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: String,
    national_len: usize,
    trunk_prefix: Option<String>,
}

impl Default for PhoneNormalizer {
    /// North American numbering: `+1`, ten national digits, no trunk prefix.
    fn default() -> Self {
        Self {
            country_code: "1".to_string(),
            national_len: 10,
            trunk_prefix: None,
        }
    }
}

impl PhoneNormalizer {
    pub fn new(country_code: &str) -> Self {
        Self {
            country_code: digits(country_code),
            ..Self::default()
        }
    }

    pub fn with_national_len(mut self, len: usize) -> Self {
        self.national_len = len;
        self
    }

    /// Domestic dialing prefix to drop, e.g. "0" for most of Europe.
    pub fn with_trunk_prefix(mut self, prefix: &str) -> Self {
        let prefix = digits(prefix);
        self.trunk_prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Canonical key used for contact lookup.
    ///
    /// 1. keep digits only
    /// 2. drop `+<cc>` or `00<cc>`
    /// 3. drop a bare `<cc>` when exactly `national_len` digits follow
    /// 4. otherwise drop one trunk prefix, if configured
    ///
    /// Senders with no digits (alphanumeric shortcodes) key on their
    /// lowercased text.
    pub fn canonical_key(&self, raw: &str) -> String {
        let raw = raw.trim();
        let mut d = digits(raw);
        if d.is_empty() {
            return raw.to_lowercase();
        }

        let cc = self.country_code.as_str();
        if !cc.is_empty() {
            let international = format!("00{}", cc);
            if raw.starts_with('+') && d.starts_with(cc) && d.len() > cc.len() {
                d.drain(..cc.len());
                return d;
            }
            if d.starts_with(&international) && d.len() > international.len() {
                d.drain(..international.len());
                return d;
            }
            if d.starts_with(cc) && d.len() == cc.len() + self.national_len {
                d.drain(..cc.len());
                return d;
            }
        }

        if let Some(trunk) = &self.trunk_prefix {
            if d.starts_with(trunk.as_str()) && d.len() > trunk.len() {
                d.drain(..trunk.len());
            }
        }
        d
    }

    /// Display form of an unresolved sender: formatting stripped, leading `+`
    /// kept. Applying it twice gives the same string.
    pub fn display(&self, raw: &str) -> String {
        let raw = raw.trim();
        let d = digits(raw);
        if d.is_empty() {
            raw.to_string()
        } else if raw.starts_with('+') {
            format!("+{}", d)
        } else {
            d
        }
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
