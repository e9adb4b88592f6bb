//! Tokenizer for `content query` dumps.
//!
//! A dump looks like:
//!
//! ```text
//! Row: 0 _id=41, thread_id=7, address=+15550100, date=1735689600000, body=See you, then, type=1
//! Row: 1 _id=40, thread_id=7, address=+15550100, date=1735689500000, body=first line
//! second line, type=2
//! ```
//!
//! Fields are `key=value` pairs separated by `, `. Values are either
//! double-quoted (with backslash escapes) or run up to the next
//! `, <identifier>=` boundary. A body containing that exact pattern will be
//! split early; the key after it is then treated as unknown and ignored.
//!
//! CHANGELOG:
//! - 10/18/2026 - Support quoted values and unframed one-row-per-line dumps
//! - 10/18/2026 - Initial row splitter

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Result, SmsError};

/// Literal the provider prints for SQL NULL.
const NULL: &str = "NULL";

fn row_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Row:\s*\d+\s?").expect("valid regex"))
}

fn key_at_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)=").expect("valid regex"))
}

fn field_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*[A-Za-z_][A-Za-z0-9_]*=").expect("valid regex"))
}

/// One decoded row: ordered `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn parse(line: &str) -> Self {
        Self {
            fields: parse_fields(line),
        }
    }

    /// Value for `key`, last occurrence wins. `NULL` and empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty() && *v != NULL)
    }

    /// First present value among `keys`.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a raw dump into row texts.
///
/// Rows framed with `Row: N` may span several lines; without framing every
/// non-empty line is its own row. A dump with no decodable row that carries
/// an error report (provider exception, permission denial) fails as a whole.
pub fn split_rows(raw: &str) -> Result<Vec<String>> {
    let framed = raw.lines().any(|l| row_prefix().is_match(l));

    if !framed {
        let body: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        let has_rows = body.iter().any(|l| !Row::parse(l).is_empty());
        if !has_rows {
            if let Some(report) = body.iter().find(|l| is_error_report(l)) {
                return Err(SmsError::Parse {
                    what: "provider dump",
                    message: (*report).to_string(),
                });
            }
        }
        return Ok(body
            .into_iter()
            .filter(|l| !l.starts_with("No result found"))
            .map(String::from)
            .collect());
    }

    let mut rows: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    for line in raw.lines() {
        if let Some(m) = row_prefix().find(line) {
            if let Some(done) = current.take() {
                rows.push(done);
            }
            current = Some(line[m.end()..].to_string());
        } else if let Some(row) = current.as_mut() {
            row.push('\n');
            row.push_str(line);
        }
    }
    rows.extend(current);
    Ok(rows)
}

fn is_error_report(line: &str) -> bool {
    line.starts_with("Error while accessing provider")
        || line.starts_with("Error: ")
        || line.contains("java.lang.SecurityException")
        || line.contains("Permission Denial")
}

/// Decode the `key=value` pairs of a single row text.
///
/// Text before the first key, or a row with no key at all, yields nothing.
pub fn parse_fields(text: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    let mut pos = 0;

    while let Some(caps) = key_at_start().captures(&text[pos..]) {
        let key = caps[1].to_string();
        pos += caps.get(0).map_or(0, |m| m.end());
        let rest = &text[pos..];

        if rest.starts_with('"') {
            if let Some((value, used)) = read_quoted(rest) {
                fields.push((key, value));
                pos += used;
                // Skip to the separator after the closing quote.
                match field_boundary().find(&text[pos..]) {
                    Some(b) => pos += b.start() + 1,
                    None => break,
                }
                continue;
            }
        }

        match field_boundary().find(rest) {
            Some(b) => {
                fields.push((key, rest[..b.start()].trim_end_matches('\r').to_string()));
                pos += b.start() + 1;
            }
            None => {
                fields.push((key, rest.trim_end_matches(&['\r', '\n'][..]).to_string()));
                break;
            }
        }
    }

    fields
}

/// Read a double-quoted value. Returns the unescaped value and the number of
/// bytes consumed, or `None` when the closing quote is missing.
fn read_quoted(text: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = text.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, i + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, other)) => value.push(other),
                None => return None,
            },
            _ => value.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fields() {
        let row = Row::parse("_id=1, address=+15550100, date=1700000000000, body=hi");
        assert_eq!(row.get("_id"), Some("1"));
        assert_eq!(row.get("address"), Some("+15550100"));
        assert_eq!(row.get("body"), Some("hi"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_body_with_comma() {
        let row = Row::parse("body=See you, then., type=1");
        assert_eq!(row.get("body"), Some("See you, then."));
        assert_eq!(row.get("type"), Some("1"));
    }

    #[test]
    fn test_quoted_value_with_boundary_lookalike() {
        let row = Row::parse(r#"body="a, b=c \"quoted\"", address=12345"#);
        assert_eq!(row.get("body"), Some(r#"a, b=c "quoted""#));
        assert_eq!(row.get("address"), Some("12345"));
    }

    #[test]
    fn test_unterminated_quote_falls_back() {
        let row = Row::parse(r#"body="oops, address=12345"#);
        assert_eq!(row.get("body"), Some(r#""oops"#));
        assert_eq!(row.get("address"), Some("12345"));
    }

    #[test]
    fn test_null_is_absent() {
        let row = Row::parse("address=NULL, body=");
        assert_eq!(row.get("address"), None);
        assert_eq!(row.get("body"), None);
    }

    #[test]
    fn test_order_independent() {
        let a = Row::parse("date=5, address=1");
        let b = Row::parse("address=1, date=5");
        assert_eq!(a.get("date"), b.get("date"));
        assert_eq!(a.get("address"), b.get("address"));
    }

    #[test]
    fn test_garbage_line_has_no_fields() {
        assert!(Row::parse("this is not a row").is_empty());
        assert!(Row::parse("").is_empty());
    }

    #[test]
    fn test_split_framed_multiline() {
        let raw = "Row: 0 _id=2, body=line one\nline two, type=1\nRow: 1 _id=1, body=x\n";
        let rows = split_rows(raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(Row::parse(&rows[0]).get("body"), Some("line one\nline two"));
        assert_eq!(Row::parse(&rows[1]).get("_id"), Some("1"));
    }

    #[test]
    fn test_split_unframed() {
        let rows = split_rows("address=1, date=2\n\naddress=3, date=4\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_no_result() {
        assert!(split_rows("No result found.\n").unwrap().is_empty());
        assert!(split_rows("").unwrap().is_empty());
    }

    #[test]
    fn test_error_report_fails_whole_dump() {
        let raw = "Error while accessing provider:sms\njava.lang.SecurityException: Permission Denial: reading\n";
        assert!(matches!(split_rows(raw), Err(SmsError::Parse { .. })));
    }

    #[test]
    fn test_body_mentioning_exception_is_not_a_report() {
        let raw = "address=1, date=2, body=java.lang.SecurityException: Permission Denial\n\
                   address=3, date=4, body=hi\n";
        let rows = split_rows(raw).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(Row::parse(&rows[1]).get("body"), Some("hi"));
    }
}
