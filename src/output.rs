//! Terminal rendering of views: plain text or JSON.
//!
//! Rendering only; no parsing or grouping happens here.
//!
//! CHANGELOG:
//! - 10/18/2026 - Text renderers for conversations, flat lists, senders, device info
//! - 10/18/2026 - Initial implementation

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::{json, Value};

use crate::conversation::{Conversation, ResolvedMessage, View};
use crate::provider::{Direction, MessageRecord};

const RULE_WIDTH: usize = 60;

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub json: bool,
    pub compact: bool,
}

impl OutputControls {
    /// Serialize `data` as pretty or compact JSON.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = serde_json::to_value(data).unwrap_or(Value::Null);
        if self.compact {
            serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string())
        } else {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "null".to_string())
        }
    }

    /// Print data to stdout according to output controls.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }

    /// Print a view as JSON or text.
    pub fn present(&self, view: &View) {
        if self.json {
            self.print(view);
        } else {
            print!("{}", render_view(view));
        }
    }
}

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Local wall-clock time for an epoch-millis timestamp.
pub fn format_timestamp(millis: i64) -> String {
    if millis <= 0 {
        return "unknown time".to_string();
    }
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown time".to_string(),
    }
}

fn direction_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Received => "<-",
        Direction::Sent => "->",
    }
}

fn read_marker(read: Option<bool>) -> &'static str {
    match read {
        Some(false) => " [unread]",
        _ => "",
    }
}

fn push_body(out: &mut String, body: &str) {
    if body.trim().is_empty() {
        out.push_str("    (empty)\n");
        return;
    }
    for line in body.trim().lines() {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }
}

fn push_message(out: &mut String, label: Option<&str>, msg: &MessageRecord) {
    out.push_str(&format!(
        "  [{}] {}",
        format_timestamp(msg.timestamp),
        direction_marker(msg.direction)
    ));
    if let Some(label) = label {
        out.push(' ');
        out.push_str(label);
    }
    out.push_str(read_marker(msg.read));
    out.push('\n');
    push_body(out, &msg.body);
}

pub fn render_view(view: &View) -> String {
    match view {
        View::Conversations(c) => render_conversations(c),
        View::Flat(m) => render_messages(m),
        View::Senders(s) => render_senders(s),
    }
}

pub fn render_conversations(conversations: &[Conversation]) -> String {
    if conversations.is_empty() {
        return "No messages found (inbox empty or permission denied).\n".to_string();
    }

    let mut out = format!("Conversations ({}):\n", conversations.len());
    for conv in conversations {
        out.push_str(&rule());
        out.push('\n');
        let plural = if conv.messages.len() == 1 { "" } else { "s" };
        out.push_str(&format!("{} ({} message{})\n", conv.identity, conv.messages.len(), plural));
        for msg in &conv.messages {
            push_message(&mut out, None, msg);
        }
    }
    out.push_str(&rule());
    out.push('\n');
    out
}

pub fn render_messages(messages: &[ResolvedMessage]) -> String {
    if messages.is_empty() {
        return "No messages found (inbox empty or permission denied).\n".to_string();
    }

    let mut out = format!("Recent messages ({}):\n", messages.len());
    out.push_str(&rule());
    out.push('\n');
    for m in messages {
        push_message(&mut out, Some(&m.identity), &m.record);
    }
    out.push_str(&rule());
    out.push('\n');
    out
}

pub fn render_senders(senders: &[String]) -> String {
    if senders.is_empty() {
        return "No senders found.\n".to_string();
    }

    let mut out = format!("Senders ({}):\n", senders.len());
    out.push_str(&rule());
    out.push('\n');
    for (i, s) in senders.iter().enumerate() {
        out.push_str(&format!("{:>3}. {}\n", i + 1, s));
    }
    out
}

/// One message noticed by the monitor.
pub fn render_new_message(identity: &str, msg: &MessageRecord, noticed_at: &str) -> String {
    let mut out = format!("New message at {}\n", noticed_at);
    out.push_str(&rule());
    out.push('\n');
    push_message(&mut out, Some(identity), msg);
    out
}

/// JSON object for a message noticed by the monitor.
pub fn new_message_json(identity: &str, msg: &MessageRecord, noticed_at: &str) -> Value {
    json!({
        "event": "new_message",
        "noticed_at": noticed_at,
        "identity": identity,
        "message": msg,
    })
}

/// Key/value block, used for device info.
pub fn render_fields(title: &str, fields: &[(&str, &str)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = format!("{}\n{}\n", title, rule());
    for (k, v) in fields {
        out.push_str(&format!("  {:<width$} : {}\n", k, v, width = width));
    }
    out.push_str(&rule());
    out.push('\n');
    out
}

/// Format error as JSON.
pub fn format_error(error: &str) -> String {
    serde_json::to_string(&json!({
        "error": error,
        "success": false
    }))
    .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error))
}
