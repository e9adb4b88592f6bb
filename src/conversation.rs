//! Grouping of messages into conversations by resolved sender identity.
//!
//! Conversations are derived on every run and never stored. Records are
//! grouped by [`SenderKey`]: the matched contact, or the normalized number,
//! so "+14155551234" and "(415) 555-1234" land together. A conversation is
//! labelled with the identity of its newest message.
//!
//! Every record lands in exactly one conversation, and each conversation
//! lists its messages newest first. Equal timestamps keep dump order.
//!
//! CHANGELOG:
//! - 10/18/2026 - Group by normalized number instead of display label
//! - 10/18/2026 - Added flat and senders views
//! - 10/18/2026 - Initial grouping

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::contacts::{ContactMap, SenderKey};
use crate::provider::MessageRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub identity: String,
    pub messages: Vec<MessageRecord>,
}

impl Conversation {
    /// Timestamp of the newest message.
    pub fn latest(&self) -> i64 {
        self.messages.first().map_or(0, |m| m.timestamp)
    }
}

/// A message tagged with its sender's resolved identity (flat view).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedMessage {
    pub identity: String,
    #[serde(flatten)]
    pub record: MessageRecord,
}

/// Which view to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `limit` conversations, each with all its messages.
    Conversations,
    /// `limit` newest messages across all senders.
    Flat,
    /// `limit` identities, most recent first, no bodies.
    Senders,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum View {
    Conversations(Vec<Conversation>),
    Flat(Vec<ResolvedMessage>),
    Senders(Vec<String>),
}

/// Build the requested view of `records`.
pub fn group(records: Vec<MessageRecord>, contacts: &ContactMap, limit: usize, mode: Mode) -> View {
    match mode {
        Mode::Conversations => {
            let mut conversations = partition(records, contacts);
            conversations.truncate(limit);
            View::Conversations(conversations)
        }
        Mode::Flat => View::Flat(flatten(records, contacts, limit)),
        Mode::Senders => View::Senders(
            partition(records, contacts)
                .into_iter()
                .take(limit)
                .map(|c| c.identity)
                .collect(),
        ),
    }
}

/// Partition records by sender. Conversations are ordered by their newest
/// message, descending; ties keep the order senders first appeared.
pub fn partition(records: Vec<MessageRecord>, contacts: &ContactMap) -> Vec<Conversation> {
    let mut index: HashMap<SenderKey, usize> = HashMap::new();
    let mut conversations: Vec<Conversation> = Vec::new();

    for record in records {
        let key = contacts.sender_key(&record.sender_raw);
        match index.get(&key) {
            Some(&i) => conversations[i].messages.push(record),
            None => {
                index.insert(key, conversations.len());
                conversations.push(Conversation {
                    identity: String::new(),
                    messages: vec![record],
                });
            }
        }
    }

    for conversation in &mut conversations {
        conversation.messages.sort_by_key(|m| Reverse(m.timestamp));
        if let Some(newest) = conversation.messages.first() {
            conversation.identity = contacts.resolve(&newest.sender_raw);
        }
    }
    conversations.sort_by_key(|c| Reverse(c.latest()));
    conversations
}

/// The `limit` newest messages overall, each tagged with its sender's
/// identity (the same label [`partition`] would give the conversation).
pub fn flatten(records: Vec<MessageRecord>, contacts: &ContactMap, limit: usize) -> Vec<ResolvedMessage> {
    let mut records = records;
    records.sort_by_key(|m| Reverse(m.timestamp));

    let mut labels: HashMap<SenderKey, String> = HashMap::new();
    records
        .into_iter()
        .take(limit)
        .map(|record| {
            let identity = labels
                .entry(contacts.sender_key(&record.sender_raw))
                .or_insert_with(|| contacts.resolve(&record.sender_raw))
                .clone();
            ResolvedMessage { identity, record }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{ContactMap, PhoneNormalizer};
    use crate::provider::Direction;

    fn msg(sender: &str, ts: i64, body: &str) -> MessageRecord {
        MessageRecord {
            id: None,
            sender_raw: sender.to_string(),
            body: body.to_string(),
            timestamp: ts,
            thread_id: "1".to_string(),
            direction: Direction::Received,
            read: None,
        }
    }

    fn alice_contacts() -> ContactMap {
        let mut map = ContactMap::empty(PhoneNormalizer::default());
        map.insert("5550100", "Alice");
        map
    }

    /// Five messages: three from "+1-555-0100" (Alice), two from "+15550101".
    fn scenario() -> Vec<MessageRecord> {
        vec![
            msg("+1-555-0100", 100, "a1"),
            msg("+15550101", 400, "b1"),
            msg("+1-555-0100", 300, "a2"),
            msg("+15550101", 200, "b2"),
            msg("+1-555-0100", 500, "a3"),
        ]
    }

    #[test]
    fn test_senders_view() {
        let view = group(scenario(), &alice_contacts(), 3, Mode::Senders);
        assert_eq!(view, View::Senders(vec!["Alice".into(), "+15550101".into()]));
    }

    #[test]
    fn test_senders_follow_newest_message() {
        let mut records = scenario();
        records.push(msg("+1 555 0101", 900, "b3"));
        let view = group(records, &alice_contacts(), 3, Mode::Senders);
        assert_eq!(view, View::Senders(vec!["+15550101".into(), "Alice".into()]));
    }

    #[test]
    fn test_grouped_limit_counts_conversations() {
        let View::Conversations(convs) = group(scenario(), &alice_contacts(), 1, Mode::Conversations) else {
            panic!("expected conversations");
        };
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].identity, "Alice");
        let bodies: Vec<&str> = convs[0].messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["a3", "a2", "a1"]);
    }

    #[test]
    fn test_flat_takes_global_newest() {
        let View::Flat(msgs) = group(scenario(), &alice_contacts(), 3, Mode::Flat) else {
            panic!("expected flat");
        };
        let got: Vec<(&str, &str)> = msgs.iter().map(|m| (m.identity.as_str(), m.record.body.as_str())).collect();
        assert_eq!(got, vec![("Alice", "a3"), ("+15550101", "b1"), ("Alice", "a2")]);
    }

    #[test]
    fn test_flat_limit_is_min_of_n_and_total() {
        for n in [0, 1, 5, 9] {
            let View::Flat(msgs) = group(scenario(), &alice_contacts(), n, Mode::Flat) else {
                panic!("expected flat");
            };
            assert_eq!(msgs.len(), n.min(5));
        }
    }

    #[test]
    fn test_partition_is_complete_and_ordered() {
        let records = scenario();
        let total = records.len();
        let convs = partition(records.clone(), &alice_contacts());

        let count: usize = convs.iter().map(|c| c.messages.len()).sum();
        assert_eq!(count, total);
        for r in &records {
            let holders = convs.iter().filter(|c| c.messages.contains(r)).count();
            assert_eq!(holders, 1);
        }
        for c in &convs {
            assert!(c.messages.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        }
        assert!(convs.windows(2).all(|w| w[0].latest() >= w[1].latest()));
    }

    #[test]
    fn test_ties_keep_dump_order() {
        let records = vec![msg("1", 50, "first"), msg("2", 50, "second"), msg("3", 50, "third")];
        let View::Flat(msgs) = group(records, &ContactMap::default(), 3, Mode::Flat) else {
            panic!("expected flat");
        };
        let bodies: Vec<&str> = msgs.iter().map(|m| m.record.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_zero_timestamps_sort_last() {
        let records = vec![msg("1", 0, "undated"), msg("2", 10, "dated")];
        let convs = partition(records, &ContactMap::default());
        assert_eq!(convs[0].identity, "2");
        assert_eq!(convs[1].identity, "1");
    }

    #[test]
    fn test_number_formats_share_a_conversation() {
        let records = vec![
            msg("+14155551234", 2, "newest"),
            msg("(415) 555-1234", 1, "middle"),
            msg("14155551234", 0, "oldest"),
        ];
        let convs = partition(records, &ContactMap::default());
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].identity, "+14155551234");
        assert_eq!(convs[0].messages.len(), 3);
    }

    #[test]
    fn test_number_formats_count_once_in_senders_and_flat() {
        let records = vec![
            msg("(415) 555-1234", 30, "x"),
            msg("+14155551234", 20, "y"),
            msg("+15550101", 10, "z"),
        ];
        let view = group(records.clone(), &ContactMap::default(), 5, Mode::Senders);
        assert_eq!(view, View::Senders(vec!["4155551234".into(), "+15550101".into()]));

        let View::Flat(msgs) = group(records, &ContactMap::default(), 2, Mode::Flat) else {
            panic!("expected flat");
        };
        let ids: Vec<&str> = msgs.iter().map(|m| m.identity.as_str()).collect();
        assert_eq!(ids, vec!["4155551234", "4155551234"]);
    }

    #[test]
    fn test_dump_to_conversations() {
        let sms = "Row: 0 _id=5, thread_id=1, address=+1-555-0100, date=1700000500000, body=a3, type=1, read=1\n\
                   Row: 1 _id=4, thread_id=2, address=+15550101, date=1700000400000, body=b1, type=1, read=0\n\
                   Row: 2 _id=3, thread_id=1, address=5550100, date=1700000300000, body=a2, type=2, read=1\n\
                   Row: 3 _id=2, thread_id=2, address=+15550101, date=1700000200000, body=b2, type=1, read=1\n\
                   Row: 4 _id=1, thread_id=1, address=+1 555 0100, date=1700000100, body=a1, type=1, read=1\n";
        let contacts = "Row: 0 display_name=Alice, number=555-0100\n";

        let records = crate::provider::parse_records(sms).unwrap();
        assert_eq!(records.len(), 5);
        let map = crate::contacts::build_contact_map(contacts, PhoneNormalizer::default()).unwrap();

        let View::Conversations(convs) = group(records.clone(), &map, 3, Mode::Conversations) else {
            panic!("expected conversations");
        };
        assert_eq!(convs.len(), 2);
        assert_eq!(convs[0].identity, "Alice");
        let bodies: Vec<&str> = convs[0].messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["a3", "a2", "a1"]);
        assert_eq!(convs[0].messages[1].direction, Direction::Sent);
        assert_eq!(convs[1].identity, "+15550101");
        assert_eq!(convs[1].messages.len(), 2);

        let senders = group(records, &map, 3, Mode::Senders);
        assert_eq!(senders, View::Senders(vec!["Alice".into(), "+15550101".into()]));
    }
}
