//! Monitor mode: poll the SMS table and print messages as they appear.
//!
//! The loop only ends when the process is interrupted. A failed poll is
//! reported and retried on the next tick.
//!
//! CHANGELOG:
//! - 10/18/2026 - Seen set owned by the loop and passed to each poll
//! - 10/18/2026 - Initial implementation

use chrono::Local;
use std::collections::HashSet;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

use super::reading;
use crate::bridge::AdbBridge;
use crate::contacts::PhoneNormalizer;
use crate::error::{Result as SmsResult, SmsError};
use crate::output::{self, OutputControls};
use crate::provider::{MessageRecord, RecordKey};

/// Records observed so far.
#[derive(Debug, Default)]
pub struct SeenSet {
    keys: HashSet<RecordKey>,
    primed: bool,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    /// Record a poll and return the records not seen before, oldest first.
    ///
    /// The first call only primes the set and returns nothing, so messages
    /// already on the device are not reported as new.
    pub fn absorb(&mut self, records: Vec<MessageRecord>) -> Vec<MessageRecord> {
        let mut fresh: Vec<MessageRecord> = Vec::new();
        for record in records {
            if self.keys.insert(record.key()) && self.primed {
                fresh.push(record);
            }
        }
        self.primed = true;
        fresh.sort_by_key(|m| m.timestamp);
        fresh
    }
}

/// Result of one poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// First successful poll; holds the number of existing records.
    Primed(usize),
    New(Vec<MessageRecord>),
    Failed(SmsError),
}

pub fn poll_once<P>(seen: &mut SeenSet, poll: &mut P) -> PollOutcome
where
    P: FnMut() -> SmsResult<Vec<MessageRecord>>,
{
    match poll() {
        Ok(records) => {
            if seen.is_primed() {
                PollOutcome::New(seen.absorb(records))
            } else {
                seen.absorb(records);
                PollOutcome::Primed(seen.len())
            }
        }
        Err(e) => PollOutcome::Failed(e),
    }
}

/// Poll forever, handing each outcome to `on_outcome` and sleeping
/// `interval` between polls.
pub fn watch<P, F>(interval: Duration, mut poll: P, mut on_outcome: F) -> !
where
    P: FnMut() -> SmsResult<Vec<MessageRecord>>,
    F: FnMut(PollOutcome),
{
    let mut seen = SeenSet::new();
    loop {
        on_outcome(poll_once(&mut seen, &mut poll));
        thread::sleep(interval);
    }
}

/// Monitor the device, printing new messages until interrupted.
pub fn run(
    bridge: &AdbBridge,
    serial: &str,
    interval: Duration,
    normalizer: &PhoneNormalizer,
    output: &OutputControls,
) -> ! {
    let contacts = reading::fetch_contacts(bridge, serial, normalizer);
    // JSON lines while streaming.
    let stream = OutputControls { json: output.json, compact: true };

    if !output.json {
        println!(
            "Monitoring {} for new SMS every {}s (Ctrl+C to stop)...",
            serial,
            interval.as_secs()
        );
    }
    info!(serial, interval_secs = interval.as_secs(), "monitor started");

    watch(
        interval,
        || reading::fetch_records(bridge, serial),
        |outcome| {
            match outcome {
                PollOutcome::Primed(count) => {
                    info!(count, "primed with existing messages");
                    if !stream.json {
                        println!("Watching; {} existing message(s) skipped.", count);
                    }
                }
                PollOutcome::New(records) => {
                    let noticed_at = Local::now().format("%H:%M:%S").to_string();
                    for record in &records {
                        let identity = contacts.resolve(&record.sender_raw);
                        if stream.json {
                            stream.print(&output::new_message_json(&identity, record, &noticed_at));
                        } else {
                            println!();
                            print!("{}", output::render_new_message(&identity, record, &noticed_at));
                        }
                    }
                }
                PollOutcome::Failed(e) if e.is_bridge_failure() => {
                    warn!(error = %e, "poll failed; retrying next interval");
                    eprintln!("[!] poll failed: {} (retrying)", e);
                }
                PollOutcome::Failed(e) => {
                    error!(error = %e, "poll failed; retrying next interval");
                    eprintln!("[!] {} (retrying)", e);
                }
            }
            let _ = std::io::stdout().flush();
        },
    )
}
