//! adb-sms - read SMS from an Android phone over ADB
//!
//! Shells out to `adb shell content query` for the SMS and contacts tables;
//! no root and no companion app needed, only USB debugging.
//!
//! CHANGELOG:
//! - 10/18/2026 - Added --trunk-prefix and --national-len
//! - 10/18/2026 - Added --info, --setup and JSON output
//! - 10/18/2026 - Initial CLI

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, Level};

use adb_sms::bridge::AdbBridge;
use adb_sms::commands;
use adb_sms::config::{Overrides, Settings};
use adb_sms::conversation::Mode;
use adb_sms::output::{self, OutputControls};

/// Read SMS messages from an Android phone via ADB.
#[derive(Parser, Debug)]
#[command(name = "adb-sms")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of conversations to show (messages with --all, senders with --senders)
    #[arg(long, default_value_t = 3)]
    last: usize,

    /// Watch for new messages until interrupted
    #[arg(long)]
    monitor: bool,

    /// Flat list of the most recent messages across all senders
    #[arg(long, conflicts_with = "senders")]
    all: bool,

    /// Only list sender identities, most recent first
    #[arg(long)]
    senders: bool,

    /// ADB device serial (required if several devices are connected)
    #[arg(long)]
    device: Option<String>,

    /// Echo adb commands and their raw output
    #[arg(long)]
    debug: bool,

    /// Show device / SIM details instead of messages
    #[arg(long)]
    info: bool,

    /// Print USB debugging setup instructions
    #[arg(long)]
    setup: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Compact JSON output (no whitespace)
    #[arg(long)]
    compact: bool,

    /// Path to the adb binary [env: ADB_SMS_ADB]
    #[arg(long)]
    adb: Option<String>,

    /// Seconds before an adb call is abandoned [env: ADB_SMS_TIMEOUT, default: 15]
    #[arg(long)]
    timeout: Option<u64>,

    /// Seconds between polls in --monitor mode [env: ADB_SMS_INTERVAL, default: 4]
    #[arg(long)]
    interval: Option<u64>,

    /// Home country calling code used to match numbers to contacts [env: ADB_SMS_COUNTRY_CODE, default: 1]
    #[arg(long)]
    country_code: Option<String>,

    /// Domestic dialing prefix dropped when matching numbers, e.g. 0 [env: ADB_SMS_TRUNK_PREFIX]
    #[arg(long)]
    trunk_prefix: Option<String>,

    /// Digits in a national number after the country code [env: ADB_SMS_NATIONAL_LEN, default: 10]
    #[arg(long)]
    national_len: Option<usize>,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.senders {
            Mode::Senders
        } else if self.all {
            Mode::Flat
        } else {
            Mode::Conversations
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            adb: self.adb.clone(),
            timeout_secs: self.timeout,
            interval_secs: self.interval,
            country_code: self.country_code.clone(),
            trunk_prefix: self.trunk_prefix.clone(),
            national_len: self.national_len,
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default.into()),
        )
        .init();
}

fn run(cli: &Cli, output: &OutputControls) -> Result<()> {
    if cli.setup {
        commands::setup::run(output);
        return Ok(());
    }

    let settings = Settings::resolve(&cli.overrides());
    debug!(?settings, "resolved settings");

    let bridge = AdbBridge::new(settings.adb_program.clone(), settings.timeout).with_debug(cli.debug);
    let version = bridge.version().context("adb is not usable")?;
    debug!(%version, "adb found");

    let serial = bridge
        .select_device(cli.device.as_deref())
        .context("No usable Android device")?;

    if cli.info {
        return commands::device::info(&bridge, &serial, output);
    }

    if cli.monitor {
        commands::monitor::run(&bridge, &serial, settings.interval, &settings.normalizer, output);
    }

    commands::reading::show(&bridge, &serial, cli.last, cli.mode(), &settings.normalizer, output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let output = OutputControls {
        json: cli.json || cli.compact,
        compact: cli.compact,
    };

    match run(&cli, &output) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            if output.json {
                println!("{}", output::format_error(&format!("{:#}", e)));
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::from(1)
        }
    }
}
