//! Runtime settings: CLI flags layered over environment variables.
//!
//! There is no config file. Each setting resolves in order:
//! 1. explicit CLI flag
//! 2. environment variable
//! 3. built-in default

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::contacts::PhoneNormalizer;

pub const ENV_ADB: &str = "ADB_SMS_ADB";
pub const ENV_TIMEOUT: &str = "ADB_SMS_TIMEOUT";
pub const ENV_INTERVAL: &str = "ADB_SMS_INTERVAL";
pub const ENV_COUNTRY_CODE: &str = "ADB_SMS_COUNTRY_CODE";
pub const ENV_TRUNK_PREFIX: &str = "ADB_SMS_TRUNK_PREFIX";
pub const ENV_NATIONAL_LEN: &str = "ADB_SMS_NATIONAL_LEN";

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_INTERVAL_SECS: u64 = 4;
pub const DEFAULT_COUNTRY_CODE: &str = "1";

/// Values given on the command line, if any.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub adb: Option<String>,
    pub timeout_secs: Option<u64>,
    pub interval_secs: Option<u64>,
    pub country_code: Option<String>,
    pub trunk_prefix: Option<String>,
    pub national_len: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub adb_program: PathBuf,
    pub timeout: Duration,
    pub interval: Duration,
    pub normalizer: PhoneNormalizer,
}

impl Settings {
    pub fn resolve(overrides: &Overrides) -> Self {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::resolve`] with an injectable environment.
    pub fn resolve_with<F>(overrides: &Overrides, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let adb_program = overrides
            .adb
            .clone()
            .or_else(|| env(ENV_ADB))
            .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
            .unwrap_or_else(|| default_adb_path(env("ANDROID_HOME").as_deref()));

        let timeout = overrides
            .timeout_secs
            .or_else(|| parse_number(ENV_TIMEOUT, env(ENV_TIMEOUT)))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let interval = overrides
            .interval_secs
            .or_else(|| parse_number(ENV_INTERVAL, env(ENV_INTERVAL)))
            .unwrap_or(DEFAULT_INTERVAL_SECS);

        let country_code = overrides
            .country_code
            .clone()
            .or_else(|| env(ENV_COUNTRY_CODE))
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());

        let mut normalizer = PhoneNormalizer::new(&country_code);
        if let Some(len) = overrides
            .national_len
            .or_else(|| parse_number(ENV_NATIONAL_LEN, env(ENV_NATIONAL_LEN)))
        {
            normalizer = normalizer.with_national_len(len);
        }
        if let Some(prefix) = overrides.trunk_prefix.clone().or_else(|| env(ENV_TRUNK_PREFIX)) {
            normalizer = normalizer.with_trunk_prefix(&prefix);
        }

        Self {
            adb_program,
            timeout: Duration::from_secs(timeout.max(1)),
            interval: Duration::from_secs(interval.max(1)),
            normalizer,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value = %value, "ignoring non-numeric setting");
            None
        }
    }
}

/// Locate adb when not configured explicitly.
///
/// Tries `$ANDROID_HOME/platform-tools`, then the SDK locations Android
/// Studio uses on Linux and macOS, then falls back to `adb` on `PATH`.
pub fn default_adb_path(android_home: Option<&str>) -> PathBuf {
    let exe = if cfg!(windows) { "adb.exe" } else { "adb" };

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(home) = android_home {
        candidates.push(PathBuf::from(shellexpand::tilde(home).into_owned()));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join("Android").join("Sdk"));
        candidates.push(home.join("Library").join("Android").join("sdk"));
    }

    candidates
        .into_iter()
        .map(|sdk| sdk.join("platform-tools").join(exe))
        .find(|p| p.is_file())
        .unwrap_or_else(|| PathBuf::from(exe))
}
