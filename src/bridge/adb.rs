//! Subprocess execution of the `adb` binary.
//!
//! Every call blocks until adb exits or the timeout elapses. No retries:
//! a failed call is returned to the caller as-is.
//!
//! CHANGELOG:
//! - 10/18/2026 - Enforce timeout with try_wait polling and kill
//! - 10/18/2026 - Initial implementation

use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::devices::{self, Device};
use super::queries::ContentQuery;
use crate::error::{Result, SmsError};

const POLL_STEP: Duration = Duration::from_millis(25);

/// Handle on the adb executable.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: PathBuf,
    timeout: Duration,
    debug: bool,
}

impl AdbBridge {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            debug: false,
        }
    }

    /// Echo every command line and its raw output to stderr.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// `adb version`, used to confirm the binary is installed.
    pub fn version(&self) -> Result<String> {
        let out = self.exec(&["version".to_string()])?;
        Ok(out.lines().next().unwrap_or_default().trim().to_string())
    }

    pub fn devices(&self) -> Result<Vec<Device>> {
        let out = self.exec(&["devices".to_string(), "-l".to_string()])?;
        Ok(devices::parse_devices(&out))
    }

    /// Resolve the target serial; see [`devices::select_device`].
    pub fn select_device(&self, requested: Option<&str>) -> Result<String> {
        let listing = self.devices()?;
        devices::select_device(&listing, requested)
    }

    /// Run a content query and return its raw stdout.
    ///
    /// With no `device_id` the single authorized device is selected first.
    pub fn run_query(&self, device_id: Option<&str>, query: &ContentQuery) -> Result<String> {
        let serial = match device_id {
            Some(id) => id.to_string(),
            None => self.select_device(None)?,
        };
        let mut args = vec!["-s".to_string(), serial];
        args.extend(query.to_args());
        self.exec(&args)
    }

    /// `adb -s <serial> shell <args...>`.
    pub fn shell(&self, serial: &str, args: &[&str]) -> Result<String> {
        let mut full = vec!["-s".to_string(), serial.to_string(), "shell".to_string()];
        full.extend(args.iter().map(|a| a.to_string()));
        self.exec(&full)
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn exec(&self, args: &[String]) -> Result<String> {
        let command = self.command_line(args);
        debug!(%command, "running bridge command");
        if self.debug {
            eprintln!("[debug] $ {}", command);
        }

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    SmsError::AdbNotFound {
                        program: self.program.display().to_string(),
                    }
                } else {
                    SmsError::Bridge {
                        command: command.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        // Drain both pipes off-thread so a chatty child cannot block on a full pipe.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_reader = thread::spawn(move || drain(stdout));
        let err_reader = thread::spawn(move || drain(stderr));

        // A timeout too large to represent means no deadline.
        let deadline = Instant::now().checked_add(self.timeout);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if deadline.is_some_and(|d| Instant::now() >= d) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(%command, "bridge command timed out");
                    return Err(SmsError::Timeout {
                        command,
                        secs: self.timeout.as_secs(),
                    });
                }
                Ok(None) => thread::sleep(POLL_STEP),
                Err(e) => {
                    return Err(SmsError::Bridge {
                        command,
                        message: e.to_string(),
                    })
                }
            }
        };

        let stdout = String::from_utf8_lossy(&out_reader.join().unwrap_or_default()).into_owned();
        let stderr = String::from_utf8_lossy(&err_reader.join().unwrap_or_default()).into_owned();

        if self.debug {
            eprintln!("[debug] exit: {}", status);
            for line in stdout.lines() {
                eprintln!("[debug] | {}", line);
            }
            for line in stderr.lines() {
                eprintln!("[debug] ! {}", line);
            }
        }

        if status.success() {
            Ok(stdout)
        } else {
            let message = if stderr.trim().is_empty() {
                format!("{} {}", status, stdout.trim()).trim_end().to_string()
            } else {
                stderr.trim().to_string()
            };
            Err(SmsError::Bridge { command, message })
        }
    }
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let bridge = AdbBridge::new("/nonexistent/adb-sms-test-binary", Duration::from_secs(1));
        assert!(matches!(bridge.version(), Err(SmsError::AdbNotFound { .. })));
    }

    #[test]
    fn test_nonzero_exit_is_bridge_error() {
        // `false` ignores its arguments and exits 1.
        let bridge = AdbBridge::new("false", Duration::from_secs(5));
        match bridge.shell("serial", &["content", "query"]) {
            Err(SmsError::Bridge { command, .. }) => assert!(command.starts_with("false -s serial shell")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_stdout_is_returned() {
        // `echo` prints its arguments, standing in for adb.
        let bridge = AdbBridge::new("echo", Duration::from_secs(5));
        let out = bridge.shell("abc", &["getprop", "ro.product.model"]).unwrap();
        assert_eq!(out.trim(), "-s abc shell getprop ro.product.model");
    }

    #[test]
    fn test_timeout_kills_child() {
        // Stands in for an adb call that never returns.
        let bridge = AdbBridge::new("sleep", Duration::from_millis(200));
        let started = Instant::now();
        let result = bridge.exec(&["5".to_string()]);
        assert!(matches!(result, Err(SmsError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_huge_timeout_runs_without_deadline() {
        let bridge = AdbBridge::new("echo", Duration::from_secs(u64::MAX));
        let out = bridge.version().unwrap();
        assert_eq!(out, "version");
    }
}
