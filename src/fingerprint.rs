//! Per-machine hardware fingerprint.
//!
//! The raw platform identifier never leaves this module; callers only see
//! its 128-bit digest. Probe failures are soft: they yield
//! [`UNKNOWN_HWID`], which can never match a fingerprint carried by a
//! license, so a broken probe fails closed.

use crate::crypto::digest::fingerprint_digest;
use crate::LicenseError;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Fingerprint returned when the hardware probe fails.
pub const UNKNOWN_HWID: &str = "UNKNOWN_HWID";

/// Source of this machine's fingerprint.
pub trait FingerprintProvider: Send + Sync {
    /// 32 upper-case hex characters, or [`UNKNOWN_HWID`] if the probe failed.
    fn fingerprint(&self) -> String;
}

/// Fingerprint provider backed by the operating system's machine identifier.
///
/// - Windows: `wmic csproduct get uuid`
/// - macOS: `IOPlatformUUID` from `ioreg`
/// - Linux: `/etc/machine-id`, `/var/lib/dbus/machine-id`, then the DMI product UUID
#[derive(Debug, Clone)]
pub struct SystemFingerprint {
    probe_timeout: Duration,
}

impl SystemFingerprint {
    /// Create a provider whose probe commands are killed after `probe_timeout`.
    pub fn new(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    /// Read the raw platform identifier.
    pub fn raw_id(&self) -> Result<String, LicenseError> {
        let raw = probe_raw_id(self.probe_timeout)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LicenseError::FingerprintUnavailable(
                "probe returned an empty identifier".to_string(),
            ));
        }
        Ok(raw.to_string())
    }
}

impl Default for SystemFingerprint {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PROBE_TIMEOUT)
    }
}

impl FingerprintProvider for SystemFingerprint {
    fn fingerprint(&self) -> String {
        match self.raw_id() {
            Ok(raw) => fingerprint_digest(&raw),
            Err(e) => {
                tracing::warn!(error = %e, "hardware probe failed, using sentinel fingerprint");
                UNKNOWN_HWID.to_string()
            }
        }
    }
}

#[cfg(target_os = "windows")]
fn probe_raw_id(timeout: Duration) -> Result<String, LicenseError> {
    // Output looks like "UUID  \r\n4C4C4544-...  \r\n".
    let output = run_command("wmic", &["csproduct", "get", "uuid"], timeout)?;
    output
        .lines()
        .nth(1)
        .map(|line| line.trim().to_string())
        .ok_or_else(|| LicenseError::FingerprintUnavailable("wmic returned no UUID".to_string()))
}

#[cfg(target_os = "macos")]
fn probe_raw_id(timeout: Duration) -> Result<String, LicenseError> {
    let output = run_command("ioreg", &["-rd1", "-c", "IOPlatformExpertDevice"], timeout)?;
    parse_ioreg_uuid(&output).ok_or_else(|| {
        LicenseError::FingerprintUnavailable("IOPlatformUUID not found".to_string())
    })
}

#[cfg(target_os = "linux")]
fn probe_raw_id(_timeout: Duration) -> Result<String, LicenseError> {
    const SOURCES: [&str; 3] = [
        "/etc/machine-id",
        "/var/lib/dbus/machine-id",
        "/sys/class/dmi/id/product_uuid",
    ];
    SOURCES
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .ok_or_else(|| {
            LicenseError::FingerprintUnavailable("no readable machine-id source".to_string())
        })
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn probe_raw_id(_timeout: Duration) -> Result<String, LicenseError> {
    Err(LicenseError::FingerprintUnavailable(
        "unsupported platform".to_string(),
    ))
}

/// Extract the value of `"IOPlatformUUID" = "..."` from `ioreg` output.
#[cfg_attr(not(any(test, target_os = "macos")), allow(dead_code))]
fn parse_ioreg_uuid(output: &str) -> Option<String> {
    output
        .lines()
        .find(|line| line.contains("\"IOPlatformUUID\""))
        .and_then(|line| line.split('"').nth(3))
        .map(str::to_string)
}

/// Run a platform command, killing it if it outlives `timeout`.
#[cfg_attr(not(any(test, target_os = "windows", target_os = "macos")), allow(dead_code))]
fn run_command(program: &str, args: &[&str], timeout: Duration) -> Result<String, LicenseError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| LicenseError::FingerprintUnavailable(format!("{}: {}", program, e)))?;

    // Drain stdout while waiting so a chatty command never blocks on a full pipe.
    let reader = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut stdout = String::new();
            pipe.read_to_string(&mut stdout).map(|_| stdout)
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                // The reader sees EOF once the child is gone; it is not joined.
                return Err(LicenseError::FingerprintUnavailable(format!(
                    "{} timed out after {:?}",
                    program, timeout
                )));
            }
            Ok(None) => thread::sleep(Duration::from_millis(20)),
            Err(e) => {
                return Err(LicenseError::FingerprintUnavailable(format!(
                    "{}: {}",
                    program, e
                )))
            }
        }
    };

    if !status.success() {
        return Err(LicenseError::FingerprintUnavailable(format!(
            "{} exited with {}",
            program, status
        )));
    }

    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| {
                LicenseError::FingerprintUnavailable(format!("{}: stdout reader panicked", program))
            })?
            .map_err(|e| LicenseError::FingerprintUnavailable(format!("{}: {}", program, e))),
        None => Ok(String::new()),
    }
}
