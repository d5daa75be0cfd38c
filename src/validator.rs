//! Validation engine.
//!
//! Checks run in a fixed order, each one a precondition for the next:
//!
//! 1. format: the key splits into `<claim>.<signature>`
//! 2. signature: the tag over the encoded claim verifies
//! 3. hardware: the claimed hwid equals this machine's fingerprint
//! 4. time: the trusted date is at or before the claimed expiry
//!
//! No claim field is read before the signature verifies. A wrong-machine
//! key that is also expired is reported as wrong-machine.
//!
//! Every outcome is a [`ValidationResult`]; nothing escapes as an error or
//! a panic. Tamper-related failures carry a generic reason and the
//! underlying detail goes to the log only.

use crate::config::SigningSecret;
use crate::crypto::signing::verify;
use crate::fingerprint::{FingerprintProvider, UNKNOWN_HWID};
use crate::oracle::TimeOracle;
use crate::token::{decode_claim, Claim, LicenseToken};
use crate::LicenseError;
use chrono::NaiveDate;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Terminal state of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    /// Every check passed.
    Valid,
    /// Key is not `<claim>.<signature>`.
    FormatFail,
    /// Signature does not match the claim.
    SignatureFail,
    /// Key is bound to another machine, or this machine's id is unknown.
    HwidFail,
    /// Trusted date could not be obtained.
    TimeUnavailable,
    /// Trusted date is past the expiry.
    Expired,
    /// Anything else.
    Corrupted,
}

/// License validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the license is valid.
    pub valid: bool,

    /// Where validation stopped.
    pub state: ValidationState,

    /// Human-readable explanation.
    pub reason: String,

    /// Expiry from the claim, once the signature has verified.
    pub expires: Option<NaiveDate>,
}

impl ValidationResult {
    fn valid(claim: &Claim) -> Self {
        Self {
            valid: true,
            state: ValidationState::Valid,
            reason: format!("Valid until {}", claim.expires_string()),
            expires: Some(claim.expires),
        }
    }

    fn failed(error: &LicenseError, expires: Option<NaiveDate>) -> Self {
        let (state, reason) = match error {
            LicenseError::FormatError => (ValidationState::FormatFail, "Invalid Format".to_string()),
            LicenseError::SignatureInvalid => (
                ValidationState::SignatureFail,
                "Invalid Signature (Tampered)".to_string(),
            ),
            LicenseError::HwidMismatch { expected, actual } => (
                ValidationState::HwidFail,
                format!(
                    "Key Locked to another Machine.\nYour HWID: {}\nKey HWID: {}",
                    actual, expected
                ),
            ),
            LicenseError::FingerprintUnavailable(_) => (
                ValidationState::HwidFail,
                "Hardware ID unavailable on this machine.".to_string(),
            ),
            LicenseError::TimeUnavailable => (
                ValidationState::TimeUnavailable,
                "Connection Failed: Internet required.".to_string(),
            ),
            LicenseError::Expired { expires } => {
                (ValidationState::Expired, format!("Expired on {}", expires))
            }
            _ => (ValidationState::Corrupted, "Corrupted Key".to_string()),
        };
        Self {
            valid: false,
            state,
            reason,
            expires,
        }
    }

    /// The `(valid, reason)` pair.
    pub fn into_pair(self) -> (bool, String) {
        (self.valid, self.reason)
    }
}

/// Validates license keys against this machine and the trusted date.
///
/// Holds no per-call state; share one instance across threads.
pub struct LicenseValidator {
    secret: SigningSecret,
    fingerprint: Arc<dyn FingerprintProvider>,
    time: Arc<dyn TimeOracle>,
}

impl LicenseValidator {
    /// Create a validator from a secret and its two capabilities.
    pub fn new(
        secret: SigningSecret,
        fingerprint: Arc<dyn FingerprintProvider>,
        time: Arc<dyn TimeOracle>,
    ) -> Self {
        Self {
            secret,
            fingerprint,
            time,
        }
    }

    /// Validate a license key.
    pub fn validate(&self, license_key: &str) -> ValidationResult {
        let mut verified_expiry = None;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run_checks(license_key, &mut verified_expiry)
        }));

        match outcome {
            Ok(Ok(claim)) => {
                tracing::debug!(expires = %claim.expires, "license valid");
                ValidationResult::valid(&claim)
            }
            Ok(Err(error)) => {
                match &error {
                    LicenseError::DecodeError(_) | LicenseError::Corrupted(_) => {
                        tracing::warn!(error = %error, "license key corrupted");
                    }
                    other => tracing::debug!(error = %other, "license rejected"),
                }
                ValidationResult::failed(&error, verified_expiry)
            }
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                tracing::warn!(detail = %detail, "license validation panicked");
                ValidationResult::failed(&LicenseError::Corrupted(detail), verified_expiry)
            }
        }
    }

    fn run_checks(
        &self,
        license_key: &str,
        verified_expiry: &mut Option<NaiveDate>,
    ) -> Result<Claim, LicenseError> {
        let token = LicenseToken::parse(license_key)?;

        if !verify(token.encoded_claim(), token.signature(), &self.secret) {
            return Err(LicenseError::SignatureInvalid);
        }

        // Signed by us but undecodable: our own issuance produced garbage.
        let claim = decode_claim(token.encoded_claim())
            .map_err(|e| LicenseError::Corrupted(e.to_string()))?;
        *verified_expiry = Some(claim.expires);

        let local_hwid = self.fingerprint.fingerprint();
        if local_hwid == UNKNOWN_HWID {
            return Err(LicenseError::FingerprintUnavailable(
                "hardware probe returned the sentinel".to_string(),
            ));
        }
        if claim.hwid != local_hwid {
            return Err(LicenseError::HwidMismatch {
                expected: claim.hwid,
                actual: local_hwid,
            });
        }

        let today = self.time.trusted_date().ok_or(LicenseError::TimeUnavailable)?;
        if today > claim.expires {
            return Err(LicenseError::Expired {
                expires: claim.expires_string(),
            });
        }

        Ok(claim)
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
