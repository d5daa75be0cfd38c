//! Claim structure and its transport encoding.
//!
//! The encoded claim is `url-safe-base64(json)`, padded, so it never needs
//! escaping in URLs, headers or config files.

use crate::LicenseError;
use base64::{engine::general_purpose::URL_SAFE, Engine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date layout of `expires` on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// License attributes before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Last day (inclusive, UTC) on which the license is valid.
    pub expires: NaiveDate,

    /// Fingerprint of the licensed machine: 32 upper-case hex characters.
    pub hwid: String,
}

impl Claim {
    /// Build a claim for the given expiry and hardware id.
    pub fn new(expires: NaiveDate, hwid: impl Into<String>) -> Self {
        Self {
            expires,
            hwid: hwid.into(),
        }
    }

    /// Expiry rendered as `YYYY-MM-DD`.
    pub fn expires_string(&self) -> String {
        self.expires.format(DATE_FORMAT).to_string()
    }
}

/// Serialize a claim and transport-encode it.
pub fn encode_claim(claim: &Claim) -> Result<String, LicenseError> {
    let json = serde_json::to_vec(claim).map_err(serialize_failure)?;
    Ok(URL_SAFE.encode(json))
}

/// Reverse of [`encode_claim`].
///
/// Missing fields are an error; nothing is defaulted.
pub fn decode_claim(encoded: &str) -> Result<Claim, LicenseError> {
    let json = URL_SAFE
        .decode(encoded)
        .map_err(|e| LicenseError::DecodeError(format!("Invalid base64: {}", e)))?;
    serde_json::from_slice(&json)
        .map_err(|e| LicenseError::DecodeError(format!("Invalid claim JSON: {}", e)))
}

fn serialize_failure(e: serde_json::Error) -> LicenseError {
    LicenseError::Corrupted(format!("Failed to serialize claim: {}", e))
}
