//! Activation gate in front of the issuer.
//!
//! Transport-agnostic: an HTTP handler deserializes an
//! [`ActivationRequest`], passes the `X-API-Key` header value and calls
//! [`activate`]. Errors map to status codes via
//! [`LicenseError::status_code`]: 403 for a bad key, 400 for a bad request.

use crate::config::ApiKey;
use crate::crypto::digest::is_fingerprint;
use crate::issuer::{IssuedLicense, Issuer};
use crate::LicenseError;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Header carrying the activation API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Body of an activation request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActivationRequest {
    /// Target machine fingerprint as typed by the user.
    pub hardware_id: String,

    /// License length in days.
    pub duration: i64,
}

/// Body of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActivationResponse {
    /// The issued key.
    pub license_key: String,

    /// Last valid day, `YYYY-MM-DD`.
    pub expires: String,
}

impl From<IssuedLicense> for ActivationResponse {
    fn from(issued: IssuedLicense) -> Self {
        Self {
            license_key: issued.license_key,
            expires: issued.expires,
        }
    }
}

/// Trim and upper-case a hardware id, then require 32 hex characters.
pub fn normalize_hardware_id(raw: &str) -> Result<String, LicenseError> {
    let hwid = raw.trim().to_ascii_uppercase();
    if !is_fingerprint(&hwid) {
        return Err(LicenseError::InvalidHardwareId);
    }
    Ok(hwid)
}

/// Check a presented API key against the configured one in constant time.
///
/// With no key configured every caller is rejected.
pub fn authorize(presented: Option<&str>, expected: Option<&ApiKey>) -> Result<(), LicenseError> {
    let (Some(presented), Some(expected)) = (presented, expected) else {
        return Err(LicenseError::Unauthorized);
    };
    if bool::from(presented.as_bytes().ct_eq(expected.as_str().as_bytes())) {
        Ok(())
    } else {
        Err(LicenseError::Unauthorized)
    }
}

/// Authorize, validate and issue.
///
/// Authorization runs first so unauthenticated callers learn nothing about
/// request validation.
pub fn activate(
    issuer: &Issuer,
    api_key: Option<&ApiKey>,
    presented_key: Option<&str>,
    request: &ActivationRequest,
) -> Result<ActivationResponse, LicenseError> {
    authorize(presented_key, api_key).map_err(|e| {
        tracing::warn!("activation rejected: bad API key");
        e
    })?;

    let hwid = normalize_hardware_id(&request.hardware_id)?;
    let duration = u32::try_from(request.duration).map_err(|_| {
        LicenseError::InvalidDuration(format!(
            "duration must be between 0 and {} days, got {}",
            u32::MAX,
            request.duration
        ))
    })?;

    issuer.issue(duration, &hwid).map(ActivationResponse::from)
}
