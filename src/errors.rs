//! License error types.

use thiserror::Error;

/// Errors that can occur while issuing or validating a license.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Token is not `<claim>.<signature>`.
    #[error("License key is not in `<claim>.<signature>` form")]
    FormatError,

    /// Encoded claim could not be turned back into a claim.
    #[error("Failed to decode claim: {0}")]
    DecodeError(String),

    /// Authentication tag did not match (tampering or wrong secret).
    #[error("License signature verification failed")]
    SignatureInvalid,

    /// Hardware probe failed and produced the sentinel fingerprint.
    #[error("Hardware fingerprint unavailable: {0}")]
    FingerprintUnavailable(String),

    /// Claimed hardware id differs from this machine's fingerprint.
    #[error("License bound to {expected}, this machine is {actual}")]
    HwidMismatch {
        /// Hardware id carried by the license.
        expected: String,
        /// Fingerprint computed on this machine.
        actual: String,
    },

    /// Trusted time source could not be reached or understood.
    #[error("Trusted time source unavailable")]
    TimeUnavailable,

    /// Trusted date is after the claim's expiry.
    #[error("License expired on {expires}")]
    Expired {
        /// Expiry date in `YYYY-MM-DD` form.
        expires: String,
    },

    /// Any failure not covered by the other variants.
    #[error("Corrupted license: {0}")]
    Corrupted(String),

    /// Caller presented no or the wrong API key.
    #[error("Unauthorized")]
    Unauthorized,

    /// Hardware id is not 32 hexadecimal characters.
    #[error("Invalid Hardware ID format. Must be 32 characters HEX (0-9, A-F)")]
    InvalidHardwareId,

    /// Requested duration cannot produce a valid expiry date.
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// HTTP client for the time source could not be built.
    #[error("Time source transport error: {0}")]
    TimeSource(String),
}

impl LicenseError {
    /// HTTP status code for errors surfaced at the activation boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            LicenseError::Unauthorized => 403,
            LicenseError::InvalidHardwareId | LicenseError::InvalidDuration(_) => 400,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_status_codes() {
        assert_eq!(LicenseError::Unauthorized.status_code(), 403);
        assert_eq!(LicenseError::InvalidHardwareId.status_code(), 400);
        assert_eq!(
            LicenseError::InvalidDuration("negative".to_string()).status_code(),
            400
        );
        assert_eq!(LicenseError::SignatureInvalid.status_code(), 500);
    }

    #[test]
    fn hwid_mismatch_display_names_both_ids() {
        let err = LicenseError::HwidMismatch {
            expected: "AAAA".to_string(),
            actual: "BBBB".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("AAAA"));
        assert!(text.contains("BBBB"));
    }
}
