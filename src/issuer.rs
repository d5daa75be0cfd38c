//! Issuance engine.
//!
//! Builds and signs a fresh license key for a target machine. Issuing
//! performs no authorization of its own; see [`crate::activation`] for the
//! gate that sits in front of it.

use crate::clock::{Clock, SystemClock};
use crate::config::SigningSecret;
use crate::crypto::signing::sign;
use crate::token::{encode_claim, Claim, LicenseToken};
use crate::LicenseError;
use chrono::Days;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A freshly issued license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedLicense {
    /// The license key handed to the holder.
    pub license_key: String,

    /// Last valid day, `YYYY-MM-DD`.
    pub expires: String,
}

/// Issues license keys signed with the configured secret.
pub struct Issuer {
    secret: SigningSecret,
    clock: Arc<dyn Clock>,
}

impl Issuer {
    /// Create an issuer that dates licenses from the system clock.
    pub fn new(secret: SigningSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create an issuer with a custom clock.
    pub fn with_clock(secret: SigningSecret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// Issue a key for `target_hwid` valid for `duration_days` whole days.
    ///
    /// The expiry is `today (UTC) + duration_days`, inclusive, so a
    /// zero-day license is valid for the rest of today.
    ///
    /// # Errors
    /// `InvalidDuration` if the expiry falls outside the supported calendar.
    pub fn issue(&self, duration_days: u32, target_hwid: &str) -> Result<IssuedLicense, LicenseError> {
        let today = self.clock.today();
        let expires = today
            .checked_add_days(Days::new(u64::from(duration_days)))
            .ok_or_else(|| {
                LicenseError::InvalidDuration(format!(
                    "{} days from {} is out of range",
                    duration_days, today
                ))
            })?;

        let claim = Claim::new(expires, target_hwid.trim());
        let encoded_claim = encode_claim(&claim)?;
        let signature = sign(&encoded_claim, &self.secret);
        let token = LicenseToken::new(encoded_claim, signature);

        tracing::info!(expires = %claim.expires, duration_days, "license issued");

        Ok(IssuedLicense {
            license_key: token.to_string(),
            expires: claim.expires_string(),
        })
    }
}
