//! # hwlicense
//!
//! **Machine-bound, time-limited license keys without a license database.**
//!
//! A license key carries its own claim (expiry date and hardware id) and an
//! HMAC-SHA256 tag over it. Validation recomputes the tag, compares the
//! claimed hardware id to this machine's fingerprint, and compares the
//! expiry to a date fetched from a remote time source rather than the
//! local clock.
//!
//! ## Key format
//!
//! ```text
//! <url-safe-base64({"expires":"YYYY-MM-DD","hwid":"<32 HEX>"})>.<hex HMAC-SHA256>
//! ```
//!
//! ## Quickstart
//!
//! ```no_run
//! use hwlicense::{HttpTimeOracle, Issuer, LicenseValidator, LicensingConfig, SystemFingerprint};
//! use hwlicense::FingerprintProvider;
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), hwlicense::LicenseError> {
//!     // Aborts startup when SECRET_KEY is missing.
//!     let config = LicensingConfig::from_env()?;
//!
//!     let fingerprint = SystemFingerprint::new(config.probe_timeout);
//!     let issued = Issuer::new(config.secret.clone()).issue(30, &fingerprint.fingerprint())?;
//!
//!     let validator = LicenseValidator::new(
//!         config.secret.clone(),
//!         Arc::new(fingerprint),
//!         Arc::new(HttpTimeOracle::new(&config)?),
//!     );
//!     let (valid, reason) = validator.validate(&issued.license_key).into_pair();
//!     println!("{}: {}", valid, reason);
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! hwlicense protects against:
//! - **Key forgery and editing**: any change to the claim or tag fails verification
//! - **Key sharing**: keys are bound to one machine's fingerprint
//! - **Clock rollback**: "today" comes from a remote `Date` header
//!
//! hwlicense does **not** prevent binary patching, and validation needs
//! network access to the time source. Issuing and validating sides both
//! use UTC calendar dates.

#![warn(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Wire format
pub mod token;

// Capabilities
pub mod fingerprint;
pub mod oracle;

// Engines
pub mod issuer;
pub mod validator;

// Boundary
pub mod activation;

// Re-exports for public API
pub use activation::{activate, ActivationRequest, ActivationResponse};
pub use clock::{Clock, SystemClock};
pub use config::{ApiKey, LicensingConfig, SigningSecret};
pub use errors::LicenseError;
pub use fingerprint::{FingerprintProvider, SystemFingerprint, UNKNOWN_HWID};
pub use issuer::{IssuedLicense, Issuer};
pub use oracle::{HttpTimeOracle, TimeOracle};
pub use token::{Claim, LicenseToken};
pub use validator::{LicenseValidator, ValidationResult, ValidationState};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
