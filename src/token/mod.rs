//! License key wire format: `<encoded_claim>.<hex signature>`.

pub mod claims;

pub use claims::{decode_claim, encode_claim, Claim};

use crate::LicenseError;
use std::fmt;
use std::str::FromStr;

/// Separator between the encoded claim and its signature.
pub const SEPARATOR: char = '.';

/// A license key split into its two halves.
///
/// Tokens are only ever built at issuance or parsed from a string; nothing
/// mutates one after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseToken {
    encoded_claim: String,
    signature: String,
}

impl LicenseToken {
    /// Assemble a token from an encoded claim and its hex signature.
    pub fn new(encoded_claim: String, signature: String) -> Self {
        Self {
            encoded_claim,
            signature,
        }
    }

    /// Split a license key at the first separator.
    ///
    /// This only checks structure. The signature is not verified and the
    /// claim is not decoded.
    pub fn parse(key: &str) -> Result<Self, LicenseError> {
        let (encoded_claim, signature) = key
            .trim()
            .split_once(SEPARATOR)
            .ok_or(LicenseError::FormatError)?;
        Ok(Self::new(encoded_claim.to_string(), signature.to_string()))
    }

    /// Transport-encoded claim half.
    pub fn encoded_claim(&self) -> &str {
        &self.encoded_claim
    }

    /// Hex signature half.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl FromStr for LicenseToken {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LicenseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.encoded_claim, SEPARATOR, self.signature)
    }
}
