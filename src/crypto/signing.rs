//! HMAC-SHA256 authentication tags over the encoded claim.
//!
//! The tag covers the transport-encoded claim exactly as it appears in the
//! key, so verification never needs to decode anything first.

use crate::config::SigningSecret;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the lower-case hex HMAC-SHA256 tag of `encoded_claim`.
pub fn sign(encoded_claim: &str, secret: &SigningSecret) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(encoded_claim.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Recompute the tag and compare it to `signature` in constant time.
///
/// Any mismatch, including a wrong length or non-hex input, is `false`.
pub fn verify(encoded_claim: &str, signature: &str, secret: &SigningSecret) -> bool {
    let expected = sign(encoded_claim, secret);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
