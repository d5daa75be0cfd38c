//! Hardware fingerprint digest.

use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters (128 bits).
pub const FINGERPRINT_HEX_LEN: usize = 32;

/// Reduce a raw hardware identifier to a 128-bit upper-case hex digest.
///
/// Uses the first 16 bytes of SHA-256. Surrounding whitespace is ignored so
/// probe output with or without a trailing newline hashes the same.
pub fn fingerprint_digest(raw_id: &str) -> String {
    let hash = Sha256::digest(raw_id.trim().as_bytes());
    hex::encode_upper(&hash[..FINGERPRINT_HEX_LEN / 2])
}

/// Whether `s` has the shape of a fingerprint: 32 upper-case hex characters.
pub fn is_fingerprint(s: &str) -> bool {
    s.len() == FINGERPRINT_HEX_LEN
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_known_value() {
        // SHA-256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a3...
        assert_eq!(
            fingerprint_digest("abc"),
            "BA7816BF8F01CFEA414140DE5DAE2223"
        );
    }

    #[test]
    fn digest_has_fingerprint_shape() {
        let fp = fingerprint_digest("4C4C4544-0042-3510-8056-B4C04F384E32");
        assert!(is_fingerprint(&fp));
    }

    #[test]
    fn digest_ignores_surrounding_whitespace() {
        assert_eq!(fingerprint_digest("abc\r\n"), fingerprint_digest("  abc"));
    }

    #[test]
    fn digest_distinguishes_ids() {
        assert_ne!(fingerprint_digest("machine-a"), fingerprint_digest("machine-b"));
    }

    #[test]
    fn is_fingerprint_rejects_lowercase_and_length() {
        assert!(!is_fingerprint("ba7816bf8f01cfea414140de5dae2223"));
        assert!(!is_fingerprint("BA7816BF"));
        assert!(!is_fingerprint("UNKNOWN_HWID"));
        assert!(!is_fingerprint("GA7816BF8F01CFEA414140DE5DAE2223"));
    }
}
