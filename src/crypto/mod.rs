//! Cryptographic primitives for license keys and hardware fingerprints.

pub mod digest;
pub mod signing;
