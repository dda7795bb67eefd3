//! Content fingerprints for change detection.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 16;

/// Short fingerprint of encoded tile bytes.
///
/// The first 16 hex characters of the SHA-256 digest. Used to detect
/// whether a tile changed between generations, not to prove integrity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Fingerprints `data`.
    pub fn of(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut hex = format!("{:x}", digest);
        hex.truncate(FINGERPRINT_LEN);
        Self(hex)
    }

    /// The fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
