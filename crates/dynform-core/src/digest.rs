//! # Fingerprint Digests
//!
//! Defines [`Fingerprint`], the 32-byte SHA-256 digest used as the
//! deduplication key for accepted submissions.
//!
//! ## Invariant
//!
//! A `Fingerprint` can only be computed from [`CanonicalBytes`] via
//! [`sha256_digest`], or decoded from a previously stored hex string.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::FingerprintParseError;

/// A SHA-256 content digest. Serializes as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Compute the SHA-256 fingerprint of canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    Fingerprint(hasher.finalize().into())
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FingerprintParseError {
            value: s.to_string(),
        };
        let raw = s.as_bytes();
        if raw.len() != 64 {
            return Err(err());
        }
        let mut bytes = [0u8; 32];
        for (i, pair) in raw.chunks_exact(2).enumerate() {
            let hi = hex_nibble(pair[0]).ok_or_else(err)?;
            let lo = hex_nibble(pair[1]).ok_or_else(err)?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = FingerprintParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_object() {
        let canonical = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        // sha256("{}")
        assert_eq!(
            sha256_digest(&canonical).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn hex_parse_roundtrip() {
        let canonical = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        let fp = sha256_digest(&canonical);
        let parsed: Fingerprint = fp.to_hex().parse().unwrap();
        assert_eq!(parsed, fp);
        assert_eq!(fp.to_string().len(), 64);
    }

    #[test]
    fn rejects_uppercase_and_wrong_length() {
        let upper = "44136FA355B3678A1146AD16F7E8649E94FB4FC21FE77E8310C060F61CAAFF8A";
        assert!(upper.parse::<Fingerprint>().is_err());
        assert!("abc".parse::<Fingerprint>().is_err());
        assert!("zz".repeat(32).parse::<Fingerprint>().is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let canonical = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        let fp = sha256_digest(&canonical);
        let json = serde_json::to_value(fp).unwrap();
        assert_eq!(json, serde_json::Value::String(fp.to_hex()));
        let back: Fingerprint = serde_json::from_value(json).unwrap();
        assert_eq!(back, fp);
    }
}
