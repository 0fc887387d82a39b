//! Content fingerprints for determinism checks

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 fingerprint, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

/// Incremental fingerprint over a sequence of parts.
///
/// Each part is length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
#[derive(Default)]
pub struct Fingerprinter {
    hasher: Sha256,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, part: &[u8]) {
        self.hasher.update((part.len() as u64).to_le_bytes());
        self.hasher.update(part);
    }

    pub fn update_str(&mut self, part: &str) {
        self.update(part.as_bytes());
    }

    /// Hash a value's compact JSON form.
    ///
    /// Entity records contain only ordered collections (`Vec`, `BTreeMap`), so
    /// the same content always serializes to the same bytes.
    pub fn update_serialize<T: Serialize + ?Sized>(&mut self, value: &T) -> serde_json::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.update(&bytes);
        Ok(())
    }

    pub fn finish(self) -> Checksum {
        Checksum(format!("{:x}", self.hasher.finalize()))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_checksum_consistency() {
        let a = Checksum::from_bytes(br#"{"id":"trachea"}"#);
        let b = Checksum::from_bytes(br#"{"id":"trachea"}"#);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a.short().len(), 12);
    }

    #[test]
    fn test_checksum_different_content() {
        let a = Checksum::from_bytes(b"pharynx");
        let b = Checksum::from_bytes(b"larynx");
        assert_ne!(a, b);
    }

    #[test]
    fn test_update_serialize_reports_errors() {
        let mut fp = Fingerprinter::new();
        fp.update_serialize(&vec!["pharynx"]).unwrap();

        // JSON object keys must be strings
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8, 2], "larynx");
        assert!(fp.update_serialize(&bad).is_err());
    }

    #[test]
    fn test_fingerprinter_part_boundaries() {
        let mut left = Fingerprinter::new();
        left.update_str("ab");
        left.update_str("c");

        let mut right = Fingerprinter::new();
        right.update_str("a");
        right.update_str("bc");

        assert_ne!(left.finish(), right.finish());
    }
}
