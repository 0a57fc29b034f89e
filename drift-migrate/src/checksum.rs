//! Content-addressed checksums, prefixed with their algorithm.
//!
//! The `sha256.` prefix admits future algorithm evolution without
//! changing the stored format: a verifier can dispatch on the prefix
//! rather than assuming a fixed algorithm.

use sha2::{Digest, Sha256};

const SHA256_PREFIX: &str = "sha256.";

/// Compute the `sha256.<hex>` checksum of `content`.
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{SHA256_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Recompute the checksum of `content` and compare it against `stored`.
///
/// Pure function of its two arguments — no I/O, no side effects.
pub fn verify_checksum(content: &str, stored: &str) -> bool {
    checksum(content) == stored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_prefixed_and_deterministic() {
        let a = checksum("DEFINE TABLE user SCHEMAFULL;");
        let b = checksum("DEFINE TABLE user SCHEMAFULL;");
        assert_eq!(a, b);
        assert!(a.starts_with(SHA256_PREFIX));
    }

    #[test]
    fn different_content_produces_different_checksum() {
        let a = checksum("DEFINE TABLE user SCHEMAFULL;");
        let b = checksum("DEFINE TABLE post SCHEMAFULL;");
        assert_ne!(a, b);
    }

    #[test]
    fn verify_checksum_detects_tampering() {
        let content = "DEFINE TABLE user SCHEMAFULL;";
        let stored = checksum(content);
        assert!(verify_checksum(content, &stored));
        assert!(!verify_checksum("DEFINE TABLE user SCHEMALESS;", &stored));
    }
}
