//! SHA-256 checksum utilities
//!
//! Every checksum uses the canonical `sha256:<hex>` format. The provenance
//! ledger compares these strings directly, so the format must stay stable.

use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
pub fn compute_content_checksum(content: &str) -> String {
    compute_bytes_checksum(content.as_bytes())
}

/// Compute the SHA-256 checksum of raw bytes.
pub fn compute_bytes_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_checksum_has_prefix() {
        assert!(compute_content_checksum("deploy").starts_with("sha256:"));
    }

    #[test]
    fn content_checksum_known_value() {
        assert_eq!(
            compute_content_checksum("hello world"),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn bytes_and_content_checksums_agree() {
        assert_eq!(
            compute_bytes_checksum(b"Ship it.\n"),
            compute_content_checksum("Ship it.\n")
        );
    }
}
