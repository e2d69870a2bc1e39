//! SHA-256 helpers for drift detection and generated migration ids.

use sha2::{Digest, Sha256};

/// Checksum of a script's text, recorded in the ledger when it is applied.
pub fn script_checksum(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derive a 40-character hex identifier from the given parts.
///
/// Parts are separated by a NUL byte so `["ab", "c"]` and `["a", "bc"]`
/// produce different ids.
pub fn content_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let hex = format!("{:x}", hasher.finalize());
    hex[..40].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_checksum_is_stable() {
        assert_eq!(
            script_checksum("CREATE TABLE t (id INT);"),
            script_checksum("CREATE TABLE t (id INT);")
        );
        assert_ne!(script_checksum("a"), script_checksum("b"));
        assert_eq!(script_checksum("").len(), 64);
    }

    #[test]
    fn test_content_id_separates_parts() {
        assert_eq!(content_id(&["ab", "c"]).len(), 40);
        assert_ne!(content_id(&["ab", "c"]), content_id(&["a", "bc"]));
    }
}
