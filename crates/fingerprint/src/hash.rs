//! Content hashing for exact-duplicate detection.
//!
//! # Algorithm
//!
//! ```text
//! SHA-256(version.to_be_bytes() || 0x00 || separator_free_text_bytes)
//! ```
//!
//! where `separator_free_text_bytes` is the normalized text with its single
//! ASCII spaces removed. Two properties follow:
//!
//! - **Version awareness.** The config version prefixes the digest, so a
//!   normalization or fingerprinting behavior change produces disjoint
//!   hashes instead of silent false matches against old records.
//! - **Spacing insensitivity.** `"٢x + ٥ = ١٣"` and `"٢x+٥=١٣"` digest
//!   identically. Normalization already collapses whitespace *runs*; the
//!   digest goes one step further and ignores word spacing entirely, because
//!   authors spell the same equation with and without spaces. The normalized
//!   text itself keeps its single spaces for word tokenization; only the
//!   digest input is stripped.

use sha2::{Digest, Sha256};

/// Discriminator byte between the version prefix and the content bytes.
const CONTENT_DOMAIN: u8 = 0x00;

/// Compute the exact-match content hash for normalized text under a given
/// behavior version.
///
/// Returns a 64-character lowercase hex digest. Deterministic: equal
/// `(version, text)` pairs always produce equal output.
///
/// # Examples
///
/// ```rust
/// use fingerprint::hash_content;
///
/// let a = hash_content(1, "٢x + ٥ = ١٣");
/// let b = hash_content(1, "٢x+٥=١٣");
/// assert_eq!(a, b); // spacing never affects identity
/// assert_ne!(a, hash_content(2, "٢x + ٥ = ١٣")); // version does
/// ```
pub fn hash_content(version: u32, normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(version.to_be_bytes());
    hasher.update([CONTENT_DOMAIN]);
    // Normalized text contains only single ASCII spaces; feeding the
    // fragments between them hashes the separator-free text without an
    // intermediate allocation.
    for fragment in normalized.split(' ') {
        hasher.update(fragment.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Hash arbitrary text with plain SHA-256 and return a hex digest.
///
/// Version-agnostic and spacing-sensitive; meant for diagnostics and
/// logging, not for content identity. Use [`hash_content`] for dedup.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        let hash = hash_content(1, "نص تجريبي");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c: char| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(hash_content(1, "ما هو الجواب"), hash_content(1, "ما هو الجواب"));
    }

    #[test]
    fn version_changes_digest() {
        assert_ne!(hash_content(1, "نص"), hash_content(2, "نص"));
    }

    #[test]
    fn spacing_never_changes_digest() {
        assert_eq!(hash_content(1, "٢x + ٥ = ١٣"), hash_content(1, "٢x+٥=١٣"));
        assert_eq!(hash_content(1, "ا ب ج"), hash_content(1, "اب ج"));
    }

    #[test]
    fn different_content_differs() {
        assert_ne!(hash_content(1, "٢x+٥=١٣"), hash_content(1, "٢x+٥=١٤"));
    }

    #[test]
    fn plain_text_hash_is_spacing_sensitive() {
        assert_ne!(hash_text("ا ب"), hash_text("اب"));
        assert_eq!(hash_text("ا ب").len(), 64);
    }
}
