//! # Item Fingerprint
//!
//! Turns normalized exam item text into a [`ContentFingerprint`]: a
//! version-aware SHA-256 content hash for exact-duplicate detection plus a
//! deduplicated similarity token set for near-duplicate scoring.
//!
//! This crate works over *already normalized* text (see the `normalize`
//! crate); feeding it raw text produces hashes and tokens that will never
//! match the rest of the corpus.
//!
//! ## Example
//!
//! ```rust
//! use fingerprint::{generate, FingerprintConfig};
//!
//! let cfg = FingerprintConfig::default();
//! let fp = generate("ما ناتج ٢ + ٢", &cfg).unwrap();
//! assert_eq!(fp.content_hash.len(), 64);
//! assert!(fp.token_count() > 0);
//! ```

mod config;
mod hash;
mod tokens;

pub use config::{
    FingerprintConfig, FingerprintError, MAX_TOKENS, MIN_CONTENT_LENGTH, NGRAM_SIZE,
};
pub use hash::{hash_content, hash_text};

use serde::{Deserialize, Serialize};

/// The fingerprint of one item's normalized content.
///
/// Carries everything the store persists about the content itself; identity
/// (`item_id`) and bookkeeping (sequence, timestamps) are added at the
/// storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentFingerprint {
    /// Version-aware, spacing-insensitive SHA-256 hex digest. Equal digests
    /// mean exact duplicates.
    pub content_hash: String,
    /// The normalized text the fingerprint was derived from, kept for
    /// audit and re-derivation.
    pub normalized_content: String,
    /// Deduplicated similarity tokens in deterministic order. Empty when
    /// the content is below the minimum length.
    pub similarity_tokens: Vec<String>,
}

impl ContentFingerprint {
    /// Length of the normalized content in characters (not bytes).
    pub fn content_length(&self) -> usize {
        self.normalized_content.chars().count()
    }

    /// Number of similarity tokens.
    pub fn token_count(&self) -> usize {
        self.similarity_tokens.len()
    }

    /// True when the content was too short for near-duplicate comparison.
    pub fn is_short(&self) -> bool {
        self.similarity_tokens.is_empty()
    }
}

/// Generate the fingerprint for normalized text.
///
/// Pure and deterministic: equal `(normalized, cfg)` always produce equal
/// fingerprints. Fails only on an invalid configuration.
pub fn generate(
    normalized: &str,
    cfg: &FingerprintConfig,
) -> Result<ContentFingerprint, FingerprintError> {
    cfg.validate()?;
    Ok(ContentFingerprint {
        content_hash: hash::hash_content(cfg.version, normalized),
        normalized_content: normalized.to_string(),
        similarity_tokens: tokens::similarity_tokens(normalized, cfg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_populates_all_fields() {
        let cfg = FingerprintConfig::default();
        let fp = generate("ما هو ناتج الجمع", &cfg).expect("valid config");
        assert_eq!(fp.content_hash.len(), 64);
        assert_eq!(fp.normalized_content, "ما هو ناتج الجمع");
        assert_eq!(fp.content_length(), 16);
        assert!(!fp.is_short());
        assert!(fp.token_count() > 0);
    }

    #[test]
    fn generate_is_deterministic() {
        let cfg = FingerprintConfig::default();
        let a = generate("اختر الإجابة الصحيحة", &cfg).expect("valid config");
        let b = generate("اختر الإجابة الصحيحة", &cfg).expect("valid config");
        assert_eq!(a, b);
    }

    #[test]
    fn short_content_still_gets_a_hash() {
        let cfg = FingerprintConfig::default();
        let fp = generate("صح", &cfg).expect("valid config");
        assert!(fp.is_short());
        assert_eq!(fp.token_count(), 0);
        assert_eq!(fp.content_hash.len(), 64);
    }

    #[test]
    fn spacing_variants_share_a_hash_but_not_tokens() {
        let cfg = FingerprintConfig::default();
        let spaced = generate("٢x + ٥ = ١٣", &cfg).expect("valid config");
        let dense = generate("٢x+٥=١٣", &cfg).expect("valid config");
        assert_eq!(spaced.content_hash, dense.content_hash);
        // The dense form is below the length floor, the spaced one is not.
        assert!(!spaced.is_short());
        assert!(dense.is_short());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = FingerprintConfig::new().with_version(0);
        assert!(generate("نص طويل بما يكفي للاختبار", &cfg).is_err());
    }

    #[test]
    fn fingerprint_serde_roundtrip() {
        let cfg = FingerprintConfig::default();
        let fp = generate("ما هو ناتج الجمع", &cfg).expect("valid config");
        let json = serde_json::to_string(&fp).unwrap();
        let back: ContentFingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, back);
    }
}
