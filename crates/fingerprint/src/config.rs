//! Configuration and error types for fingerprint generation.
//!
//! The fingerprint layer is a pure function of `(normalized_text, config)`:
//! no I/O and no environment-dependent behavior. Everything that can change
//! its output lives in [`FingerprintConfig`], and the `version` field is
//! folded into every content hash so that behavior changes re-key the corpus
//! instead of silently colliding with old records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character n-gram width used for similarity tokens.
pub const NGRAM_SIZE: usize = 3;

/// Minimum normalized length (in characters) for similarity tokens to be
/// generated at all. Shorter content still gets a content hash, but its
/// token set is empty and it never participates in near-duplicate scans.
pub const MIN_CONTENT_LENGTH: usize = 10;

/// Hard cap on the number of similarity tokens kept per item.
pub const MAX_TOKENS: usize = 1000;

/// Minimum word length (in characters) for a word to become a token.
pub(crate) const MIN_WORD_CHARS: usize = 2;

/// Configuration for fingerprint generation.
///
/// Defaults reproduce the corpus-wide fingerprinting behavior: character
/// trigrams plus words, a 10-character floor below which no tokens are
/// produced, and a 1000-token frequency cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Fingerprint behavior version, folded into every content hash.
    /// Must be >= 1.
    pub version: u32,
    /// Width of character n-grams, in codepoints. Trigrams balance noise
    /// tolerance against locality for short exam stems.
    pub ngram_size: usize,
    /// Minimum normalized length (characters) before tokens are generated.
    pub min_content_length: usize,
    /// Maximum number of tokens kept per item. Over the cap, the most
    /// frequent tokens win, ties broken by first occurrence.
    pub max_tokens: usize,
}

impl FingerprintConfig {
    /// Create a configuration with the default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the behavior version. Must be >= 1.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the character n-gram width. Must be >= 1.
    pub fn with_ngram_size(mut self, ngram_size: usize) -> Self {
        self.ngram_size = ngram_size;
        self
    }

    /// Set the minimum content length for token generation.
    pub fn with_min_content_length(mut self, min_content_length: usize) -> Self {
        self.min_content_length = min_content_length;
        self
    }

    /// Set the token cap. Must be >= 1.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version < 1 {
            return Err(FingerprintError::InvalidVersion {
                version: self.version,
            });
        }
        if self.ngram_size < 1 {
            return Err(FingerprintError::InvalidNgramSize {
                ngram_size: self.ngram_size,
            });
        }
        if self.max_tokens < 1 {
            return Err(FingerprintError::InvalidMaxTokens {
                max_tokens: self.max_tokens,
            });
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ngram_size: NGRAM_SIZE,
            min_content_length: MIN_CONTENT_LENGTH,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Errors returned by fingerprint generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidVersion { version: u32 },

    #[error("invalid config: ngram_size must be >= 1 (got {ngram_size})")]
    InvalidNgramSize { ngram_size: usize },

    #[error("invalid config: max_tokens must be >= 1 (got {max_tokens})")]
    InvalidMaxTokens { max_tokens: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = FingerprintConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.ngram_size, 3);
        assert_eq!(cfg.min_content_length, 10);
        assert_eq!(cfg.max_tokens, 1000);
    }

    #[test]
    fn config_builder_chain() {
        let cfg = FingerprintConfig::new()
            .with_version(4)
            .with_ngram_size(2)
            .with_min_content_length(5)
            .with_max_tokens(64);
        assert_eq!(cfg.version, 4);
        assert_eq!(cfg.ngram_size, 2);
        assert_eq!(cfg.min_content_length, 5);
        assert_eq!(cfg.max_tokens, 64);
    }

    #[test]
    fn config_validate_rejects_bad_fields() {
        assert!(matches!(
            FingerprintConfig::new().with_version(0).validate(),
            Err(FingerprintError::InvalidVersion { version: 0 })
        ));
        assert!(matches!(
            FingerprintConfig::new().with_ngram_size(0).validate(),
            Err(FingerprintError::InvalidNgramSize { ngram_size: 0 })
        ));
        assert!(matches!(
            FingerprintConfig::new().with_max_tokens(0).validate(),
            Err(FingerprintError::InvalidMaxTokens { max_tokens: 0 })
        ));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = FingerprintConfig::new().with_max_tokens(128);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: FingerprintConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
