//! Configuration types for the normalization pipeline.
//!
//! This module defines [`NormalizeConfig`], which controls how raw item text
//! is transformed into its canonical comparison form.
//!
//! # Versioning
//!
//! The `version` field names the normalization behavior revision. Any change
//! to normalization output (even a bug fix) must bump it, in step with the
//! fingerprint version that keys content hashes downstream. This ensures
//! that:
//!
//! - Fingerprints written under an old behavior never silently collide with
//!   fingerprints written under a new one
//! - A corpus can be re-fingerprinted incrementally: records carrying a stale
//!   version simply stop matching and get rewritten
//!
//! # Stability
//!
//! For a given `version`, output is stable across machines, operating
//! systems, and locales. Nothing in the pipeline consults the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the text normalization pipeline.
///
/// The defaults reproduce the canonical comparison form used for exam item
/// deduplication: NFC composition, Arabic diacritic removal, punctuation
/// removal, whitespace collapsing, ASCII→Arabic-Indic digit unification, and
/// Unicode lowercasing. Diacritic stripping and whitespace collapsing are
/// always on; the remaining steps can be toggled for diagnostics.
///
/// # Example
///
/// ```rust
/// use normalize::NormalizeConfig;
///
/// let cfg = NormalizeConfig::default();
/// assert_eq!(cfg.version, 1);
/// assert!(cfg.strip_punctuation);
/// assert!(cfg.unify_digits);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Semantic version of the normalization behavior.
    ///
    /// Must be >= 1; version 0 is reserved and rejected by [`validate`].
    /// Bump it, together with the fingerprint version, whenever
    /// normalization output changes for any input.
    ///
    /// [`validate`]: NormalizeConfig::validate
    pub version: u32,

    /// If true, apply Unicode NFC composition before the character filters.
    ///
    /// NFC guarantees that composed and decomposed spellings of the same
    /// text ("é" as U+00E9 vs. "e" + U+0301) converge before comparison.
    /// NFC is used rather than NFKC on purpose: NFKC rewrites compatibility
    /// characters, which would fold mathematical glyphs such as "²" into
    /// plain digits and change the meaning of exam content.
    ///
    /// Default: `true`. Disable only when the input is known to already be
    /// NFC (for example, replaying stored canonical text).
    pub normalize_unicode: bool,

    /// If true, delete the fixed punctuation set
    /// `، ؛ ؟ ! " ' ( ) [ ] { }` from the text.
    ///
    /// Deleted characters leave no trace: `"(أ)"` becomes `"أ"` and
    /// `"a(b)c"` becomes `"abc"`. Mathematical operators (`+ - × ÷ = < > %`)
    /// are not in the set and always survive, so distinct equations stay
    /// distinct.
    ///
    /// Default: `true`.
    pub strip_punctuation: bool,

    /// If true, map ASCII digits `0-9` to Arabic-Indic digits `٠-٩`.
    ///
    /// Item authors mix keyboard layouts; unifying the digit script makes
    /// `"13"` and `"١٣"` compare equal. The mapping targets Arabic-Indic
    /// because that is the display script of the corpus. Extended
    /// Arabic-Indic digits (`۰-۹`) are left untouched.
    ///
    /// Default: `true`.
    pub unify_digits: bool,

    /// If true, apply Unicode lowercasing (full case mapping, not
    /// ASCII-only).
    ///
    /// Arabic has no case, but items quote Latin variable names and units;
    /// `"2X"` and `"2x"` must normalize identically. Expansion-aware: a
    /// single uppercase character may lowercase to several characters.
    ///
    /// Default: `true`.
    pub lowercase: bool,
}

impl NormalizeConfig {
    /// Create a configuration with the default behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the behavior version. Must be >= 1.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Enable or disable NFC composition.
    pub fn with_unicode_normalization(mut self, normalize_unicode: bool) -> Self {
        self.normalize_unicode = normalize_unicode;
        self
    }

    /// Enable or disable punctuation removal.
    pub fn with_strip_punctuation(mut self, strip_punctuation: bool) -> Self {
        self.strip_punctuation = strip_punctuation;
        self
    }

    /// Enable or disable ASCII→Arabic-Indic digit unification.
    pub fn with_unify_digits(mut self, unify_digits: bool) -> Self {
        self.unify_digits = unify_digits;
        self
    }

    /// Enable or disable Unicode lowercasing.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.version < 1 {
            return Err(NormalizeError::InvalidVersion {
                version: self.version,
            });
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            strip_punctuation: true,
            unify_digits: true,
            lowercase: true,
        }
    }
}

/// Errors reported by the normalization layer.
///
/// Normalization itself is total over `&str` input; only configuration can
/// be invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidVersion { version: u32 },
}
