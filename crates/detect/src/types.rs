use serde::{Deserialize, Serialize};
use thiserror::Error;

use fingerprint::FingerprintError;
use normalize::NormalizeError;
use store::StoreError;

/// Default Jaccard similarity threshold for reporting near duplicates.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Similarity level at which an item counts against another item's
/// uniqueness score. Deliberately much lower than the reporting threshold:
/// the score reflects loose overlap across the corpus, not confirmed
/// duplicates.
pub const UNIQUENESS_THRESHOLD: f64 = 0.3;

/// Default number of matches reported per category.
pub const DEFAULT_LIMIT: usize = 20;

/// Upper bound on the per-request match limit.
pub const MAX_LIMIT: usize = 50;

/// Per-request analysis options.
///
/// Serde-friendly so callers can embed it in API payloads; omitted fields
/// fall back to the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeOptions {
    /// Minimum Jaccard similarity for an item to appear in `similar_items`.
    #[serde(default = "AnalyzeOptions::default_threshold")]
    pub threshold: f64,
    /// Whether to report exact (hash-equal) duplicates.
    #[serde(default = "AnalyzeOptions::default_include")]
    pub include_exact: bool,
    /// Whether to report near duplicates. Disabling skips the ranked match
    /// list but never the uniqueness score.
    #[serde(default = "AnalyzeOptions::default_include")]
    pub include_similar: bool,
    /// Maximum matches reported per category, capped at [`MAX_LIMIT`].
    #[serde(default = "AnalyzeOptions::default_limit")]
    pub limit: usize,
}

impl AnalyzeOptions {
    pub(crate) fn default_threshold() -> f64 {
        DEFAULT_SIMILARITY_THRESHOLD
    }

    pub(crate) fn default_include() -> bool {
        true
    }

    pub(crate) fn default_limit() -> usize {
        DEFAULT_LIMIT
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_include_exact(mut self, include_exact: bool) -> Self {
        self.include_exact = include_exact;
        self
    }

    pub fn with_include_similar(mut self, include_similar: bool) -> Self {
        self.include_similar = include_similar;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Validate the options for a single request.
    ///
    /// Out-of-range values indicate a programming error in the caller, so
    /// this is the one place the service fails fast instead of degrading.
    pub fn validate(&self) -> Result<(), DetectError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DetectError::InvalidOptions(
                "threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(DetectError::InvalidOptions(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(())
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            include_exact: true,
            include_similar: true,
            limit: Self::default_limit(),
        }
    }
}

/// Service-level detection configuration, fixed at construction time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectConfig {
    /// Similarity level counted against the uniqueness score. Distinct from
    /// [`AnalyzeOptions::threshold`], which only filters the reported list.
    #[serde(default = "DetectConfig::default_uniqueness_threshold")]
    pub uniqueness_threshold: f64,
    /// Characters of normalized content echoed back in `content_preview`.
    #[serde(default = "DetectConfig::default_content_preview_chars")]
    pub content_preview_chars: usize,
    /// Characters of a matched item's content included per match.
    #[serde(default = "DetectConfig::default_match_preview_chars")]
    pub match_preview_chars: usize,
}

impl DetectConfig {
    pub(crate) fn default_uniqueness_threshold() -> f64 {
        UNIQUENESS_THRESHOLD
    }

    pub(crate) fn default_content_preview_chars() -> usize {
        100
    }

    pub(crate) fn default_match_preview_chars() -> usize {
        50
    }

    pub fn with_uniqueness_threshold(mut self, uniqueness_threshold: f64) -> Self {
        self.uniqueness_threshold = uniqueness_threshold;
        self
    }

    pub fn with_content_preview_chars(mut self, content_preview_chars: usize) -> Self {
        self.content_preview_chars = content_preview_chars;
        self
    }

    pub fn with_match_preview_chars(mut self, match_preview_chars: usize) -> Self {
        self.match_preview_chars = match_preview_chars;
        self
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        if !(0.0..=1.0).contains(&self.uniqueness_threshold) {
            return Err(DetectError::InvalidOptions(
                "uniqueness_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.content_preview_chars == 0 || self.match_preview_chars == 0 {
            return Err(DetectError::InvalidOptions(
                "preview lengths must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            uniqueness_threshold: Self::default_uniqueness_threshold(),
            content_preview_chars: Self::default_content_preview_chars(),
            match_preview_chars: Self::default_match_preview_chars(),
        }
    }
}

/// One matched item in a dedup report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateMatch {
    /// Item id of the matched record.
    pub item_id: String,
    /// Jaccard similarity against the analyzed item; 1.0 for exact matches.
    pub similarity_score: f64,
    /// Leading characters of the matched item's normalized content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Full analysis outcome for one item. Serializes to the wire shape the
/// authoring workflow consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DedupReport {
    /// The analyzed item.
    pub item_id: String,
    /// Version-aware content hash of the analyzed content.
    pub content_hash: String,
    /// How distinctive the content is within the corpus, 0.0 to 100.0.
    pub uniqueness_score: f64,
    /// Number of similarity tokens derived from the content.
    pub token_count: usize,
    /// Normalized content length in characters.
    pub content_length: usize,
    /// True when no exact duplicate was found. Always true when exact
    /// matching was disabled for the request.
    pub is_unique: bool,
    /// Total exact duplicates in the corpus, before the reporting limit.
    /// Stays 0 when exact matching was disabled.
    pub duplicate_count: usize,
    /// Leading characters of the analyzed item's normalized content.
    pub content_preview: String,
    /// Hash-equal matches, oldest first.
    pub exact_duplicates: Vec<DuplicateMatch>,
    /// Near matches at or above the request threshold, best first.
    pub similar_items: Vec<DuplicateMatch>,
}

/// First `max_chars` characters of `s`, with an ellipsis when truncated.
/// Counts codepoints, so multi-byte text is never split mid-character.
pub(crate) fn char_prefix(s: &str, max_chars: usize) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    for _ in 0..max_chars {
        match chars.next() {
            Some(c) => out.push(c),
            None => return out,
        }
    }
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

/// Errors produced by the detection layer.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Invalid analysis options or service configuration.
    #[error("invalid analyze options: {0}")]
    InvalidOptions(String),
    /// Normalization configuration was rejected.
    #[error("normalize error: {0}")]
    Normalize(#[from] NormalizeError),
    /// Fingerprint generation failed.
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),
    /// Storage layer failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        let opts = AnalyzeOptions::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.threshold, DEFAULT_SIMILARITY_THRESHOLD);
        assert!(opts.include_exact);
        assert!(opts.include_similar);
        assert_eq!(opts.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        for threshold in [-0.1, 1.1, f64::NAN] {
            let opts = AnalyzeOptions::default().with_threshold(threshold);
            let err = opts.validate().expect_err("options should be invalid");
            match err {
                DetectError::InvalidOptions(msg) => assert!(msg.contains("threshold")),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn out_of_range_limit_rejected() {
        for limit in [0, MAX_LIMIT + 1] {
            let opts = AnalyzeOptions::default().with_limit(limit);
            let err = opts.validate().expect_err("options should be invalid");
            match err {
                DetectError::InvalidOptions(msg) => assert!(msg.contains("limit")),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: AnalyzeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, AnalyzeOptions::default());

        let opts: AnalyzeOptions =
            serde_json::from_str(r#"{"threshold": 0.5, "include_exact": false}"#).unwrap();
        assert_eq!(opts.threshold, 0.5);
        assert!(!opts.include_exact);
        assert_eq!(opts.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn default_detect_config_is_valid() {
        let cfg = DetectConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.uniqueness_threshold, UNIQUENESS_THRESHOLD);
    }

    #[test]
    fn invalid_uniqueness_threshold_rejected() {
        let cfg = DetectConfig::default().with_uniqueness_threshold(1.5);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn char_prefix_respects_codepoint_boundaries() {
        assert_eq!(char_prefix("قصير", 10), "قصير");
        assert_eq!(char_prefix("ما هو الناتج", 5), "ما هو...");
        assert_eq!(char_prefix("", 5), "");
        // Exactly at the limit: no ellipsis.
        assert_eq!(char_prefix("abcde", 5), "abcde");
    }

    #[test]
    fn report_serializes_wire_field_names() {
        let report = DedupReport {
            item_id: "item-1".into(),
            content_hash: "0".repeat(64),
            uniqueness_score: 87.5,
            token_count: 12,
            content_length: 14,
            is_unique: true,
            duplicate_count: 0,
            content_preview: "نص".into(),
            exact_duplicates: vec![],
            similar_items: vec![DuplicateMatch {
                item_id: "item-2".into(),
                similarity_score: 0.812,
                preview: None,
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        for key in [
            "item_id",
            "content_hash",
            "uniqueness_score",
            "token_count",
            "content_length",
            "is_unique",
            "duplicate_count",
            "content_preview",
            "exact_duplicates",
            "similar_items",
        ] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
        // Absent previews are omitted from the wire format entirely.
        assert!(value["similar_items"][0].get("preview").is_none());
        assert_eq!(value["similar_items"][0]["similarity_score"], 0.812);
    }
}
