//! Content deduplication and similarity engine for exam item authoring.
//!
//! This umbrella crate stitches the pipeline stages together so callers can
//! go from raw author input to a stored fingerprint and a dedup report with
//! a single entry point:
//!
//! - [`normalize`]: Arabic-aware text normalization (diacritics, punctuation,
//!   digit unification, whitespace, case).
//! - [`fingerprint`](generate): version-aware SHA-256 content hash plus
//!   character trigram / word tokens for similarity comparison.
//! - [`FingerprintStore`]: persistent fingerprint corpus with a hash index,
//!   backed by redb or memory.
//! - [`DetectService`]: per-item analysis producing a [`DedupReport`] with
//!   exact duplicates, ranked near-duplicates, and a 0-100 uniqueness score.
//!
//! ## Example Usage
//!
//! ```
//! use itemdup::{AnalyzeOptions, ItemdupConfig};
//!
//! let config = ItemdupConfig::from_yaml_str("version: \"1.0\"").expect("config");
//! let service = config.build_service().expect("service");
//!
//! service
//!     .analyze("item-1", "كم يساوي ٥ + ٣؟", &AnalyzeOptions::default())
//!     .expect("analyze");
//!
//! // Western digits and trailing punctuation normalize away: exact duplicate.
//! let report = service
//!     .analyze("item-2", "كم يساوي 5 + 3", &AnalyzeOptions::default())
//!     .expect("analyze");
//!
//! assert!(!report.is_unique);
//! assert_eq!(report.exact_duplicates[0].item_id, "item-1");
//! ```
//!
//! ## Observability
//!
//! All stages emit `tracing` events; install a [`DetectMetrics`] recorder via
//! [`set_detect_metrics`] for per-analysis latency and match counts.

pub mod config;

pub use config::{ConfigLoadError, ItemdupConfig, StoreYamlConfig};

pub use detect::{
    set_detect_metrics, AnalyzeOptions, DedupReport, DetectConfig, DetectError, DetectMetrics,
    DetectService, DuplicateMatch, DEFAULT_LIMIT, DEFAULT_SIMILARITY_THRESHOLD, MAX_LIMIT,
    UNIQUENESS_THRESHOLD,
};
pub use fingerprint::{
    generate, hash_content, hash_text, ContentFingerprint, FingerprintConfig, FingerprintError,
    MAX_TOKENS, MIN_CONTENT_LENGTH, NGRAM_SIZE,
};
pub use normalize::{normalize, normalize_bytes, NormalizeConfig, NormalizeError};
pub use store::{
    BackendConfig, CompressionCodec, CompressionConfig, Fingerprint, FingerprintStore,
    InMemoryBackend, StoreBackend, StoreConfig, StoreError, STORE_SCHEMA_VERSION,
};

/// Normalize raw text and fingerprint it in one step.
///
/// Convenience for callers that want the content hash or similarity tokens
/// without touching a store, e.g. client-side precheck before submission.
pub fn fingerprint_text(
    raw: &str,
    normalize_cfg: &NormalizeConfig,
    fingerprint_cfg: &FingerprintConfig,
) -> Result<ContentFingerprint, FingerprintError> {
    let normalized = normalize(raw, normalize_cfg);
    generate(&normalized, fingerprint_cfg)
}
