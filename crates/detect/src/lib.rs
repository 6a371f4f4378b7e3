//! # Duplicate Detection (`detect`)
//!
//! ## Purpose
//!
//! `detect` sits on top of the text pipeline (`normalize`, `fingerprint`)
//! and the storage layer (`store`). It answers the question authors and
//! reviewers care about: "does this item already exist, or nearly exist,
//! somewhere in the corpus?" via two tiers:
//!
//! - **Exact duplicates** through content-hash equality, an O(1) index
//!   lookup.
//! - **Near duplicates** through Jaccard similarity over token sets, an
//!   O(n) scan behind the swappable [`CandidatePool`] abstraction.
//!
//! Every result is advisory. A storage fault degrades the report (logged,
//! reflected in metrics) instead of failing the caller's item save.
//!
//! ## Core Types
//!
//! - [`DetectService`]: orchestrates normalize, fingerprint, persist, and
//!   compare for one item at a time.
//! - [`AnalyzeOptions`]: per-request knobs (`threshold`, `include_exact`,
//!   `include_similar`, `limit`).
//! - [`DedupReport`]: the JSON-serializable outcome, including the 0-100
//!   uniqueness score.
//! - [`CandidatePool`]: injectable candidate source for the similarity
//!   scan.
//!
//! ## Example Usage
//!
//! ```
//! use detect::{AnalyzeOptions, DetectService};
//!
//! let service = DetectService::in_memory_default().expect("service init");
//! service
//!     .analyze("item-1", "ما ناتج جمع خمسة وثلاثة؟", &AnalyzeOptions::default())
//!     .expect("analyze");
//!
//! // Same question, different punctuation: an exact duplicate.
//! let report = service
//!     .analyze("item-2", "ما ناتج جمع خمسة وثلاثة", &AnalyzeOptions::default())
//!     .expect("analyze");
//! assert_eq!(report.exact_duplicates.len(), 1);
//! assert!(!report.is_unique);
//! ```
//!
//! ## Observability
//!
//! Install a [`DetectMetrics`] implementation via [`set_detect_metrics`] to
//! record per-analysis latency, match counts, and degradation. This is
//! typically done once during service startup.

pub mod metrics;
pub mod service;
pub mod similarity;
pub mod types;

pub use crate::metrics::{set_detect_metrics, DetectMetrics};
pub use crate::service::DetectService;
pub use crate::similarity::{
    find_similar, jaccard, jaccard_tokens, rank, scan_candidates, CandidatePool, ScoredCandidate,
};
pub use crate::types::{
    AnalyzeOptions, DedupReport, DetectConfig, DetectError, DuplicateMatch,
    DEFAULT_LIMIT, DEFAULT_SIMILARITY_THRESHOLD, MAX_LIMIT, UNIQUENESS_THRESHOLD,
};
