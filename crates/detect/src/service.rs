use std::sync::Arc;
use std::time::Instant;

use fingerprint::{generate, ContentFingerprint, FingerprintConfig};
use hashbrown::HashSet;
use normalize::{normalize, NormalizeConfig};
use store::{BackendConfig, Fingerprint, FingerprintStore, StoreConfig};
use tracing::{info, span, warn, Level};

use crate::metrics::metrics_recorder;
use crate::similarity::{rank, scan_candidates, ScoredCandidate};
use crate::types::{
    char_prefix, AnalyzeOptions, DedupReport, DetectConfig, DetectError, DuplicateMatch,
};

/// Duplicate detection service: normalization, fingerprinting, persistence,
/// and similarity analysis behind one synchronous API.
///
/// `analyze` is the write-then-report path the authoring workflow calls on
/// item save. Everything it returns is advisory: storage failures degrade
/// the report instead of failing the caller's save.
pub struct DetectService {
    store: Arc<FingerprintStore>,
    normalize_cfg: NormalizeConfig,
    fingerprint_cfg: FingerprintConfig,
    cfg: DetectConfig,
}

impl DetectService {
    /// Construct a service over an owned store with explicit configs.
    pub fn new(
        store: FingerprintStore,
        normalize_cfg: NormalizeConfig,
        fingerprint_cfg: FingerprintConfig,
        cfg: DetectConfig,
    ) -> Result<Self, DetectError> {
        Self::with_store_arc(Arc::new(store), normalize_cfg, fingerprint_cfg, cfg)
    }

    /// Construct a service from a shared store handle and explicit configs.
    pub fn with_store_arc(
        store: Arc<FingerprintStore>,
        normalize_cfg: NormalizeConfig,
        fingerprint_cfg: FingerprintConfig,
        cfg: DetectConfig,
    ) -> Result<Self, DetectError> {
        normalize_cfg.validate()?;
        fingerprint_cfg.validate()?;
        cfg.validate()?;
        Ok(Self {
            store,
            normalize_cfg,
            fingerprint_cfg,
            cfg,
        })
    }

    /// Convenience helper: default configs over a fresh in-memory store, for
    /// tests or ephemeral corpora.
    pub fn in_memory_default() -> Result<Self, DetectError> {
        let store =
            FingerprintStore::open(StoreConfig::new().with_backend(BackendConfig::in_memory()))?;
        Self::new(
            store,
            NormalizeConfig::default(),
            FingerprintConfig::default(),
            DetectConfig::default(),
        )
    }

    /// Fingerprint an item's text, persist it, and report exact duplicates,
    /// near duplicates, and a uniqueness score against the whole corpus.
    ///
    /// The item joins the corpus before the comparison, so repeated analyses
    /// of the same item are idempotent and later queries see it.
    pub fn analyze(
        &self,
        item_id: &str,
        raw_content: &str,
        opts: &AnalyzeOptions,
    ) -> Result<DedupReport, DetectError> {
        if item_id.trim().is_empty() {
            return Err(DetectError::InvalidOptions(
                "item_id must not be empty".into(),
            ));
        }
        opts.validate()?;

        let span = span!(Level::INFO, "analyze", item_id = %item_id);
        let _guard = span.enter();
        let start = Instant::now();
        let mut degraded = false;

        let normalized = normalize(raw_content, &self.normalize_cfg);
        let fp = generate(&normalized, &self.fingerprint_cfg)?;

        if let Err(e) = self.store.upsert(item_id, &fp) {
            degraded = true;
            warn!(error = %e, "fingerprint upsert failed, analysis continues read-only");
        }

        let corpus = self.store.len();
        let report = if fp.is_short() {
            self.short_report(item_id, &fp)
        } else {
            self.full_report(item_id, &fp, opts, corpus, &mut degraded)
        };

        let latency = start.elapsed();
        info!(
            elapsed_micros = latency.as_micros() as u64,
            corpus,
            exact = report.exact_duplicates.len(),
            similar = report.similar_items.len(),
            uniqueness = report.uniqueness_score,
            degraded,
            "item analyzed"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_analyze(
                item_id,
                latency,
                report.exact_duplicates.len(),
                report.similar_items.len(),
                degraded,
            );
        }
        Ok(report)
    }

    /// Normalize, fingerprint, and persist one item without analyzing it.
    ///
    /// This is the refresh path triggered when an item's text changes and
    /// the caller does not need a report back.
    pub fn fingerprint_item(
        &self,
        item_id: &str,
        raw_content: &str,
    ) -> Result<Fingerprint, DetectError> {
        if item_id.trim().is_empty() {
            return Err(DetectError::InvalidOptions(
                "item_id must not be empty".into(),
            ));
        }
        let normalized = normalize(raw_content, &self.normalize_cfg);
        let fp = generate(&normalized, &self.fingerprint_cfg)?;
        Ok(self.store.upsert(item_id, &fp)?)
    }

    /// Stored fingerprint for an item, if any.
    pub fn get_fingerprint(&self, item_id: &str) -> Result<Option<Fingerprint>, DetectError> {
        Ok(self.store.get(item_id)?)
    }

    /// Drop an item's fingerprint when the owning item is deleted.
    /// Returns whether a fingerprint existed.
    pub fn remove_item(&self, item_id: &str) -> Result<bool, DetectError> {
        Ok(self.store.delete(item_id)?)
    }

    /// Remove fingerprints whose items no longer exist. `Ok(None)` means
    /// another purge was already in flight and this call did nothing.
    pub fn purge_orphans(
        &self,
        live: &std::collections::HashSet<String>,
    ) -> Result<Option<usize>, DetectError> {
        Ok(self.store.delete_orphans(live)?)
    }

    /// Number of fingerprinted items in the corpus.
    pub fn corpus_len(&self) -> usize {
        self.store.len()
    }

    /// Direct access to the underlying store, for seeding and audits.
    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Content below the minimum analyzable length is stored but never
    /// compared; it reports as fully unique with empty match lists.
    fn short_report(&self, item_id: &str, fp: &ContentFingerprint) -> DedupReport {
        DedupReport {
            item_id: item_id.to_string(),
            content_hash: fp.content_hash.clone(),
            uniqueness_score: 100.0,
            token_count: 0,
            content_length: fp.content_length(),
            is_unique: true,
            duplicate_count: 0,
            content_preview: char_prefix(&fp.normalized_content, self.cfg.content_preview_chars),
            exact_duplicates: Vec::new(),
            similar_items: Vec::new(),
        }
    }

    fn full_report(
        &self,
        item_id: &str,
        fp: &ContentFingerprint,
        opts: &AnalyzeOptions,
        corpus: usize,
        degraded: &mut bool,
    ) -> DedupReport {
        let mut duplicate_count = 0usize;
        let mut exact_duplicates: Vec<DuplicateMatch> = Vec::new();
        if opts.include_exact {
            match self.store.find_by_hash(&fp.content_hash, Some(item_id)) {
                Ok(records) => {
                    duplicate_count = records.len();
                    exact_duplicates = records
                        .into_iter()
                        .take(opts.limit)
                        .map(|record| DuplicateMatch {
                            item_id: record.item_id,
                            similarity_score: 1.0,
                            preview: Some(char_prefix(
                                &record.normalized_content,
                                self.cfg.match_preview_chars,
                            )),
                        })
                        .collect();
                }
                Err(e) => {
                    *degraded = true;
                    warn!(error = %e, "exact duplicate lookup failed");
                }
            }
        }
        let exact_ids: HashSet<&str> = exact_duplicates
            .iter()
            .map(|m| m.item_id.as_str())
            .collect();

        // One scan serves both the uniqueness score and the ranked list.
        let mut near_count: Option<usize> = None;
        let mut similar_items: Vec<DuplicateMatch> = Vec::new();
        match scan_candidates(&fp.similarity_tokens, self.store.as_ref(), item_id) {
            Ok(hits) => {
                near_count = Some(
                    hits.iter()
                        .filter(|hit| hit.score >= self.cfg.uniqueness_threshold)
                        .count(),
                );
                if opts.include_similar {
                    let pool: Vec<ScoredCandidate> = hits
                        .into_iter()
                        .filter(|hit| !exact_ids.contains(hit.item_id.as_str()))
                        .collect();
                    similar_items = rank(pool, opts.threshold, opts.limit)
                        .into_iter()
                        .map(|hit| {
                            let preview = self.match_preview(&hit.item_id);
                            DuplicateMatch {
                                item_id: hit.item_id,
                                similarity_score: round3(hit.score),
                                preview,
                            }
                        })
                        .collect();
                }
            }
            Err(e) => {
                *degraded = true;
                warn!(error = %e, "similarity scan failed, uniqueness not computed");
            }
        }
        drop(exact_ids);

        // A failed scan reports full uniqueness rather than failing the
        // analysis; the caller sees the degradation only in logs and metrics.
        let uniqueness_score = if corpus <= 1 {
            100.0
        } else {
            match near_count {
                Some(near) => {
                    let others = (corpus - 1) as f64;
                    round2(((1.0 - near as f64 / others) * 100.0).clamp(0.0, 100.0))
                }
                None => 100.0,
            }
        };

        DedupReport {
            item_id: item_id.to_string(),
            content_hash: fp.content_hash.clone(),
            uniqueness_score,
            token_count: fp.token_count(),
            content_length: fp.content_length(),
            is_unique: duplicate_count == 0,
            duplicate_count,
            content_preview: char_prefix(&fp.normalized_content, self.cfg.content_preview_chars),
            exact_duplicates,
            similar_items,
        }
    }

    /// Best effort: a record deleted between the scan and this lookup
    /// simply loses its preview.
    fn match_preview(&self, item_id: &str) -> Option<String> {
        self.store
            .get(item_id)
            .ok()
            .flatten()
            .map(|record| char_prefix(&record.normalized_content, self.cfg.match_preview_chars))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
