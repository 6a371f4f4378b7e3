//! Jaccard scoring and candidate ranking for near-duplicate search.
//!
//! The scan is a single O(n) pass over the candidate pool. The pool itself
//! sits behind [`CandidatePool`] so a bucketed or MinHash-narrowed source
//! can replace the full-store walk without touching any caller.

use std::cmp::Ordering;
use std::hash::Hash;

use hashbrown::HashSet;
use store::{Fingerprint, FingerprintStore, StoreError};

/// Jaccard similarity between two sets: `|A ∩ B| / |A ∪ B|`.
///
/// Two empty sets are treated as identical (1.0); an empty set shares
/// nothing with a non-empty one (0.0).
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Jaccard similarity between a prepared query set and a stored token list.
///
/// Stored token lists are deduplicated at fingerprint time, so the union
/// size follows from the two lengths without building a second set.
pub fn jaccard_tokens(query: &HashSet<&str>, candidate: &[String]) -> f64 {
    if query.is_empty() && candidate.is_empty() {
        return 1.0;
    }
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    let intersection = candidate
        .iter()
        .filter(|token| query.contains(token.as_str()))
        .count();
    let union = query.len() + candidate.len() - intersection;
    intersection as f64 / union as f64
}

/// Source of comparison candidates for a similarity scan.
///
/// The store implementation walks every record with a non-empty token set;
/// alternative pools may use `query_tokens` to prune the walk.
pub trait CandidatePool {
    fn for_each_candidate(
        &self,
        query_tokens: &[String],
        exclude: &str,
        visit: &mut dyn FnMut(&Fingerprint),
    ) -> Result<(), StoreError>;
}

impl CandidatePool for FingerprintStore {
    fn for_each_candidate(
        &self,
        _query_tokens: &[String],
        exclude: &str,
        visit: &mut dyn FnMut(&Fingerprint),
    ) -> Result<(), StoreError> {
        FingerprintStore::for_each_candidate(self, exclude, visit)
    }
}

/// A candidate that shared at least one token with the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub item_id: String,
    pub score: f64,
    /// Insertion sequence of the candidate, used for deterministic tie-breaks.
    pub seq: u64,
}

/// Score every pool candidate against `tokens` in one pass.
///
/// Returns candidates with a non-zero score, unordered. One scan serves
/// both the uniqueness computation and the ranked match list.
pub fn scan_candidates(
    tokens: &[String],
    pool: &dyn CandidatePool,
    exclude: &str,
) -> Result<Vec<ScoredCandidate>, StoreError> {
    let query: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    let mut hits = Vec::new();
    pool.for_each_candidate(tokens, exclude, &mut |record| {
        let score = jaccard_tokens(&query, &record.similarity_tokens);
        if score > 0.0 {
            hits.push(ScoredCandidate {
                item_id: record.item_id.clone(),
                score,
                seq: record.seq,
            });
        }
    })?;
    Ok(hits)
}

/// Keep hits at or above `threshold`, order best first (score ties resolved
/// oldest first), and truncate to `limit`.
pub fn rank(mut hits: Vec<ScoredCandidate>, threshold: f64, limit: usize) -> Vec<ScoredCandidate> {
    hits.retain(|hit| hit.score >= threshold);
    hits.sort_unstable_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.seq.cmp(&b.seq))
    });
    hits.truncate(limit);
    hits
}

/// Scan the pool and return the ranked matches at or above `threshold`.
pub fn find_similar(
    tokens: &[String],
    pool: &dyn CandidatePool,
    exclude: &str,
    threshold: f64,
    limit: usize,
) -> Result<Vec<ScoredCandidate>, StoreError> {
    Ok(rank(scan_candidates(tokens, pool, exclude)?, threshold, limit))
}
