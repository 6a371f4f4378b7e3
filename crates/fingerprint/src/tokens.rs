//! Similarity token extraction.
//!
//! Tokens are the unit of near-duplicate comparison: the Jaccard overlap of
//! two items' token sets is their similarity score. Each item contributes
//! two token families over its normalized text:
//!
//! - **character trigrams** (codepoint windows, step 1), which survive word
//!   reordering and small edits, and
//! - **whole words** of at least two characters, which anchor the score to
//!   actual vocabulary.
//!
//! The combined list is deduplicated in first-seen order. Content shorter
//! than the configured minimum produces no tokens at all, keeping trivially
//! short stems ("صح أم خطأ") from matching everything. Above the cap, the
//! most frequent tokens are kept, ties broken by first occurrence, so the
//! result is deterministic for a given input.

use hashbrown::HashMap;

use crate::config::{FingerprintConfig, MIN_WORD_CHARS};

/// Extract the deduplicated similarity token list for normalized text.
pub(crate) fn similarity_tokens(normalized: &str, cfg: &FingerprintConfig) -> Vec<String> {
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() < cfg.min_content_length {
        return Vec::new();
    }

    let mut raw: Vec<String> = Vec::with_capacity(chars.len());

    if chars.len() >= cfg.ngram_size {
        for window in chars.windows(cfg.ngram_size) {
            // Windows of pure whitespace carry no signal.
            if window.iter().all(|c| c.is_whitespace()) {
                continue;
            }
            raw.push(window.iter().collect());
        }
    }

    for word in normalized.split_whitespace() {
        if word.chars().count() >= MIN_WORD_CHARS {
            raw.push(word.to_string());
        }
    }

    dedupe_and_cap(raw, cfg.max_tokens)
}

/// Deduplicate tokens preserving first-seen order; over the cap, keep the
/// most frequent tokens with ties broken by first occurrence.
fn dedupe_and_cap(raw: Vec<String>, max_tokens: usize) -> Vec<String> {
    // token -> (occurrence count, index of first occurrence)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::with_capacity(raw.len());
    for (idx, token) in raw.into_iter().enumerate() {
        counts.entry(token).or_insert((0, idx)).0 += 1;
    }

    let mut tokens: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();

    if tokens.len() > max_tokens {
        tokens.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
        tokens.truncate(max_tokens);
    } else {
        tokens.sort_unstable_by_key(|t| t.2);
    }

    tokens.into_iter().map(|(token, _, _)| token).collect()
}
