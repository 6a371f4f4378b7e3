use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;

use crate::charset;
use crate::config::NormalizeConfig;

/// Main entry point. Transforms raw item text into its canonical comparison
/// form.
///
/// The transformation is a pure function of `(input, cfg)`: no I/O, no
/// locale, no clock. It never fails; empty or all-noise input simply
/// produces an empty string. Output is idempotent:
/// `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(input: &str, cfg: &NormalizeConfig) -> String {
    // Unicode composition first, since it can change character boundaries.
    // Cow avoids the allocation when composition is disabled.
    let text: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(input.nfc().collect::<String>())
    } else {
        Cow::Borrowed(input)
    };

    let mut out = String::with_capacity(text.len());
    // Whitespace runs collapse to one pending space, emitted lazily before
    // the next kept character. Deletions (diacritics, punctuation) bypass
    // the flag entirely, so they glue their neighbors together instead of
    // leaving a double space behind.
    let mut pending_space = false;
    for ch in text.chars() {
        dispatch_char(ch, cfg, &mut out, &mut pending_space);
    }
    // A trailing pending space is never emitted, which also trims the end.
    out
}

/// Decode bytes as UTF-8 (lossily, invalid sequences become U+FFFD) and
/// normalize the result. Raw item text arrives from storage as bytes;
/// malformed input degrades instead of failing.
pub fn normalize_bytes(input: &[u8], cfg: &NormalizeConfig) -> String {
    normalize(&String::from_utf8_lossy(input), cfg)
}

/// Decides what happens to a single character: deletion, whitespace
/// collapsing, or emission (with digit unification and lowercasing applied).
fn dispatch_char(ch: char, cfg: &NormalizeConfig, out: &mut String, pending_space: &mut bool) {
    if charset::is_arabic_diacritic(ch) {
        return;
    }
    if cfg.strip_punctuation && charset::is_stripped_punctuation(ch) {
        return;
    }
    if ch.is_whitespace() {
        // Leading whitespace never sets the flag, which trims the start.
        if !out.is_empty() {
            *pending_space = true;
        }
        return;
    }

    let ch = if cfg.unify_digits {
        charset::unify_digit(ch)
    } else {
        ch
    };

    if cfg.lowercase {
        // Lowercasing can expand one character into several.
        for lower in ch.to_lowercase() {
            append_char(lower, out, pending_space);
        }
    } else {
        append_char(ch, out, pending_space);
    }
}

fn append_char(ch: char, out: &mut String, pending_space: &mut bool) {
    if *pending_space {
        out.push(' ');
        *pending_space = false;
    }
    out.push(ch);
}
