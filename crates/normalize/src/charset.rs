//! Character classes used by the normalization pipeline.
//!
//! The inventory is deliberately fixed rather than derived from Unicode
//! general categories: the corpus is Arabic exam content, and the set of
//! characters that carry no comparison signal is small and well known.
//! Keeping it explicit makes the behavior auditable character by character.

/// Arabic-Indic digits `٠` through `٩`, indexed by digit value.
const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Punctuation deleted during normalization.
///
/// Intentionally excludes every mathematical operator (`+ - × ÷ = < > % /`)
/// so that distinct equations normalize to distinct text.
const STRIPPED_PUNCTUATION: &[char] = &[
    '،', '؛', '؟', '!', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Returns true for the Arabic combining marks removed during normalization.
///
/// Covers the tashkeel block (tanween, harakat, shadda, sukun and the
/// superscript marks at U+064B..=U+065F), the superscript alef U+0670, and
/// the Koranic annotation range U+06D6..=U+06ED. These marks are deleted
/// outright, so `كَتَبَ` and `كتب` produce the same canonical text.
pub fn is_arabic_diacritic(ch: char) -> bool {
    matches!(
        ch,
        '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}'
    )
}

/// Returns true for characters in the fixed stripped-punctuation set.
pub fn is_stripped_punctuation(ch: char) -> bool {
    STRIPPED_PUNCTUATION.contains(&ch)
}

/// Maps an ASCII digit to its Arabic-Indic equivalent; other characters
/// pass through unchanged.
pub fn unify_digit(ch: char) -> char {
    if ch.is_ascii_digit() {
        ARABIC_INDIC_DIGITS[(ch as u8 - b'0') as usize]
    } else {
        ch
    }
}
