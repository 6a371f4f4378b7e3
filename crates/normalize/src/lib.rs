//! # Item Normalize
//!
//! Arabic-aware text normalization for exam item deduplication. This crate
//! turns raw authored text into a canonical comparison form so that
//! fingerprinting and similarity scoring downstream see past formatting
//! noise: diacritics, punctuation, whitespace layout, digit script, and
//! letter case.
//!
//! The pipeline, in order:
//!
//! 1. Unicode NFC composition
//! 2. Arabic diacritic (tashkeel) removal
//! 3. Fixed punctuation removal, preserving mathematical operators
//! 4. Whitespace collapsing to single spaces, with trimming
//! 5. ASCII→Arabic-Indic digit unification
//! 6. Unicode lowercasing
//!
//! Steps 2–6 run in a single pass; deleted characters glue their neighbors
//! together rather than leaving spaces behind, which keeps the output
//! idempotent.
//!
//! ## Example
//!
//! ```rust
//! use normalize::{normalize, NormalizeConfig};
//!
//! let cfg = NormalizeConfig::default();
//! assert_eq!(normalize("مَا هُوَ النَّاتِجُ؟", &cfg), "ما هو الناتج");
//! assert_eq!(normalize("  2x  +  5  ", &cfg), "٢x + ٥");
//! ```

pub mod charset;
mod config;
mod pipeline;

pub use config::{NormalizeConfig, NormalizeError};
pub use pipeline::{normalize, normalize_bytes};
