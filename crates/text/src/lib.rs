//! `pulsefit-text` — deterministic text processing for feedback analysis.
//!
//! Everything here is pure and total: normalization, stopword filtering,
//! stemming, and word-frequency counting. The normalizer is shared between
//! model training and inference; keeping it in one place is what guarantees
//! the two sides never drift apart.

pub mod frequency;
pub mod normalizer;
pub mod stopwords;

pub use frequency::{DEFAULT_TOP_N, most_common_words, tokens};
pub use normalizer::normalize;
pub use stopwords::{filter_and_stem, is_stopword, stem};
