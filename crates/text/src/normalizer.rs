//! Canonical text normalization for customer feedback.
//!
//! The exact same function runs at training time and at inference time.
//! Divergence between the two silently degrades classifier accuracy, which
//! is why this lives in its own dependency-light crate instead of next to
//! the model code.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Ordered slang/filler substitution table, applied after lower-casing and
/// diacritic stripping (patterns are ascii). Deletion rules map laughter and
/// interjection tokens to the empty string. Rule outputs never re-match any
/// rule, which keeps `normalize` idempotent.
const SLANG_TABLE: &[(&str, &str)] = &[
    // laughter runs
    (r"\bk{2,}\b", ""),
    (r"\b(?:rs){2,}\b", ""),
    (r"\b(?:ha){2,}h?\b", ""),
    (r"\b(?:he){2,}h?\b", ""),
    // interjections with no sentiment signal
    (r"\baff+\b", ""),
    (r"\beita\b", ""),
    // chat shorthand
    (r"\bvc\b", "voce"),
    (r"\bvcs\b", "voces"),
    (r"\bpq\b", "porque"),
    (r"\btbm?\b", "tambem"),
    (r"\bmto?\b", "muito"),
    (r"\bblz\b", "beleza"),
    (r"\bq\b", "que"),
    (r"\bn\b", "nao"),
    (r"\beh\b", "e"),
    (r"\bhj\b", "hoje"),
    (r"\bmsm\b", "mesmo"),
    (r"\bq(?:d|nd)o?\b", "quando"),
    (r"\baki\b", "aqui"),
];

static SLANG_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SLANG_TABLE
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("slang rule pattern must compile"),
                *replacement,
            )
        })
        .collect()
});

/// A run of sentence punctuation collapses to its first character.
static PUNCT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])[.!?]+").expect("punctuation pattern must compile"));

/// Standalone digit tokens. Digits glued to letters ("24h") are not matched
/// because there is no word boundary between a digit and a letter.
static LONE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]+\b").expect("digit pattern must compile"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// Canonicalize a raw feedback text. Total: always returns a string.
///
/// Steps, in order: lower-case; strip diacritics (NFD, drop combining
/// marks); apply the slang table; strip standalone digit tokens; collapse
/// repeated `.`/`!`/`?` runs; collapse whitespace; trim.
///
/// Digits are stripped before punctuation runs are collapsed: removing the
/// digits from "1.2.3" leaves "..", which the punctuation pass then reduces,
/// so one pass already reaches the fixed point.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut text: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();

    for (rule, replacement) in SLANG_RULES.iter() {
        text = rule.replace_all(&text, *replacement).into_owned();
    }

    let text = LONE_DIGITS.replace_all(&text, "");
    let text = PUNCT_RUNS.replace_all(&text, "$1");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}
