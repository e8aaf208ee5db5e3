//! Sentiment labels and the classifier-output mapping.

use serde::{Deserialize, Serialize};

/// Closed set of sentiment labels.
///
/// `Unresolved` marks feedback that has not been through the classification
/// job yet. Classified rows only ever carry one of the three analyzed labels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unresolved,
}

impl SentimentLabel {
    /// Every label, in aggregation order. The aggregation cycle iterates all
    /// of these, including `Unresolved` (normally empty after a cycle).
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Unresolved,
    ];

    /// The labels the classifier can assign.
    pub const ANALYZED: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Unresolved => "unresolved",
        }
    }

    /// Map a raw classifier output string onto the closed label set.
    ///
    /// Trims whitespace and surrounding quotes, matches case-insensitively.
    /// Returns `None` for anything outside {positive, negative, neutral};
    /// the caller decides the fallback (the classification job falls back to
    /// `Neutral` with a warning).
    pub fn from_model_output(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        if cleaned.eq_ignore_ascii_case("positive") {
            Some(SentimentLabel::Positive)
        } else if cleaned.eq_ignore_ascii_case("negative") {
            Some(SentimentLabel::Negative)
        } else if cleaned.eq_ignore_ascii_case("neutral") {
            Some(SentimentLabel::Neutral)
        } else {
            None
        }
    }
}

impl core::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_plain_labels() {
        assert_eq!(
            SentimentLabel::from_model_output("positive"),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(
            SentimentLabel::from_model_output("negative"),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(
            SentimentLabel::from_model_output("neutral"),
            Some(SentimentLabel::Neutral)
        );
    }

    #[test]
    fn strips_quotes_and_case() {
        // Some model artifacts serialize labels with surrounding quotes.
        assert_eq!(
            SentimentLabel::from_model_output("\"POSITIVE\""),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(
            SentimentLabel::from_model_output("  'Negative' "),
            Some(SentimentLabel::Negative)
        );
    }

    #[test]
    fn unknown_labels_are_none() {
        assert_eq!(SentimentLabel::from_model_output("bullish"), None);
        assert_eq!(SentimentLabel::from_model_output(""), None);
        assert_eq!(SentimentLabel::from_model_output("unresolved"), None);
    }
}
