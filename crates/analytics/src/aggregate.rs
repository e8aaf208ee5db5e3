//! Word-frequency aggregation cycle.
//!
//! Recomputes the per-sentiment top-N word lists from the currently labeled
//! feedback and swaps the whole aggregate table in one transactional
//! replace. Rows from two different generations are never visible together.

use chrono::Utc;
use tracing::{debug, info};

use pulsefit_core::{SentimentLabel, WordFrequencyEntry};
use pulsefit_text::most_common_words;

use crate::error::PipelineError;
use crate::store::{FeedbackStore, WordFrequencyStore};

/// Rebuild the aggregate for every label in one staged swap.
///
/// Labels with no texts simply contribute no rows (`Unresolved` is normally
/// empty right after a classification run).
pub fn rebuild_word_frequencies(
    feedback: &dyn FeedbackStore,
    word_frequencies: &dyn WordFrequencyStore,
    top_n: usize,
) -> Result<(), PipelineError> {
    info!("recomputing word frequencies");
    let generation = Utc::now();
    let mut staged = Vec::new();

    for label in SentimentLabel::ALL {
        let texts = feedback.texts_by_label(label)?;
        if texts.is_empty() {
            debug!(label = %label, "no texts for label");
            continue;
        }

        let top = most_common_words(&texts, top_n);
        debug!(label = %label, words = top.len(), "aggregated label");
        for (word, count) in top {
            staged.push(WordFrequencyEntry::new(word, label, count, generation));
        }
    }

    // Truncate-and-rebuild as a single swap; an error here leaves the
    // previous generation in place.
    word_frequencies.replace_all(staged)?;
    info!("word-frequency table rebuilt");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LabelUpdate, StoreError};
    use pulsefit_core::FeedbackRecord;
    use std::sync::RwLock;

    struct FixedFeedback {
        positive: Vec<String>,
        negative: Vec<String>,
    }

    impl FeedbackStore for FixedFeedback {
        fn unresolved(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
            Ok(Vec::new())
        }

        fn texts_by_label(&self, label: SentimentLabel) -> Result<Vec<String>, StoreError> {
            Ok(match label {
                SentimentLabel::Positive => self.positive.clone(),
                SentimentLabel::Negative => self.negative.clone(),
                _ => Vec::new(),
            })
        }

        fn commit_labels(&self, _updates: &[LabelUpdate]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemWords {
        rows: RwLock<Vec<WordFrequencyEntry>>,
    }

    impl WordFrequencyStore for MemWords {
        fn all(&self) -> Result<Vec<WordFrequencyEntry>, StoreError> {
            Ok(self.rows.read().unwrap().clone())
        }

        fn replace_all(&self, entries: Vec<WordFrequencyEntry>) -> Result<(), StoreError> {
            *self.rows.write().unwrap() = entries;
            Ok(())
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rebuild_replaces_previous_generation() {
        let words = MemWords::default();
        let first = FixedFeedback {
            positive: texts(&["piscina limpa", "piscina aquecida"]),
            negative: Vec::new(),
        };
        rebuild_word_frequencies(&first, &words, 10).unwrap();
        assert!(words.all().unwrap().iter().any(|e| e.word == "piscina"));

        let second = FixedFeedback {
            positive: texts(&["professor atencioso"]),
            negative: texts(&["vestiario sujo"]),
        };
        rebuild_word_frequencies(&second, &words, 10).unwrap();

        let entries = words.all().unwrap();
        // old generation fully gone
        assert!(entries.iter().all(|e| e.word != "piscina"));
        assert!(entries.iter().any(|e| e.word == "professor"));
        assert!(
            entries
                .iter()
                .any(|e| e.word == "vestiario" && e.sentiment == SentimentLabel::Negative)
        );
    }

    #[test]
    fn identical_inputs_give_identical_ordered_output() {
        let feedback = FixedFeedback {
            positive: texts(&["spinning otimo", "spinning lotado", "aula boa"]),
            negative: Vec::new(),
        };

        let words_a = MemWords::default();
        let words_b = MemWords::default();
        rebuild_word_frequencies(&feedback, &words_a, 10).unwrap();
        rebuild_word_frequencies(&feedback, &words_b, 10).unwrap();

        let strip = |entries: Vec<WordFrequencyEntry>| -> Vec<(String, SentimentLabel, u64)> {
            entries
                .into_iter()
                .map(|e| (e.word, e.sentiment, e.count))
                .collect()
        };
        assert_eq!(strip(words_a.all().unwrap()), strip(words_b.all().unwrap()));
    }

    #[test]
    fn empty_labels_contribute_nothing() {
        let feedback = FixedFeedback {
            positive: Vec::new(),
            negative: Vec::new(),
        };
        let words = MemWords::default();
        rebuild_word_frequencies(&feedback, &words, 10).unwrap();
        assert!(words.all().unwrap().is_empty());
    }
}
