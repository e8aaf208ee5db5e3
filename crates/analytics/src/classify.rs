//! Sentiment classification job.
//!
//! Labels every unresolved feedback record in one batch, commits the labels
//! in one transaction, and triggers the word-frequency rebuild — but only
//! when this run actually classified something.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use pulsefit_ai::{ModelError, SentimentModel};
use pulsefit_core::SentimentLabel;
use pulsefit_text::normalize;

use crate::aggregate::rebuild_word_frequencies;
use crate::error::PipelineError;
use crate::store::{FeedbackStore, LabelUpdate, WordFrequencyStore};

/// Outcome of one classification run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub processed: usize,
    pub label_counts: BTreeMap<SentimentLabel, usize>,
    pub mean_confidence: f64,
}

impl ClassificationReport {
    fn empty() -> Self {
        Self {
            processed: 0,
            label_counts: BTreeMap::new(),
            mean_confidence: 0.0,
        }
    }
}

/// The classification job. Construct per run; stores and model are shared.
pub struct SentimentClassificationJob<'a> {
    feedback: &'a dyn FeedbackStore,
    word_frequencies: &'a dyn WordFrequencyStore,
    model: &'a dyn SentimentModel,
    top_n: usize,
}

impl<'a> SentimentClassificationJob<'a> {
    pub fn new(
        feedback: &'a dyn FeedbackStore,
        word_frequencies: &'a dyn WordFrequencyStore,
        model: &'a dyn SentimentModel,
        top_n: usize,
    ) -> Self {
        Self {
            feedback,
            word_frequencies,
            model,
            top_n,
        }
    }

    /// Run one cycle. Returns a zero report (and skips aggregation entirely)
    /// when there is nothing unresolved.
    pub fn run(&self) -> Result<ClassificationReport, PipelineError> {
        let pending = self.feedback.unresolved()?;
        if pending.is_empty() {
            debug!("no pending feedback, word frequencies kept as-is");
            return Ok(ClassificationReport::empty());
        }

        info!(count = pending.len(), "classifying pending feedback");

        let texts: Vec<String> = pending.iter().map(|f| normalize(&f.raw_text)).collect();
        let predictions = self.model.predict_batch(&texts)?;
        if predictions.len() != pending.len() {
            return Err(ModelError::Inference(format!(
                "expected {} predictions, got {}",
                pending.len(),
                predictions.len()
            ))
            .into());
        }

        let mut updates = Vec::with_capacity(pending.len());
        let mut label_counts: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
        let mut confidence_sum = 0.0;

        for (record, prediction) in pending.iter().zip(&predictions) {
            let sentiment = match SentimentLabel::from_model_output(&prediction.label) {
                Some(label) => label,
                None => {
                    warn!(
                        feedback = %record.id,
                        raw_label = %prediction.label,
                        "unknown classifier label, falling back to neutral"
                    );
                    SentimentLabel::Neutral
                }
            };

            *label_counts.entry(sentiment).or_default() += 1;
            confidence_sum += prediction.confidence;
            updates.push(LabelUpdate {
                id: record.id,
                sentiment,
                confidence: prediction.confidence,
            });
        }

        // One commit for the whole batch.
        self.feedback.commit_labels(&updates)?;

        let mean_confidence = confidence_sum / updates.len() as f64;
        for (label, count) in &label_counts {
            info!(label = %label, count, "classified");
        }
        info!(
            processed = updates.len(),
            mean_confidence,
            "classification cycle committed"
        );

        // At least one record was classified, so the aggregate is stale.
        rebuild_word_frequencies(self.feedback, self.word_frequencies, self.top_n)?;

        Ok(ClassificationReport {
            processed: updates.len(),
            label_counts,
            mean_confidence,
        })
    }
}
