//! Storage capability traits consumed by the pipelines.
//!
//! The persistent store is an external collaborator; these traits describe
//! exactly the reads and writes the pipelines need and nothing more. Every
//! write method is one logical transaction: it either commits completely or
//! leaves the stored state untouched.

use pulsefit_core::{FeedbackId, FeedbackRecord, ForecastEntry, ProfitRecord, SentimentLabel, WordFrequencyEntry};
use thiserror::Error;

/// Storage failure. Always means the attempted write was rolled back.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// One classification result to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelUpdate {
    pub id: FeedbackId,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
}

/// Feedback reads and the single write the classification job performs.
pub trait FeedbackStore: Send + Sync {
    /// All records still carrying the unresolved label.
    fn unresolved(&self) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Raw texts of all records currently carrying `label`.
    fn texts_by_label(&self, label: SentimentLabel) -> Result<Vec<String>, StoreError>;

    /// Persist label + confidence for a batch of records in one commit.
    fn commit_labels(&self, updates: &[LabelUpdate]) -> Result<(), StoreError>;
}

/// The word-frequency aggregate, owned wholesale by the aggregation cycle.
pub trait WordFrequencyStore: Send + Sync {
    fn all(&self) -> Result<Vec<WordFrequencyEntry>, StoreError>;

    /// Truncate the table and insert `entries` as one atomic swap.
    fn replace_all(&self, entries: Vec<WordFrequencyEntry>) -> Result<(), StoreError>;
}

/// Historical profit records, read-only to the pipelines.
pub trait ProfitStore: Send + Sync {
    /// All records ordered by period start.
    fn all_ordered(&self) -> Result<Vec<ProfitRecord>, StoreError>;
}

/// The forecast table, owned wholesale by the forecast pipeline.
pub trait ForecastStore: Send + Sync {
    fn all(&self) -> Result<Vec<ForecastEntry>, StoreError>;

    /// Delete every existing row and insert `entries`, all-or-nothing. On
    /// error the previously stored set must remain fully intact.
    fn replace_all(&self, entries: Vec<ForecastEntry>) -> Result<(), StoreError>;
}
