//! Record types shared by the feedback and forecasting pipelines.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{FeedbackId, ForecastId, WordEntryId};
use crate::sentiment::SentimentLabel;

/// A single piece of free-text customer feedback.
///
/// Created by the intake path; the classification job is the only writer of
/// `sentiment` and `confidence`. Rows are never deleted by the pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    pub raw_text: String,
    pub sentiment: SentimentLabel,
    /// Top-class probability reported by the classifier; 0.0 until classified.
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    /// A fresh, unclassified feedback record.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            id: FeedbackId::new(),
            raw_text: raw_text.into(),
            sentiment: SentimentLabel::Unresolved,
            confidence: 0.0,
            created_at: Utc::now(),
        }
    }
}

/// One row of the per-sentiment word-frequency aggregate.
///
/// Fully owned by the aggregation cycle: the whole set is truncated and
/// rebuilt atomically each run, so rows from different generations are never
/// visible together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequencyEntry {
    pub id: WordEntryId,
    pub word: String,
    pub sentiment: SentimentLabel,
    pub count: u64,
    pub created_at: DateTime<Utc>,
}

impl WordFrequencyEntry {
    pub fn new(
        word: impl Into<String>,
        sentiment: SentimentLabel,
        count: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: WordEntryId::new(),
            word: word.into(),
            sentiment,
            count,
            created_at,
        }
    }
}

/// One month of historical accounting results. External, read-only to core.
///
/// A non-finite `net_profit` stands for a null upstream value and is dropped
/// during forecast validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRecord {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
}

/// One forecasted month. Owned by the forecast pipeline; replaced wholesale
/// per generation, at most one row per date per model version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub id: ForecastId,
    pub forecast_date: NaiveDate,
    pub predicted_net_profit: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

impl ForecastEntry {
    pub fn new(
        forecast_date: NaiveDate,
        predicted_net_profit: f64,
        lower_bound: f64,
        upper_bound: f64,
        model_version: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ForecastId::new(),
            forecast_date,
            predicted_net_profit,
            lower_bound,
            upper_bound,
            model_version: model_version.into(),
            created_at,
        }
    }

    /// Width of the uncertainty interval.
    pub fn interval_width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }
}
