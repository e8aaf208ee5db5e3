//! The analytics service facade.
//!
//! Explicitly constructed by the process entry point and passed by reference
//! to callers (the API layer, the scheduler) — no lazily-initialized global
//! state. Models are loaded once and shared read-only behind `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info};

use pulsefit_ai::{SeasonalForecaster, SentimentModel};
use pulsefit_analytics::forecast::summarize;
use pulsefit_analytics::staleness;
use pulsefit_analytics::{
    DEFAULT_HORIZON, FeedbackStore, ForecastPipeline, ForecastStore, ForecastSummary,
    MODEL_VERSION, PipelineError, ProfitStore, SentimentClassificationJob, StoreError,
    WordFrequencyStore,
};
use pulsefit_core::SentimentLabel;
use pulsefit_text::DEFAULT_TOP_N;

/// Tunables for the service. Defaults match the production deployment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How many future months a forecast generation covers.
    pub forecast_horizon: usize,
    /// Size of each per-sentiment top word list.
    pub top_words: usize,
    /// Version tag stamped on generated forecasts.
    pub model_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            forecast_horizon: DEFAULT_HORIZON,
            top_words: DEFAULT_TOP_N,
            model_version: MODEL_VERSION.to_string(),
        }
    }
}

/// One forecast row as the API layer reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub forecast_date: NaiveDate,
    pub predicted_net_profit: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub interval_width: f64,
}

/// One word-frequency row as the API layer reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCountView {
    pub word: String,
    pub frequency: u64,
}

/// Facade over the two pipelines. Everything here is callable concurrently;
/// the classification family and the forecast family touch disjoint tables.
pub struct AnalyticsService {
    feedback: Arc<dyn FeedbackStore>,
    word_frequencies: Arc<dyn WordFrequencyStore>,
    profits: Arc<dyn ProfitStore>,
    forecasts: Arc<dyn ForecastStore>,
    sentiment_model: Arc<dyn SentimentModel>,
    forecast_engine: Arc<dyn SeasonalForecaster>,
    config: ServiceConfig,
}

impl AnalyticsService {
    pub fn new(
        feedback: Arc<dyn FeedbackStore>,
        word_frequencies: Arc<dyn WordFrequencyStore>,
        profits: Arc<dyn ProfitStore>,
        forecasts: Arc<dyn ForecastStore>,
        sentiment_model: Arc<dyn SentimentModel>,
        forecast_engine: Arc<dyn SeasonalForecaster>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            feedback,
            word_frequencies,
            profits,
            forecasts,
            sentiment_model,
            forecast_engine,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Classify pending feedback and refresh the word-frequency aggregate.
    /// Returns the number of records processed (0 when nothing was pending).
    pub fn run_classification_cycle(&self) -> Result<usize, PipelineError> {
        let job = SentimentClassificationJob::new(
            self.feedback.as_ref(),
            self.word_frequencies.as_ref(),
            self.sentiment_model.as_ref(),
            self.config.top_words,
        );
        Ok(job.run()?.processed)
    }

    /// Generate and store a fresh forecast set.
    ///
    /// With `force_update` unset the staleness policy is consulted first; a
    /// still-fresh forecast set is summarized and returned without
    /// regeneration.
    pub fn run_forecast_cycle(
        &self,
        periods: usize,
        force_update: bool,
    ) -> Result<ForecastSummary, PipelineError> {
        if !force_update {
            let current = self.forecasts.all()?;
            let now = Utc::now();
            match staleness::evaluate(&current, now.date_naive(), now) {
                staleness::StalenessVerdict::Fresh => {
                    info!("forecasts still fresh, skipping regeneration");
                    if let Some(summary) = summarize(
                        &current,
                        current
                            .first()
                            .map(|e| e.model_version.as_str())
                            .unwrap_or(&self.config.model_version),
                        current.iter().map(|e| e.created_at).max().unwrap_or(now),
                    ) {
                        return Ok(summary);
                    }
                    // fall through: an empty set is never fresh, but be safe
                }
                staleness::StalenessVerdict::Regenerate(reason) => {
                    info!(?reason, "forecasts stale, regenerating");
                }
            }
        }

        let pipeline = ForecastPipeline::new(
            self.profits.as_ref(),
            self.forecasts.as_ref(),
            self.forecast_engine.as_ref(),
            &self.config.model_version,
        );
        pipeline.run(periods)
    }

    /// The current forecast set, ordered by date.
    pub fn current_forecasts(&self) -> Result<Vec<ForecastView>, StoreError> {
        let mut entries = self.forecasts.all()?;
        entries.sort_by_key(|e| e.forecast_date);
        Ok(entries
            .into_iter()
            .map(|e| ForecastView {
                forecast_date: e.forecast_date,
                predicted_net_profit: e.predicted_net_profit,
                lower_bound: e.lower_bound,
                upper_bound: e.upper_bound,
                interval_width: e.interval_width(),
            })
            .collect())
    }

    /// The word-frequency aggregate grouped per analyzed label.
    pub fn word_frequencies(
        &self,
    ) -> Result<BTreeMap<SentimentLabel, Vec<WordCountView>>, StoreError> {
        let mut grouped: BTreeMap<SentimentLabel, Vec<WordCountView>> = SentimentLabel::ANALYZED
            .iter()
            .map(|label| (*label, Vec::new()))
            .collect();

        for entry in self.word_frequencies.all()? {
            if let Some(bucket) = grouped.get_mut(&entry.sentiment) {
                bucket.push(WordCountView {
                    word: entry.word,
                    frequency: entry.count,
                });
            }
        }

        for bucket in grouped.values_mut() {
            bucket.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        }
        Ok(grouped)
    }

    /// Startup seeding: regenerate unless enough future forecasts exist.
    ///
    /// Logs failures instead of propagating them — a broken forecast path
    /// must not block service startup.
    pub fn startup_check(&self) {
        let today = Utc::now().date_naive();
        match self.forecasts.all() {
            Ok(current) => {
                if !staleness::startup_needs_seed(&current, today) {
                    info!(
                        existing = current.len(),
                        "enough future forecasts, skipping initial generation"
                    );
                    return;
                }
                info!("seeding initial forecasts");
                match self.run_forecast_cycle(self.config.forecast_horizon, true) {
                    Ok(summary) => {
                        info!(
                            count = summary.total_forecasts,
                            avg = summary.avg_predicted_profit,
                            "initial forecasts generated"
                        );
                        if summary.avg_predicted_profit < 0.0 {
                            tracing::warn!(
                                "initial forecasts predict negative mean profit; recent \
                                 periods may contain anomalies"
                            );
                        }
                    }
                    Err(e) => error!(error = %e, "initial forecast generation failed"),
                }
            }
            Err(e) => error!(error = %e, "could not inspect stored forecasts at startup"),
        }
    }
}
