//! Capability interfaces for the trained models.
//!
//! Pipeline logic is written against these traits so it stays testable
//! independent of the concrete statistical engine. Implementations are
//! loaded once per process and treated as immutable afterwards; `fit`
//! therefore takes `&self` and returns a separate fitted state, which keeps
//! concurrent read-only inference safe across overlapping job runs.

use crate::error::ModelError;

/// One classifier prediction: raw label string plus top-class probability.
///
/// The label is deliberately a free string here — mapping onto the closed
/// sentiment enum (including the neutral fallback) is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

/// The trained sentiment classifier.
pub trait SentimentModel: Send + Sync {
    /// Predicted label for one text.
    fn predict(&self, text: &str) -> Result<String, ModelError>;

    /// Predicted label plus the probability of the winning class.
    fn predict_with_confidence(&self, text: &str) -> Result<Prediction, ModelError>;

    /// Batch prediction; the classification job submits whole cycles at once.
    fn predict_batch(&self, texts: &[String]) -> Result<Vec<Prediction>, ModelError> {
        texts
            .iter()
            .map(|text| self.predict_with_confidence(text))
            .collect()
    }
}

/// A cyclic component the seasonal model should fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalComponent {
    pub name: &'static str,
    /// Period in samples (12 = annual for monthly data).
    pub period: usize,
    /// Number of harmonics used to shape the component.
    pub fourier_order: usize,
    /// Relative strength; larger values shrink the component less.
    pub prior_scale: f64,
}

/// Fit-time configuration for the seasonal model.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalFitConfig {
    /// How readily the trend may change; lower is more conservative.
    pub changepoint_sensitivity: f64,
    /// Nominal coverage of the uncertainty interval, e.g. 0.90.
    pub interval_width: f64,
    /// Budget of internal trend-change points.
    pub max_changepoints: usize,
    pub seasonalities: Vec<SeasonalComponent>,
}

impl Default for SeasonalFitConfig {
    fn default() -> Self {
        Self {
            changepoint_sensitivity: 0.05,
            interval_width: 0.90,
            max_changepoints: 25,
            seasonalities: Vec::new(),
        }
    }
}

/// One forecasted step: point estimate plus uncertainty interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// The trainable seasonal regressor.
pub trait SeasonalForecaster: Send + Sync {
    /// Fit the model to a series. Raises on malformed input (fewer than two
    /// points, non-finite values).
    fn fit(
        &self,
        series: &[f64],
        config: &SeasonalFitConfig,
    ) -> Result<Box<dyn FittedSeasonalModel>, ModelError>;
}

/// Result of a successful fit.
pub trait FittedSeasonalModel: std::fmt::Debug + Send + Sync {
    /// Forecast `horizon` steps past the end of the fitted series.
    fn forecast_with_interval(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ModelError>;
}
