//! `pulsefit-ai` — trained-model capability interfaces and engines.
//!
//! The pipelines only ever see the traits in [`model`]; the concrete
//! implementations here (a linear sentiment classifier loaded from a JSON
//! artifact, a trend + seasonal forecasting engine) can be swapped for any
//! other statistical backend without touching pipeline logic.

pub mod error;
pub mod linear;
pub mod model;
pub mod seasonal;

pub use error::ModelError;
pub use linear::{LinearSentimentModel, SentimentArtifact};
pub use model::{
    FittedSeasonalModel, ForecastPoint, Prediction, SeasonalComponent, SeasonalFitConfig,
    SeasonalForecaster, SentimentModel,
};
pub use seasonal::TrendSeasonalEngine;
