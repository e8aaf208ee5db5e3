//! `pulsefit-analytics` — the two batch pipelines and their policies.
//!
//! Sentiment side: [`classify`] labels pending feedback and triggers the
//! word-frequency rebuild in [`aggregate`]. Profit side: [`forecast`] runs
//! fetch → validate → train → predict → replace → report, with outlier
//! smoothing in [`outliers`] and regeneration decisions in [`staleness`].
//!
//! Storage stays behind the narrow traits in [`store`]; pipelines never see
//! a concrete database.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod forecast;
pub mod outliers;
pub mod staleness;
pub mod store;

pub use classify::{ClassificationReport, SentimentClassificationJob};
pub use error::PipelineError;
pub use forecast::{DEFAULT_HORIZON, ForecastPipeline, ForecastSummary, MODEL_VERSION};
pub use staleness::{StalenessReason, StalenessVerdict};
pub use store::{
    FeedbackStore, ForecastStore, LabelUpdate, ProfitStore, StoreError, WordFrequencyStore,
};
