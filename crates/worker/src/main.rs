//! Analytics worker entry point.
//!
//! Owns the service object and the scheduler: constructs both explicitly
//! and passes them down, instead of hiding them behind lazily-initialized
//! globals. Configuration comes from the environment with sensible
//! defaults; the sentiment model artifact is required, and its absence
//! aborts startup (the classification path cannot run without it).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use pulsefit_ai::{LinearSentimentModel, TrendSeasonalEngine};
use pulsefit_infra::{
    AnalyticsService, InMemoryFeedbackStore, InMemoryForecastStore, InMemoryProfitStore,
    InMemoryWordFrequencyStore, SchedulerConfig, ServiceConfig, scheduler,
};

/// Environment-driven configuration.
#[derive(Debug, Clone)]
struct WorkerConfig {
    model_path: String,
    classify_interval: Duration,
    forecast_horizon: usize,
}

impl WorkerConfig {
    fn from_env() -> Self {
        let model_path = std::env::var("PULSEFIT_MODEL_PATH")
            .unwrap_or_else(|_| "ai_model/sentiment_model.json".to_string());
        let classify_interval = std::env::var("PULSEFIT_CLASSIFY_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));
        let forecast_horizon = std::env::var("PULSEFIT_FORECAST_HORIZON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6);

        Self {
            model_path,
            classify_interval,
            forecast_horizon,
        }
    }
}

fn main() -> anyhow::Result<()> {
    pulsefit_observability::init();

    let config = WorkerConfig::from_env();
    info!(?config, "starting analytics worker");

    // The classifier is loaded once and is fatal when missing; the forecast
    // engine is deterministic and always available.
    let sentiment_model = LinearSentimentModel::load(&config.model_path)
        .with_context(|| format!("loading sentiment model from {}", config.model_path))?;
    info!(version = sentiment_model.version(), "sentiment model loaded");

    // In-memory stores; the persistent database plugs in behind the same
    // traits once the intake services point here.
    let service = Arc::new(AnalyticsService::new(
        InMemoryFeedbackStore::arc(),
        InMemoryWordFrequencyStore::arc(),
        InMemoryProfitStore::arc(),
        InMemoryForecastStore::arc(),
        Arc::new(sentiment_model),
        Arc::new(TrendSeasonalEngine::new()),
        ServiceConfig {
            forecast_horizon: config.forecast_horizon,
            ..ServiceConfig::default()
        },
    ));

    // Self-seed forecasts before the first scheduled tick.
    service.startup_check();

    let _scheduler = scheduler::start(
        service,
        SchedulerConfig {
            classify_interval: config.classify_interval,
            ..SchedulerConfig::default()
        },
    );
    info!("scheduler running; stop the process to shut down");

    // Jobs live on their own threads; nothing to do here. In-flight runs
    // are short relative to the polling interval, so process shutdown via
    // the supervisor is safe.
    loop {
        std::thread::park();
    }
}
