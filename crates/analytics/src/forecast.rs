//! Monthly net-profit forecast pipeline.
//!
//! One run walks Fetch → Validate → Train → Predict → Replace → Report.
//! Every stage before Replace is read-only; Replace swaps the whole forecast
//! table atomically, so a failed run never leaves a partially cleared table.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use pulsefit_ai::{ModelError, SeasonalComponent, SeasonalFitConfig, SeasonalForecaster};
use pulsefit_core::ForecastEntry;

use crate::error::PipelineError;
use crate::outliers::smooth_extreme_outliers;
use crate::store::{ForecastStore, ProfitStore};

/// Default forecast horizon in months.
pub const DEFAULT_HORIZON: usize = 6;

/// Version tag stamped on every generated forecast row.
pub const MODEL_VERSION: &str = "v2.0";

/// History size at and below which the conservative fit profile applies.
const SMALL_HISTORY: usize = 6;

/// Minimum history for the half-year seasonal component.
const HALF_YEAR_MIN_POINTS: usize = 12;

/// Summary returned to the caller after a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub total_forecasts: usize,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub avg_predicted_profit: f64,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

/// The forecast pipeline. Construct per run; stores and engine are shared.
pub struct ForecastPipeline<'a> {
    profits: &'a dyn ProfitStore,
    forecasts: &'a dyn ForecastStore,
    engine: &'a dyn SeasonalForecaster,
    model_version: &'a str,
}

impl<'a> ForecastPipeline<'a> {
    pub fn new(
        profits: &'a dyn ProfitStore,
        forecasts: &'a dyn ForecastStore,
        engine: &'a dyn SeasonalForecaster,
        model_version: &'a str,
    ) -> Self {
        Self {
            profits,
            forecasts,
            engine,
            model_version,
        }
    }

    /// Run one generation for `periods` future months.
    pub fn run(&self, periods: usize) -> Result<ForecastSummary, PipelineError> {
        if periods == 0 {
            return Err(PipelineError::Input(
                "forecast horizon must be at least one period".to_string(),
            ));
        }

        info!(periods, model_version = self.model_version, "starting forecast generation");

        // Fetch
        let records = self.profits.all_ordered()?;
        if records.is_empty() {
            return Err(PipelineError::Input(
                "no historical profit records found".to_string(),
            ));
        }

        // Validate: non-finite net profit stands for a null upstream value.
        let series: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter(|r| r.net_profit.is_finite())
            .map(|r| (r.period_start, r.net_profit))
            .collect();
        let dropped = records.len() - series.len();
        if dropped > 0 {
            warn!(dropped, "dropping null net-profit values");
        }
        if series.len() < 2 {
            return Err(PipelineError::Input(format!(
                "need at least 2 usable data points, found {}",
                series.len()
            )));
        }

        let mut values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        smooth_extreme_outliers(&mut values);

        // Train
        let config = fit_profile(values.len());
        let fitted = self.engine.fit(&values, &config)?;

        // Predict: one point per calendar-month start past the last period.
        let last_period = series[series.len() - 1].0;
        let dates = future_month_starts(last_period, periods)?;
        let points = fitted.forecast_with_interval(periods)?;
        if points.len() != periods {
            return Err(ModelError::Inference(format!(
                "expected {periods} forecast points, got {}",
                points.len()
            ))
            .into());
        }

        let generated_at = Utc::now();
        let entries: Vec<ForecastEntry> = dates
            .into_iter()
            .zip(points)
            .map(|(date, point)| {
                ForecastEntry::new(
                    date,
                    point.predicted,
                    point.lower,
                    point.upper,
                    self.model_version,
                    generated_at,
                )
            })
            .collect();

        // Replace: all-or-nothing swap of the forecast table.
        self.forecasts.replace_all(entries.clone())?;
        info!(count = entries.len(), "forecast table replaced");

        // Report: diagnostics only, never blocks the result.
        report_diagnostics(&values, &entries);

        summarize(&entries, self.model_version, generated_at).ok_or_else(|| {
            PipelineError::Input("forecast generation produced no entries".to_string())
        })
    }
}

/// Summary over an already-stored forecast set. `None` when empty.
pub fn summarize(
    entries: &[ForecastEntry],
    model_version: &str,
    created_at: DateTime<Utc>,
) -> Option<ForecastSummary> {
    let first = entries.iter().map(|e| e.forecast_date).min()?;
    let last = entries.iter().map(|e| e.forecast_date).max()?;
    let avg = entries.iter().map(|e| e.predicted_net_profit).sum::<f64>() / entries.len() as f64;
    Some(ForecastSummary {
        total_forecasts: entries.len(),
        period_start: first,
        period_end: last,
        avg_predicted_profit: avg,
        model_version: model_version.to_string(),
        created_at,
    })
}

/// Data-volume-dependent fit profile.
///
/// Small histories get a deliberately sluggish trend, a wider interval and
/// almost no changepoint budget; larger ones the responsive defaults. The
/// annual cycle is always fitted (period 12: the data is monthly); the
/// half-year component that captures the January/October twin peaks only
/// joins once a full year of history exists.
fn fit_profile(n: usize) -> SeasonalFitConfig {
    let mut config = if n <= SMALL_HISTORY {
        info!(points = n, "small history, conservative fit profile");
        SeasonalFitConfig {
            changepoint_sensitivity: 0.01,
            interval_width: 0.95,
            max_changepoints: 2.min(n.saturating_sub(1)),
            seasonalities: Vec::new(),
        }
    } else {
        info!(points = n, "sufficient history, responsive fit profile");
        SeasonalFitConfig {
            changepoint_sensitivity: 0.05,
            interval_width: 0.90,
            ..SeasonalFitConfig::default()
        }
    };

    config.seasonalities.push(SeasonalComponent {
        name: "annual",
        period: 12,
        fourier_order: 4,
        prior_scale: 1.2,
    });
    if n >= HALF_YEAR_MIN_POINTS {
        config.seasonalities.push(SeasonalComponent {
            name: "half_year",
            period: 6,
            fourier_order: 2,
            prior_scale: 0.8,
        });
    }
    config
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// The `periods` calendar-month starts following `last`.
fn future_month_starts(
    last: NaiveDate,
    periods: usize,
) -> Result<Vec<NaiveDate>, PipelineError> {
    let base = month_start(last);
    (1..=periods as u32)
        .map(|i| {
            base.checked_add_months(Months::new(i)).ok_or_else(|| {
                PipelineError::Input(
                    "forecast horizon exceeds the supported calendar range".to_string(),
                )
            })
        })
        .collect()
}

/// Compare history against the fresh forecasts and log the breakdown.
/// Diagnostics only: this never fails and never touches storage.
fn report_diagnostics(history: &[f64], forecasts: &[ForecastEntry]) {
    let predicted: Vec<f64> = forecasts.iter().map(|e| e.predicted_net_profit).collect();
    if history.is_empty() || predicted.is_empty() {
        return;
    }

    let hist_mean = mean(history);
    let pred_mean = mean(&predicted);
    info!(
        hist_mean,
        hist_std = sample_std(history),
        pred_mean,
        pred_std = sample_std(&predicted),
        "historical vs predicted profit"
    );

    if hist_mean != 0.0 {
        let change_percent = (pred_mean - hist_mean) / hist_mean * 100.0;
        if change_percent.abs() > 50.0 {
            warn!(change_percent, "large mean shift predicted");
        } else {
            info!(change_percent, "predicted trend vs history");
        }
    }

    for entry in forecasts {
        info!(
            month = %entry.forecast_date,
            season = season_tag(entry.forecast_date.month()),
            predicted = entry.predicted_net_profit,
            "monthly forecast"
        );
    }

    if history.len() < HALF_YEAR_MIN_POINTS {
        warn!(
            points = history.len(),
            "limited history; 12+ points recommended for full seasonality"
        );
    } else if history.len() >= 24 {
        info!("history long enough for robust seasonal patterns");
    } else {
        info!("history adequate for basic seasonality");
    }
}

/// Fitness-business seasonality of a calendar month: January and October
/// peak (new-year resolutions, pre-summer), June and December dip.
fn season_tag(month: u32) -> &'static str {
    match month {
        1 | 10 => "peak",
        2 | 7 | 9 | 11 => "high",
        6 | 12 => "low",
        _ => "normal",
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1), deterministic.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let d = v - m;
            d * d
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use pulsefit_ai::{
        FittedSeasonalModel, ForecastPoint, ModelError, TrendSeasonalEngine,
    };
    use pulsefit_core::ProfitRecord;
    use std::sync::RwLock;

    struct MemProfits {
        rows: Vec<ProfitRecord>,
    }

    impl ProfitStore for MemProfits {
        fn all_ordered(&self) -> Result<Vec<ProfitRecord>, StoreError> {
            let mut rows = self.rows.clone();
            rows.sort_by_key(|r| r.period_start);
            Ok(rows)
        }
    }

    #[derive(Default)]
    struct MemForecasts {
        rows: RwLock<Vec<ForecastEntry>>,
        fail_replace: bool,
        replace_calls: RwLock<usize>,
    }

    impl ForecastStore for MemForecasts {
        fn all(&self) -> Result<Vec<ForecastEntry>, StoreError> {
            Ok(self.rows.read().unwrap().clone())
        }

        fn replace_all(&self, entries: Vec<ForecastEntry>) -> Result<(), StoreError> {
            *self.replace_calls.write().unwrap() += 1;
            if self.fail_replace {
                return Err(StoreError::storage("constraint violation on insert"));
            }
            *self.rows.write().unwrap() = entries;
            Ok(())
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profit(y: i32, m: u32, net: f64) -> ProfitRecord {
        ProfitRecord {
            period_start: ymd(y, m, 1),
            period_end: ymd(y, m, 28),
            total_revenue: net + 20_000.0,
            total_expenses: 20_000.0,
            net_profit: net,
            profit_margin: if net + 20_000.0 != 0.0 {
                net / (net + 20_000.0)
            } else {
                0.0
            },
        }
    }

    fn months_of_profit(count: usize) -> Vec<ProfitRecord> {
        (0..count)
            .map(|i| {
                let month = (i % 12) as u32 + 1;
                let year = 2024 + (i / 12) as i32;
                profit(year, month, 1000.0 + 40.0 * i as f64)
            })
            .collect()
    }

    #[test]
    fn empty_history_is_an_input_error_and_writes_nothing() {
        let profits = MemProfits { rows: Vec::new() };
        let forecasts = MemForecasts::default();
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        let err = pipeline.run(DEFAULT_HORIZON).unwrap_err();

        assert!(matches!(err, PipelineError::Input(_)));
        assert_eq!(*forecasts.replace_calls.read().unwrap(), 0);
        assert!(forecasts.all().unwrap().is_empty());
    }

    #[test]
    fn all_null_history_is_an_input_error() {
        let profits = MemProfits {
            rows: vec![profit(2025, 1, f64::NAN), profit(2025, 2, f64::NAN)],
        };
        let forecasts = MemForecasts::default();
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        assert!(matches!(
            pipeline.run(DEFAULT_HORIZON),
            Err(PipelineError::Input(_))
        ));
    }

    #[test]
    fn single_point_is_not_enough() {
        let profits = MemProfits {
            rows: vec![profit(2025, 1, 1000.0)],
        };
        let forecasts = MemForecasts::default();
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        assert!(matches!(
            pipeline.run(DEFAULT_HORIZON),
            Err(PipelineError::Input(_))
        ));
    }

    #[test]
    fn generates_month_start_entries_with_version_tag() {
        let profits = MemProfits {
            rows: months_of_profit(10),
        };
        let forecasts = MemForecasts::default();
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        let summary = pipeline.run(DEFAULT_HORIZON).unwrap();

        assert_eq!(summary.total_forecasts, DEFAULT_HORIZON);
        assert_eq!(summary.model_version, MODEL_VERSION);
        // history ends 2024-10-01; forecasts run 2024-11-01 .. 2025-04-01
        assert_eq!(summary.period_start, ymd(2024, 11, 1));
        assert_eq!(summary.period_end, ymd(2025, 4, 1));

        let stored = forecasts.all().unwrap();
        assert_eq!(stored.len(), DEFAULT_HORIZON);
        assert!(stored.iter().all(|e| e.forecast_date.day() == 1));
        assert!(stored.iter().all(|e| e.model_version == MODEL_VERSION));
        assert!(stored.iter().all(|e| e.lower_bound <= e.predicted_net_profit
            && e.predicted_net_profit <= e.upper_bound));
    }

    #[test]
    fn failed_replace_keeps_previous_forecasts_intact() {
        let profits = MemProfits {
            rows: months_of_profit(8),
        };
        let previous = vec![ForecastEntry::new(
            ymd(2024, 9, 1),
            900.0,
            800.0,
            1000.0,
            "v1.9",
            Utc::now(),
        )];
        let forecasts = MemForecasts {
            rows: RwLock::new(previous.clone()),
            fail_replace: true,
            replace_calls: RwLock::new(0),
        };
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        let err = pipeline.run(DEFAULT_HORIZON).unwrap_err();

        assert!(matches!(err, PipelineError::Store(_)));
        assert_eq!(forecasts.all().unwrap(), previous);
    }

    #[test]
    fn outliers_are_smoothed_before_training() {
        /// Captures the series the pipeline hands to `fit`.
        struct SpyEngine {
            seen: RwLock<Vec<f64>>,
        }

        impl SeasonalForecaster for SpyEngine {
            fn fit(
                &self,
                series: &[f64],
                _config: &SeasonalFitConfig,
            ) -> Result<Box<dyn FittedSeasonalModel>, ModelError> {
                *self.seen.write().unwrap() = series.to_vec();
                Ok(Box::new(FlatFit))
            }
        }

        #[derive(Debug)]
        struct FlatFit;

        impl FittedSeasonalModel for FlatFit {
            fn forecast_with_interval(
                &self,
                horizon: usize,
            ) -> Result<Vec<ForecastPoint>, ModelError> {
                Ok((0..horizon)
                    .map(|_| ForecastPoint {
                        predicted: 1000.0,
                        lower: 900.0,
                        upper: 1100.0,
                    })
                    .collect())
            }
        }

        let mut rows = months_of_profit(8);
        rows[4].net_profit = -90_000.0; // far below 3x IQR
        let profits = MemProfits { rows };
        let forecasts = MemForecasts::default();
        let engine = SpyEngine {
            seen: RwLock::new(Vec::new()),
        };

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        pipeline.run(DEFAULT_HORIZON).unwrap();

        let seen = engine.seen.read().unwrap().clone();
        assert_eq!(seen.len(), 8);
        assert!(seen[4] > -90_000.0, "outlier should have been smoothed");
    }

    #[test]
    fn null_values_are_dropped_not_fatal() {
        let mut rows = months_of_profit(8);
        rows[2].net_profit = f64::NAN;
        let profits = MemProfits { rows };
        let forecasts = MemForecasts::default();
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        let summary = pipeline.run(3).unwrap();
        assert_eq!(summary.total_forecasts, 3);
    }

    #[test]
    fn zero_periods_is_rejected() {
        let profits = MemProfits {
            rows: months_of_profit(8),
        };
        let forecasts = MemForecasts::default();
        let engine = TrendSeasonalEngine::new();

        let pipeline = ForecastPipeline::new(&profits, &forecasts, &engine, MODEL_VERSION);
        assert!(matches!(pipeline.run(0), Err(PipelineError::Input(_))));
        assert_eq!(*forecasts.replace_calls.read().unwrap(), 0);
    }

    #[test]
    fn fit_profile_matches_data_volume() {
        let small = fit_profile(5);
        assert_eq!(small.changepoint_sensitivity, 0.01);
        assert_eq!(small.interval_width, 0.95);
        assert_eq!(small.max_changepoints, 2);
        assert_eq!(small.seasonalities.len(), 1);
        assert_eq!(small.seasonalities[0].period, 12);

        let medium = fit_profile(8);
        assert_eq!(medium.changepoint_sensitivity, 0.05);
        assert_eq!(medium.interval_width, 0.90);
        assert_eq!(medium.seasonalities.len(), 1);

        let large = fit_profile(14);
        assert_eq!(large.seasonalities.len(), 2);
        assert_eq!(large.seasonalities[1].period, 6);
    }

    #[test]
    fn month_starts_cross_year_boundaries() {
        let dates = future_month_starts(ymd(2024, 11, 15), 3).unwrap();
        assert_eq!(dates, vec![ymd(2024, 12, 1), ymd(2025, 1, 1), ymd(2025, 2, 1)]);
    }
}
