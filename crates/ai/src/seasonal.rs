//! Deterministic trend + seasonal forecasting engine.
//!
//! Model: ordinary-least-squares trend, blended with a recent-window slope
//! according to the changepoint budget and damped by the changepoint
//! sensitivity; seasonal components estimated from detrended residuals as
//! phase means, projected onto the configured number of Fourier harmonics
//! and shrunk by their prior scale; prediction intervals from the residual
//! standard deviation, widening with forecast distance.

use std::f64::consts::PI;

use tracing::debug;

use crate::error::ModelError;
use crate::model::{
    FittedSeasonalModel, ForecastPoint, SeasonalFitConfig, SeasonalForecaster,
};

/// Stateless engine; every `fit` returns an independent fitted model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendSeasonalEngine;

impl TrendSeasonalEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Changepoint budget at which the recent-window slope fully takes over.
const FULL_CHANGEPOINT_BUDGET: usize = 25;

impl SeasonalForecaster for TrendSeasonalEngine {
    fn fit(
        &self,
        series: &[f64],
        config: &SeasonalFitConfig,
    ) -> Result<Box<dyn FittedSeasonalModel>, ModelError> {
        let n = series.len();
        if n < 2 {
            return Err(ModelError::InvalidInput(format!(
                "need at least 2 data points to fit, found {n}"
            )));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidInput(
                "series contains non-finite values".to_string(),
            ));
        }

        // Global trend via OLS over t = 0..n.
        let global_slope = ols_slope(series);

        // A small changepoint budget pins the trend to the whole history; a
        // large one lets the most recent window dominate.
        let recent_window = (n / 2).max(4).min(n);
        let recent_slope = ols_slope(&series[n - recent_window..]);
        let recent_weight =
            config.max_changepoints.min(FULL_CHANGEPOINT_BUDGET) as f64 / FULL_CHANGEPOINT_BUDGET as f64;

        // Low sensitivity damps the fitted trend toward flat.
        let damping =
            config.changepoint_sensitivity / (config.changepoint_sensitivity + 0.01);

        let slope =
            ((1.0 - recent_weight) * global_slope + recent_weight * recent_slope) * damping;
        let t_mean = (n as f64 - 1.0) / 2.0;
        let y_mean = series.iter().sum::<f64>() / n as f64;
        let intercept = y_mean - slope * t_mean;

        // Seasonal components, estimated sequentially on the residuals.
        let mut residuals: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, y)| y - (intercept + slope * i as f64))
            .collect();

        let mut components = Vec::new();
        for seasonal in &config.seasonalities {
            if seasonal.period < 2 || n < seasonal.period {
                debug!(
                    component = seasonal.name,
                    period = seasonal.period,
                    points = n,
                    "skipping seasonal component, not enough history"
                );
                continue;
            }

            let profile = seasonal_profile(
                &residuals,
                seasonal.period,
                seasonal.fourier_order,
                seasonal.prior_scale,
            );
            for (i, r) in residuals.iter_mut().enumerate() {
                *r -= profile[i % seasonal.period];
            }
            components.push((seasonal.period, profile));
        }

        let resid_std = sample_std(&residuals);
        let z = z_for_interval(config.interval_width);

        Ok(Box::new(TrendSeasonalFit {
            intercept,
            slope,
            components,
            resid_std,
            z,
            n,
        }))
    }
}

/// Fitted state: everything needed to extend the series.
#[derive(Debug, Clone)]
struct TrendSeasonalFit {
    intercept: f64,
    slope: f64,
    /// (period, per-phase seasonal contribution)
    components: Vec<(usize, Vec<f64>)>,
    resid_std: f64,
    z: f64,
    n: usize,
}

impl FittedSeasonalModel for TrendSeasonalFit {
    fn forecast_with_interval(&self, horizon: usize) -> Result<Vec<ForecastPoint>, ModelError> {
        let mut points = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let t = self.n - 1 + step;
            let mut value = self.intercept + self.slope * t as f64;
            for (period, profile) in &self.components {
                value += profile[t % period];
            }

            // Uncertainty grows with distance from the fitted range.
            let spread =
                self.z * self.resid_std * (1.0 + step as f64 / self.n as f64).sqrt();
            points.push(ForecastPoint {
                predicted: value,
                lower: value - spread,
                upper: value + spread,
            });
        }
        Ok(points)
    }
}

/// OLS slope of `values` against 0..len.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let t_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n as f64;
    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dt = i as f64 - t_mean;
        covariance += dt * (y - y_mean);
        variance += dt * dt;
    }
    if variance > 0.0 { covariance / variance } else { 0.0 }
}

/// Per-phase seasonal contribution: phase means of the residuals, projected
/// onto the first `fourier_order` harmonics and shrunk by the prior scale.
fn seasonal_profile(
    residuals: &[f64],
    period: usize,
    fourier_order: usize,
    prior_scale: f64,
) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, r) in residuals.iter().enumerate() {
        sums[i % period] += r;
        counts[i % period] += 1;
    }
    let means: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, c)| if *c > 0 { s / *c as f64 } else { 0.0 })
        .collect();

    // Fourier projection keeps the profile smooth; higher order follows the
    // raw phase means more closely.
    let order = fourier_order.min(period / 2).max(1);
    let mut profile = vec![0.0; period];
    for k in 1..=order {
        let mut a = 0.0;
        let mut b = 0.0;
        for (p, m) in means.iter().enumerate() {
            let angle = 2.0 * PI * k as f64 * p as f64 / period as f64;
            a += m * angle.cos();
            b += m * angle.sin();
        }
        // The Nyquist harmonic (2k == period) carries half the usual weight.
        let scale = if 2 * k == period { 1.0 } else { 2.0 };
        a *= scale / period as f64;
        b *= scale / period as f64;
        for (p, value) in profile.iter_mut().enumerate() {
            let angle = 2.0 * PI * k as f64 * p as f64 / period as f64;
            *value += a * angle.cos() + b * angle.sin();
        }
    }

    let shrink = prior_scale / (prior_scale + 1.0);
    for value in &mut profile {
        *value *= shrink;
    }
    profile
}

/// Sample standard deviation, deterministic.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Normal quantile for the nominal interval coverage.
fn z_for_interval(width: f64) -> f64 {
    if width >= 0.99 {
        2.576
    } else if width >= 0.95 {
        1.960
    } else if width >= 0.90 {
        1.645
    } else if width >= 0.80 {
        1.282
    } else {
        1.0
    }
}
