//! Extreme-outlier smoothing for the profit series.
//!
//! Outliers are smoothed rather than removed: dropping a month would shift
//! every later sample's seasonal phase, so the series keeps its length and
//! the replacement values deliberately understate the true extremes.

use tracing::{info, warn};

/// Minimum series length before outlier detection makes sense.
pub const MIN_POINTS_FOR_DETECTION: usize = 6;

/// IQR multiplier; 3x flags only extreme values, not ordinary variation.
const IQR_FENCE: f64 = 3.0;

/// How many values were smoothed on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmoothingOutcome {
    pub smoothed_low: usize,
    pub smoothed_high: usize,
}

impl SmoothingOutcome {
    pub fn total(&self) -> usize {
        self.smoothed_low + self.smoothed_high
    }
}

/// Linear-interpolation quantile over a sorted, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Smooth values outside `[Q1 - 3*IQR, Q3 + 3*IQR]` in place.
///
/// Low outliers become the 25th percentile of the in-bound-from-below
/// values; high outliers become the 75th percentile of the
/// in-bound-from-above values. Series shorter than
/// [`MIN_POINTS_FOR_DETECTION`] are left untouched.
pub fn smooth_extreme_outliers(values: &mut [f64]) -> SmoothingOutcome {
    if values.len() < MIN_POINTS_FOR_DETECTION {
        return SmoothingOutcome::default();
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - IQR_FENCE * iqr;
    let upper_fence = q3 + IQR_FENCE * iqr;

    let mut outcome = SmoothingOutcome::default();

    let in_bound_low: Vec<f64> = sorted.iter().copied().filter(|v| *v >= lower_fence).collect();
    let in_bound_high: Vec<f64> = sorted.iter().copied().filter(|v| *v <= upper_fence).collect();

    for value in values.iter_mut() {
        if *value < lower_fence {
            let replacement = quantile(&in_bound_low, 0.25);
            warn!(original = *value, replacement, "smoothing low outlier");
            *value = replacement;
            outcome.smoothed_low += 1;
        } else if *value > upper_fence {
            let replacement = quantile(&in_bound_high, 0.75);
            warn!(original = *value, replacement, "smoothing high outlier");
            *value = replacement;
            outcome.smoothed_high += 1;
        }
    }

    if outcome.total() > 0 {
        info!(
            low = outcome.smoothed_low,
            high = outcome.smoothed_high,
            "extreme outliers smoothed"
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.0) - 1.0).abs() < 1e-12);
        assert!((quantile(&sorted, 1.0) - 4.0).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn short_series_are_untouched() {
        let mut values = vec![1.0, 2.0, -500.0, 3.0, 4.0];
        let outcome = smooth_extreme_outliers(&mut values);
        assert_eq!(outcome.total(), 0);
        assert_eq!(values[2], -500.0);
    }

    #[test]
    fn low_outlier_is_raised_not_removed() {
        // 8 monthly values, one far more than 3*IQR below Q1
        let mut values = vec![
            1000.0, 1100.0, 1050.0, 980.0, -9000.0, 1020.0, 1080.0, 990.0,
        ];
        let before_len = values.len();

        let mut sorted: Vec<f64> = values.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let q1 = quantile(&sorted, 0.25);

        let outcome = smooth_extreme_outliers(&mut values);

        assert_eq!(outcome.smoothed_low, 1);
        assert_eq!(values.len(), before_len);
        // the smoothed point is pulled up at least to Q1 of the original mix
        assert!(values[4] >= q1);
        // everything else is untouched
        assert_eq!(values[0], 1000.0);
        assert_eq!(values[7], 990.0);
    }

    #[test]
    fn high_outlier_is_lowered() {
        let mut values = vec![
            1000.0, 1100.0, 1050.0, 980.0, 55000.0, 1020.0, 1080.0, 990.0,
        ];
        let outcome = smooth_extreme_outliers(&mut values);
        assert_eq!(outcome.smoothed_high, 1);
        assert!(values[4] < 55000.0);
        assert!(values[4] <= 1100.0);
    }

    #[test]
    fn ordinary_variation_is_left_alone() {
        let original = vec![900.0, 1100.0, 950.0, 1050.0, 980.0, 1020.0];
        let mut values = original.clone();
        let outcome = smooth_extreme_outliers(&mut values);
        assert_eq!(outcome.total(), 0);
        assert_eq!(values, original);
    }
}
