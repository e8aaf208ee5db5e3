//! Forecast staleness policy.
//!
//! Pure decisions over the stored forecast set; callers pass the current
//! date/time so the rules stay deterministic under test.

use chrono::{DateTime, NaiveDate, Utc};

use pulsefit_core::ForecastEntry;

/// A forecast generation older than this must be refreshed even when its
/// dates still point at the future.
pub const MAX_GENERATION_AGE_DAYS: i64 = 7;

/// Startup is satisfied only by this many strictly-future forecast dates.
pub const MIN_FUTURE_FORECASTS: usize = 3;

/// Why a regeneration is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessReason {
    /// No forecasts stored at all.
    Empty,
    /// The newest forecast date is today or already past.
    DatesNotAhead,
    /// The generation itself is too old.
    GenerationExpired { days_old: i64 },
}

/// Outcome of a staleness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessVerdict {
    Regenerate(StalenessReason),
    Fresh,
}

impl StalenessVerdict {
    pub fn needs_regeneration(&self) -> bool {
        matches!(self, StalenessVerdict::Regenerate(_))
    }
}

/// Evaluate the rules in order: empty set; newest forecast date not in the
/// future; generation older than [`MAX_GENERATION_AGE_DAYS`]; otherwise
/// fresh.
pub fn evaluate(
    entries: &[ForecastEntry],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> StalenessVerdict {
    let Some(latest_date) = entries.iter().map(|e| e.forecast_date).max() else {
        return StalenessVerdict::Regenerate(StalenessReason::Empty);
    };

    if latest_date <= today {
        return StalenessVerdict::Regenerate(StalenessReason::DatesNotAhead);
    }

    // All rows of one generation share a created_at; take the newest to be
    // safe against mixed clocks.
    let generated_at = entries
        .iter()
        .map(|e| e.created_at)
        .max()
        .unwrap_or(now);
    let days_old = (now - generated_at).num_days();
    if days_old > MAX_GENERATION_AGE_DAYS {
        return StalenessVerdict::Regenerate(StalenessReason::GenerationExpired { days_old });
    }

    StalenessVerdict::Fresh
}

/// Startup rule: regenerate unless at least [`MIN_FUTURE_FORECASTS`] dates
/// strictly in the future already exist.
pub fn startup_needs_seed(entries: &[ForecastEntry], today: NaiveDate) -> bool {
    let future = entries.iter().filter(|e| e.forecast_date > today).count();
    future < MIN_FUTURE_FORECASTS
}
