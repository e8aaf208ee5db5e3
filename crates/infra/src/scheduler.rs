//! Background job scheduler.
//!
//! One thread per job id: the job runs inline on its own thread, so a given
//! id never has two in-flight runs. Missed or overlapping firings set a
//! single pending flag that drains as one catch-up execution. Every job runs
//! once eagerly at startup, before its first scheduled tick.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc, Weekday};
use tracing::{debug, error, info};

use pulsefit_analytics::PipelineError;

use crate::service::AnalyticsService;

/// When a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fixed interval between firings.
    Interval(Duration),
    /// Calendar: a fixed day-of-month at hh:mm UTC.
    MonthlyAt { day: u32, hour: u32, minute: u32 },
    /// Calendar: a fixed weekday at hh:mm UTC.
    WeeklyAt {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
}

impl Trigger {
    /// The next fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Trigger::Interval(interval) => {
                after + chrono::Duration::from_std(*interval).unwrap_or(chrono::Duration::zero())
            }
            Trigger::MonthlyAt { day, hour, minute } => {
                let mut month_start =
                    first_of_month(after.date_naive());
                // Walk forward month by month until the configured day/time
                // lands strictly in the future. Bounded: a valid day always
                // exists within a handful of months.
                for _ in 0..48 {
                    if let Some(candidate) = month_start
                        .with_day(*day)
                        .and_then(|d| d.and_hms_opt(*hour, *minute, 0))
                    {
                        let candidate = candidate.and_utc();
                        if candidate > after {
                            return candidate;
                        }
                    }
                    month_start = month_start
                        .checked_add_months(Months::new(1))
                        .unwrap_or(month_start);
                }
                // Unreachable for sane configs; fall back to a day from now.
                after + chrono::Duration::days(1)
            }
            Trigger::WeeklyAt {
                weekday,
                hour,
                minute,
            } => {
                let today = after.date_naive();
                let days_ahead = (weekday.num_days_from_monday() as i64
                    - today.weekday().num_days_from_monday() as i64)
                    .rem_euclid(7);
                let candidate_day = today + chrono::Duration::days(days_ahead);
                let candidate = candidate_day
                    .and_hms_opt(*hour, *minute, 0)
                    .map(|dt| dt.and_utc())
                    .unwrap_or(after + chrono::Duration::days(7));
                if candidate > after {
                    candidate
                } else {
                    candidate + chrono::Duration::days(7)
                }
            }
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Handle to one scheduled job thread.
#[derive(Debug)]
pub struct JobHandle {
    name: &'static str,
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl JobHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fire the job out of band. Coalesced: if a trigger is already queued
    /// this is a no-op, and a trigger arriving mid-run folds into one
    /// catch-up execution.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Graceful stop: the in-flight run (if any) finishes first.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawn one job on its own thread.
pub fn spawn_job<F>(name: &'static str, trigger: Trigger, job: F) -> JobHandle
where
    F: Fn() -> Result<(), PipelineError> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

    let join = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || job_loop(name, trigger, shutdown_rx, trigger_rx, job))
        .expect("failed to spawn scheduler job thread");

    JobHandle {
        name,
        shutdown: shutdown_tx,
        trigger: trigger_tx,
        join: Some(join),
    }
}

fn job_loop<F>(
    name: &'static str,
    trigger: Trigger,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    job: F,
) where
    F: Fn() -> Result<(), PipelineError>,
{
    info!(job = name, ?trigger, "scheduled job started");

    let mut next_fire = trigger.next_after(Utc::now());
    // Run once eagerly on startup, before the first tick.
    let mut pending = true;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        let now = Utc::now();
        if now >= next_fire {
            pending = true;
            // Any firings missed while the previous run was executing
            // collapse into this single catch-up run.
            while next_fire <= now {
                next_fire = trigger.next_after(next_fire);
            }
        }

        // Drain out-of-band triggers; multiple coalesce into one.
        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if !pending {
            let until_next = (next_fire - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
                .min(Duration::from_millis(250));
            thread::sleep(until_next);
            continue;
        }

        pending = false;
        match job() {
            Ok(()) => debug!(job = name, "job run completed"),
            // A failed run is logged and dropped; the next tick retries
            // naturally.
            Err(e) => error!(job = name, error = %e, "job run failed"),
        }
    }

    info!(job = name, "scheduled job stopped");
}

/// Trigger configuration for the three production jobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Short-interval classification cycle.
    pub classify_interval: Duration,
    /// Monthly forecast generation (calendar).
    pub monthly_forecast: Trigger,
    /// Weekly staleness check (calendar).
    pub weekly_staleness: Trigger,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            classify_interval: Duration::from_secs(300),
            monthly_forecast: Trigger::MonthlyAt {
                day: 1,
                hour: 6,
                minute: 0,
            },
            weekly_staleness: Trigger::WeeklyAt {
                weekday: Weekday::Mon,
                hour: 8,
                minute: 0,
            },
        }
    }
}

/// Handle to the whole running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    jobs: Vec<JobHandle>,
}

impl SchedulerHandle {
    /// Stop every job, letting in-flight runs finish.
    pub fn shutdown(self) {
        for job in self.jobs {
            job.shutdown();
        }
    }
}

/// Start the three production jobs against the shared service.
///
/// The classification family and the forecast family touch disjoint tables,
/// so their jobs run concurrently without cross-job locking.
pub fn start(service: Arc<AnalyticsService>, config: SchedulerConfig) -> SchedulerHandle {
    let horizon = service.config().forecast_horizon;

    let classify = {
        let service = service.clone();
        spawn_job(
            "sentiment-classification",
            Trigger::Interval(config.classify_interval),
            move || service.run_classification_cycle().map(|_| ()),
        )
    };

    let monthly = {
        let service = service.clone();
        spawn_job("monthly-forecast", config.monthly_forecast, move || {
            service.run_forecast_cycle(horizon, true).map(|_| ())
        })
    };

    // Defers to the staleness policy: a fresh set is summarized, not
    // regenerated.
    let weekly = spawn_job("weekly-staleness-check", config.weekly_staleness, move || {
        service.run_forecast_cycle(horizon, false).map(|_| ())
    });

    SchedulerHandle {
        jobs: vec![classify, monthly, weekly],
    }
}
