//! `pulsefit-infra` — runtime wiring for the analytics pipelines.
//!
//! In-memory store implementations (dev/test; the production database sits
//! behind the same traits), the [`service::AnalyticsService`] facade the API
//! layer talks to, and the background [`scheduler`] that drives the
//! recurring jobs.

pub mod memory;
pub mod scheduler;
pub mod service;

pub use memory::{
    InMemoryFeedbackStore, InMemoryForecastStore, InMemoryProfitStore, InMemoryWordFrequencyStore,
};
pub use scheduler::{JobHandle, SchedulerConfig, SchedulerHandle, Trigger};
pub use service::{AnalyticsService, ForecastView, ServiceConfig, WordCountView};
