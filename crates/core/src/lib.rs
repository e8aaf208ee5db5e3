//! `pulsefit-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the sentiment label enum, and the record types
//! shared by the feedback and forecasting pipelines.

pub mod error;
pub mod id;
pub mod record;
pub mod sentiment;

pub use error::{DomainError, DomainResult};
pub use id::{FeedbackId, ForecastId, WordEntryId};
pub use record::{FeedbackRecord, ForecastEntry, ProfitRecord, WordFrequencyEntry};
pub use sentiment::SentimentLabel;
