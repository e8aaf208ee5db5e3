//! Pipeline error model.

use thiserror::Error;

use pulsefit_ai::ModelError;

use crate::store::StoreError;

/// Failure of one pipeline run.
///
/// A failed run writes nothing (each phase commits atomically or not at
/// all); the scheduler logs the error and the next tick retries naturally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The historical input series is unusable (empty, too short, all null).
    #[error("invalid input series: {0}")]
    Input(String),

    /// The underlying model failed or is unavailable.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A storage commit or read failed; staged writes were rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),
}
