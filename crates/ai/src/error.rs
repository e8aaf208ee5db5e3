//! Model-layer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The serialized model artifact could not be read. Fatal at startup for
    /// the path that needs the model.
    #[error("model artifact unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    /// The artifact was read but its contents are unusable.
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// The caller handed the model malformed input (empty series, NaN, ...).
    #[error("invalid model input: {0}")]
    InvalidInput(String),

    /// Inference itself failed.
    #[error("inference failed: {0}")]
    Inference(String),
}
