//! Linear sentiment classifier backed by a serialized artifact.
//!
//! The artifact is produced offline (bag-of-words features, one weight row
//! per vocabulary token, one column per class) and loaded once at process
//! start from a fixed filesystem path. Scoring normalizes the input with the
//! shared normalizer — the same canonicalization the training pipeline used —
//! and sums token weights into per-class logits.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pulsefit_text::{normalize, tokens};

use crate::error::ModelError;
use crate::model::{Prediction, SentimentModel};

/// Serialized form of the trained classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentArtifact {
    pub version: String,
    /// Class labels, column order of every weight row.
    pub classes: Vec<String>,
    /// Per-class intercepts.
    pub bias: Vec<f64>,
    /// Token -> per-class weights.
    pub weights: HashMap<String, Vec<f64>>,
}

/// The loaded classifier. Immutable after construction; safe to share across
/// concurrently running jobs.
#[derive(Debug, Clone)]
pub struct LinearSentimentModel {
    artifact: SentimentArtifact,
}

impl LinearSentimentModel {
    /// Load the artifact from disk. A missing or unreadable file is
    /// `ModelError::Unavailable`, which callers on the classification path
    /// treat as fatal at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ModelError::Unavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let artifact: SentimentArtifact =
            serde_json::from_str(&raw).map_err(|e| ModelError::InvalidArtifact(e.to_string()))?;
        Self::from_artifact(artifact)
    }

    /// Build a model from an in-memory artifact (tests, embedded defaults).
    pub fn from_artifact(artifact: SentimentArtifact) -> Result<Self, ModelError> {
        if artifact.classes.is_empty() {
            return Err(ModelError::InvalidArtifact("no classes defined".into()));
        }
        if artifact.bias.len() != artifact.classes.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "bias length {} does not match {} classes",
                artifact.bias.len(),
                artifact.classes.len()
            )));
        }
        for (token, row) in &artifact.weights {
            if row.len() != artifact.classes.len() {
                return Err(ModelError::InvalidArtifact(format!(
                    "weight row for {token:?} has length {}, expected {}",
                    row.len(),
                    artifact.classes.len()
                )));
            }
        }
        Ok(Self { artifact })
    }

    pub fn version(&self) -> &str {
        &self.artifact.version
    }

    /// Per-class probabilities for one text.
    fn probabilities(&self, text: &str) -> Vec<f64> {
        // normalize is idempotent, so texts the job already canonicalized
        // pass through unchanged.
        let normalized = normalize(text);

        let mut logits = self.artifact.bias.clone();
        for token in tokens(&normalized) {
            if let Some(row) = self.artifact.weights.get(token) {
                for (logit, weight) in logits.iter_mut().zip(row) {
                    *logit += weight;
                }
            }
        }

        softmax(&logits)
    }

    fn top_class(&self, probabilities: &[f64]) -> (usize, f64) {
        let mut best = 0;
        for (idx, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = idx;
            }
        }
        (best, probabilities[best])
    }
}

impl SentimentModel for LinearSentimentModel {
    fn predict(&self, text: &str) -> Result<String, ModelError> {
        let probabilities = self.probabilities(text);
        let (idx, _) = self.top_class(&probabilities);
        Ok(self.artifact.classes[idx].clone())
    }

    fn predict_with_confidence(&self, text: &str) -> Result<Prediction, ModelError> {
        let probabilities = self.probabilities(text);
        let (idx, confidence) = self.top_class(&probabilities);
        Ok(Prediction {
            label: self.artifact.classes[idx].clone(),
            confidence,
        })
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
