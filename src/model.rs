//! The prediction model boundary.
//!
//! A `PredictionModel` turns a feature vector into a wait estimate or a
//! typed `ModelError`. The predictor decides what to do with errors; models
//! never fall back on their own.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ModelError;
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Raw model output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub wait_minutes: f64,
    /// Set only by models that report their own confidence.
    pub confidence: Option<f64>,
}

impl Estimate {
    pub fn minutes(wait_minutes: f64) -> Self {
        Estimate {
            wait_minutes,
            confidence: None,
        }
    }
}

pub trait PredictionModel: Send + Sync {
    fn name(&self) -> &str;

    fn infer(&self, features: &FeatureVector) -> Result<Estimate, ModelError>;
}

/// A trained linear regressor over the feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self, ModelError> {
        if weights.len() != FEATURE_COUNT {
            return Err(ModelError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: weights.len(),
            });
        }
        Ok(LinearModel { weights, bias })
    }

    /// Load weights from a JSON document `{"weights": [..], "bias": ..}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))?;
        let parsed: LinearModel = serde_json::from_str(&content)
            .map_err(|e| ModelError::Load(format!("{}: {}", path.display(), e)))?;
        let model = LinearModel::new(parsed.weights, parsed.bias)?;
        info!("Loaded linear wait-time model from {}", path.display());
        Ok(model)
    }
}

impl PredictionModel for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn infer(&self, features: &FeatureVector) -> Result<Estimate, ModelError> {
        let input = features.as_slice();
        if input.len() != self.weights.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.weights.len(),
                actual: input.len(),
            });
        }

        let wait = self
            .weights
            .iter()
            .zip(input)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;

        if !wait.is_finite() {
            return Err(ModelError::Inference(format!(
                "non-finite output {}",
                wait
            )));
        }
        Ok(Estimate::minutes(wait))
    }
}
