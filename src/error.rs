//! Error types for the scheduling engine.
//!
//! `SchedulingError` is what callers of the engine see. `ModelError` never
//! leaves the predictor: every variant is absorbed by the heuristic fallback.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced to callers of the booking and store operations.
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Conflict with existing appointment: {appointment_id} ({patient_name})")]
    Conflict {
        appointment_id: String,
        patient_name: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SchedulingError {
    pub fn missing(field: &'static str) -> Self {
        SchedulingError::Validation {
            field,
            message: format!("Missing required field: {}", field),
        }
    }
}

/// Failures of the appointment store's persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store lock poisoned by a panicked writer")]
    Poisoned,
}

/// Failures of a trained prediction model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("No trained model is configured")]
    Unavailable,

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Feature shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Model inference timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T, E = SchedulingError> = std::result::Result<T, E>;
