//! Wait-time prediction with a guaranteed answer.
//!
//! `WaitTimePredictor` runs the trained model when one is configured and
//! substitutes the heuristic on every `ModelError`, so callers never see a
//! prediction failure.

use chrono::{Local, NaiveDateTime};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::features::{extract_features, FeatureVector};
use crate::heuristic::{HeuristicConfig, HeuristicModel, MAX_WAIT_MINUTES, MIN_WAIT_MINUTES};
use crate::model::{Estimate, PredictionModel};

/// Which path produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub wait_minutes: f64,
    pub confidence: f64,
    pub source: PredictionSource,
}

/// Confidence from how far ahead the instant lies.
///
/// Within a week 0.85, within a month 0.75, otherwise 0.65. Past instants
/// count as near.
pub fn confidence_for_lead_time(now: NaiveDateTime, instant: NaiveDateTime) -> f64 {
    let days_ahead = (instant - now).num_days();
    if days_ahead <= 7 {
        0.85
    } else if days_ahead <= 30 {
        0.75
    } else {
        0.65
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub struct WaitTimePredictor {
    model: Option<Arc<dyn PredictionModel>>,
    fallback: HeuristicModel,
    worker: Option<ModelWorker>,
    clock: fn() -> NaiveDateTime,
}

impl WaitTimePredictor {
    /// Heuristic-only predictor.
    pub fn heuristic(config: HeuristicConfig) -> Self {
        WaitTimePredictor {
            model: None,
            fallback: HeuristicModel::new(config),
            worker: None,
            clock: local_now,
        }
    }

    pub fn with_model(model: Arc<dyn PredictionModel>, fallback: HeuristicConfig) -> Self {
        WaitTimePredictor {
            model: Some(model),
            ..Self::heuristic(fallback)
        }
    }

    /// Bound each model inference; expiry falls back to the heuristic.
    ///
    /// Timed inference runs on one long-lived worker thread. If the worker
    /// cannot be started, inference stays on the caller's thread unbounded.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let Some(model) = self.model.as_ref() else {
            return self;
        };
        match ModelWorker::spawn(Arc::clone(model), timeout) {
            Ok(worker) => self.worker = Some(worker),
            Err(err) => warn!("{}. Model inference will not be time-bounded", err),
        }
        self
    }

    /// Replace the wall clock used for lead-time confidence.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn has_trained_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn predict(&self, appointment_type: &str, instant: NaiveDateTime) -> Prediction {
        let features = extract_features(appointment_type, instant);

        match self.infer(&features) {
            Ok(estimate) => Prediction {
                wait_minutes: estimate.wait_minutes.clamp(MIN_WAIT_MINUTES, MAX_WAIT_MINUTES),
                confidence: confidence_for_lead_time(self.now(), instant),
                source: PredictionSource::Model,
            },
            Err(ModelError::Unavailable) => self.fallback_prediction(&features),
            Err(err) => {
                warn!(
                    "Wait-time model failed for {} at {}: {}. Using heuristic",
                    appointment_type, instant, err
                );
                self.fallback_prediction(&features)
            }
        }
    }

    fn fallback_prediction(&self, features: &FeatureVector) -> Prediction {
        let estimate = self.fallback.estimate(features);
        debug!("Heuristic wait estimate: {:.1} min", estimate.wait_minutes);
        Prediction {
            wait_minutes: estimate.wait_minutes,
            confidence: estimate.confidence.unwrap_or(0.75),
            source: PredictionSource::Heuristic,
        }
    }

    fn infer(&self, features: &FeatureVector) -> Result<Estimate, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::Unavailable)?;

        let estimate = match &self.worker {
            Some(worker) => worker.infer(features),
            None => guarded_infer(model.as_ref(), features),
        }?;

        if !estimate.wait_minutes.is_finite() {
            return Err(ModelError::Inference(format!(
                "non-finite wait estimate {}",
                estimate.wait_minutes
            )));
        }
        Ok(estimate)
    }
}

fn guarded_infer(model: &dyn PredictionModel, features: &FeatureVector) -> Result<Estimate, ModelError> {
    panic::catch_unwind(AssertUnwindSafe(|| model.infer(features)))
        .unwrap_or_else(|_| Err(ModelError::Inference("model panicked".to_string())))
}

/// Requests that may wait behind the one in flight.
const WORKER_QUEUE_DEPTH: usize = 1;

type Job = (FeatureVector, mpsc::Sender<Result<Estimate, ModelError>>);

/// A single inference thread shared by every timed prediction.
///
/// A hung model holds this one thread. Later requests queue behind it up to
/// `WORKER_QUEUE_DEPTH` and are refused beyond that, so no further threads
/// are started. The thread exits once the predictor is dropped and the call
/// in flight returns.
struct ModelWorker {
    jobs: SyncSender<Job>,
    timeout: Duration,
}

impl ModelWorker {
    fn spawn(model: Arc<dyn PredictionModel>, timeout: Duration) -> Result<Self, ModelError> {
        let (jobs, queue) = mpsc::sync_channel::<Job>(WORKER_QUEUE_DEPTH);
        thread::Builder::new()
            .name("wait-model".to_string())
            .spawn(move || {
                for (features, reply) in queue {
                    // The caller may have stopped waiting.
                    let _ = reply.send(guarded_infer(model.as_ref(), &features));
                }
            })
            .map_err(|e| ModelError::Inference(format!("failed to spawn model worker: {}", e)))?;
        Ok(ModelWorker { jobs, timeout })
    }

    fn infer(&self, features: &FeatureVector) -> Result<Estimate, ModelError> {
        let (reply, result) = mpsc::channel();
        match self.jobs.try_send((*features, reply)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                return Err(ModelError::Inference("model worker is busy".to_string()))
            }
            Err(TrySendError::Disconnected(_)) => {
                return Err(ModelError::Inference("model worker has stopped".to_string()))
            }
        }

        match result.recv_timeout(self.timeout) {
            Ok(estimate) => estimate,
            Err(RecvTimeoutError::Timeout) => Err(ModelError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(ModelError::Inference("model worker exited without a result".to_string()))
            }
        }
    }
}
