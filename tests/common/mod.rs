#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use waitwise::{
    AppointmentStore, BookingRequest, Estimate, FeatureVector, HeuristicConfig, ModelError,
    PredictionModel, SchedulingEngine, WaitTimePredictor,
};

/// Returns a fixed wait and counts how often it was asked.
pub struct CountingModel {
    wait_minutes: f64,
    calls: AtomicUsize,
}

impl CountingModel {
    pub fn new(wait_minutes: f64) -> Arc<Self> {
        Arc::new(CountingModel {
            wait_minutes,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredictionModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    fn infer(&self, _features: &FeatureVector) -> Result<Estimate, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Estimate::minutes(self.wait_minutes))
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn noiseless_engine() -> SchedulingEngine {
    SchedulingEngine::new(
        WaitTimePredictor::heuristic(HeuristicConfig::noiseless()),
        AppointmentStore::in_memory(),
    )
}

pub fn model_engine(model: Arc<CountingModel>) -> SchedulingEngine {
    SchedulingEngine::new(
        WaitTimePredictor::with_model(model, HeuristicConfig::noiseless()),
        AppointmentStore::in_memory(),
    )
}

pub fn booking(name: &str, kind: &str, start: NaiveDateTime) -> BookingRequest {
    BookingRequest {
        patient_name: name.to_string(),
        patient_id: format!("ID-{}", name.len()),
        phone: "555-0100".to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        appointment_type: kind.to_string(),
        start,
        duration_minutes: Some(30),
        notes: None,
    }
}
