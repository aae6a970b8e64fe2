//! The scheduling engine facade.
//!
//! `SchedulingEngine` owns one predictor, one recommender and one store and
//! exposes the operations a front-end calls. Nothing here is global: build
//! an engine per process (or per test) and pass it around.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::warn;

use crate::advisor::{AdvisorResult, AlternativeAdvisor};
use crate::config::EngineConfig;
use crate::error::{Result, StoreError};
use crate::heuristic::HeuristicConfig;
use crate::model::LinearModel;
use crate::models::{
    round_to, Appointment, AppointmentFilter, AppointmentStats, BookingRequest, DailyAnalytics,
    Slot, DEFAULT_DURATION_MINUTES,
};
use crate::predictor::{Prediction, WaitTimePredictor};
use crate::recommender::SlotRecommender;
use crate::store::AppointmentStore;

pub struct SchedulingEngine {
    predictor: Arc<WaitTimePredictor>,
    recommender: SlotRecommender,
    store: AppointmentStore,
    default_duration_minutes: i64,
}

impl SchedulingEngine {
    pub fn new(predictor: WaitTimePredictor, store: AppointmentStore) -> Self {
        let predictor = Arc::new(predictor);
        SchedulingEngine {
            recommender: SlotRecommender::new(Arc::clone(&predictor)),
            predictor,
            store,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }

    /// Wire an engine from configuration.
    ///
    /// A model that fails to load is logged and skipped; the engine then runs
    /// on the heuristic alone. A store that fails to open is an error.
    pub fn from_config(config: &EngineConfig) -> Result<Self, StoreError> {
        let heuristic = config
            .heuristic_seed
            .map(HeuristicConfig::seeded)
            .unwrap_or_default();

        let mut predictor = match &config.model_path {
            Some(path) => match LinearModel::from_file(path) {
                Ok(model) => WaitTimePredictor::with_model(Arc::new(model), heuristic),
                Err(e) => {
                    warn!("{}. Using heuristic predictions", e);
                    WaitTimePredictor::heuristic(heuristic)
                }
            },
            None => WaitTimePredictor::heuristic(heuristic),
        };
        if let Some(timeout) = config.model_timeout {
            predictor = predictor.with_timeout(timeout);
        }

        let store = match &config.store_path {
            Some(path) => AppointmentStore::open(path)?,
            None => AppointmentStore::in_memory(),
        };

        Ok(Self::new(predictor, store)
            .with_interval(config.slot_interval_minutes)
            .with_default_duration(config.default_duration_minutes))
    }

    pub fn with_interval(self, interval_minutes: u32) -> Self {
        SchedulingEngine {
            recommender: SlotRecommender::new(Arc::clone(&self.predictor))
                .with_interval(interval_minutes),
            ..self
        }
    }

    pub fn with_default_duration(mut self, minutes: i64) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    pub fn predictor(&self) -> &WaitTimePredictor {
        &self.predictor
    }

    pub fn recommender(&self) -> &SlotRecommender {
        &self.recommender
    }

    pub fn store(&self) -> &AppointmentStore {
        &self.store
    }

    pub fn predict_wait(&self, appointment_type: &str, instant: NaiveDateTime) -> Prediction {
        self.predictor.predict(appointment_type, instant)
    }

    pub fn recommend_slots(
        &self,
        appointment_type: &str,
        date: NaiveDate,
        k: usize,
    ) -> (Vec<Slot>, DailyAnalytics) {
        self.recommender.recommend(appointment_type, date, k)
    }

    pub fn least_busy_slots(&self, appointment_type: &str, date: NaiveDate, k: usize) -> Vec<Slot> {
        self.recommender.least_busy(appointment_type, date, k)
    }

    pub fn busiest_slots(&self, appointment_type: &str, date: NaiveDate, k: usize) -> Vec<Slot> {
        self.recommender.busiest(appointment_type, date, k)
    }

    pub fn suggest_alternatives(
        &self,
        appointment_type: &str,
        preferred: NaiveDateTime,
        max_alternatives: usize,
        max_wait_preference: Option<f64>,
    ) -> AdvisorResult {
        AlternativeAdvisor::new(&self.recommender).evaluate(
            appointment_type,
            preferred,
            max_alternatives,
            max_wait_preference,
        )
    }

    /// Validate, predict and store a booking.
    ///
    /// The prediction is frozen on the stored record.
    pub fn book(&self, mut request: BookingRequest) -> Result<Appointment> {
        request.validate()?;
        request.duration_minutes.get_or_insert(self.default_duration_minutes);

        let prediction = self.predictor.predict(&request.appointment_type, request.start);
        let record = request.with_prediction(
            round_to(prediction.wait_minutes, 1),
            round_to(prediction.confidence, 2),
        );
        self.store.add(record)
    }

    pub fn cancel(&self, appointment_id: &str, reason: &str) -> Result<bool, StoreError> {
        self.store.cancel(appointment_id, reason)
    }

    pub fn reschedule(
        &self,
        appointment_id: &str,
        new_start: NaiveDateTime,
        reason: &str,
    ) -> Result<Option<Appointment>> {
        self.store.reschedule(appointment_id, new_start, reason)
    }

    pub fn get_appointment(&self, appointment_id: &str) -> Result<Option<Appointment>, StoreError> {
        self.store.get(appointment_id)
    }

    pub fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, StoreError> {
        self.store.list(filter)
    }

    pub fn stats(&self) -> Result<AppointmentStats, StoreError> {
        self.store.stats()
    }

    pub fn next_upcoming(&self) -> Result<Option<Appointment>, StoreError> {
        self.store.next_upcoming()
    }
}
