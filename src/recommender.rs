//! Daily slot recommendation.
//!
//! Generates the working-day grid, scores every candidate with the
//! predictor and ranks them by predicted wait.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

use crate::congestion::classify;
use crate::models::{round_to, CongestionLevel, DailyAnalytics, Slot};
use crate::predictor::WaitTimePredictor;

/// First candidate hour (inclusive).
pub const DAY_START_HOUR: u32 = 9;
/// Last candidate hour (exclusive).
pub const DAY_END_HOUR: u32 = 17;
pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;

/// Candidate instants from 09:00 (inclusive) to 17:00 (exclusive).
///
/// A zero interval yields no candidates.
pub fn generate_candidates(date: NaiveDate, interval_minutes: u32) -> Vec<NaiveDateTime> {
    if interval_minutes == 0 {
        return Vec::new();
    }

    let start = date.and_time(NaiveTime::MIN) + Duration::hours(DAY_START_HOUR as i64);
    let end = date.and_time(NaiveTime::MIN) + Duration::hours(DAY_END_HOUR as i64);
    let step = Duration::minutes(interval_minutes as i64);

    let mut candidates = Vec::new();
    let mut current = start;
    while current < end {
        candidates.push(current);
        current += step;
    }
    candidates
}

/// Congestion statistics over the whole batch.
pub fn analyze_batch(batch: &[Slot]) -> DailyAnalytics {
    if batch.is_empty() {
        return DailyAnalytics::default();
    }

    let total = batch.len();
    let waits: Vec<f64> = batch.iter().map(|s| s.predicted_wait_minutes).collect();
    let mean = waits.iter().sum::<f64>() / total as f64;
    let variance = waits.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / total as f64;
    let min = waits.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = waits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let count = |level: CongestionLevel| batch.iter().filter(|s| s.congestion_level == level).count();
    let low = count(CongestionLevel::Low);

    DailyAnalytics {
        total_slots: total,
        average_wait: round_to(mean, 1),
        min_wait: round_to(min, 1),
        max_wait: round_to(max, 1),
        std_dev: round_to(variance.sqrt(), 1),
        low_congestion_slots: low,
        moderate_congestion_slots: count(CongestionLevel::Moderate),
        high_congestion_slots: count(CongestionLevel::High),
        availability_score: round_to(low as f64 / total as f64 * 100.0, 1),
    }
}

fn by_wait_ascending(a: &Slot, b: &Slot) -> Ordering {
    a.predicted_wait_minutes.total_cmp(&b.predicted_wait_minutes)
}

/// Stable ascending sort by predicted wait; ties keep time order.
pub(crate) fn sort_least_busy(slots: &mut [Slot]) {
    slots.sort_by(by_wait_ascending);
}

pub struct SlotRecommender {
    predictor: Arc<WaitTimePredictor>,
    interval_minutes: u32,
}

impl SlotRecommender {
    pub fn new(predictor: Arc<WaitTimePredictor>) -> Self {
        SlotRecommender {
            predictor,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }

    pub fn with_interval(mut self, interval_minutes: u32) -> Self {
        self.interval_minutes = interval_minutes;
        self
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn predictor(&self) -> &WaitTimePredictor {
        &self.predictor
    }

    /// Predict one slot per candidate of `date`, in time order.
    pub fn batch_predict(&self, appointment_type: &str, date: NaiveDate) -> Vec<Slot> {
        let candidates = generate_candidates(date, self.interval_minutes);
        self.batch_predict_at(appointment_type, &candidates)
    }

    /// Predict an explicit list of instants, preserving their order.
    pub fn batch_predict_at(&self, appointment_type: &str, instants: &[NaiveDateTime]) -> Vec<Slot> {
        debug!(
            "Predicting {} slots for {}",
            instants.len(),
            appointment_type
        );
        instants
            .iter()
            .map(|&time| {
                let prediction = self.predictor.predict(appointment_type, time);
                // Levels come from the raw wait; only the minutes shown are rounded.
                Slot {
                    time,
                    predicted_wait_minutes: round_to(prediction.wait_minutes, 1),
                    confidence: round_to(prediction.confidence, 2),
                    congestion_level: classify(prediction.wait_minutes),
                }
            })
            .collect()
    }

    /// Top `k` slots by lowest wait, plus analytics over the full day.
    pub fn recommend(
        &self,
        appointment_type: &str,
        date: NaiveDate,
        k: usize,
    ) -> (Vec<Slot>, DailyAnalytics) {
        let batch = self.batch_predict(appointment_type, date);
        let analytics = analyze_batch(&batch);

        let mut ranked = batch;
        sort_least_busy(&mut ranked);
        ranked.truncate(k);
        (ranked, analytics)
    }

    pub fn least_busy(&self, appointment_type: &str, date: NaiveDate, k: usize) -> Vec<Slot> {
        let mut slots = self.batch_predict(appointment_type, date);
        sort_least_busy(&mut slots);
        slots.truncate(k);
        slots
    }

    /// Highest-wait slots first. Ties keep time order, so this is not the
    /// reverse of `least_busy`.
    pub fn busiest(&self, appointment_type: &str, date: NaiveDate, k: usize) -> Vec<Slot> {
        let mut slots = self.batch_predict(appointment_type, date);
        slots.sort_by(|a, b| by_wait_ascending(b, a));
        slots.truncate(k);
        slots
    }
}
