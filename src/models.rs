//! Data models for the scheduling engine.
//!
//! This module defines the core data structures used throughout the system:
//! - AppointmentType: the fixed vocabulary of appointment kinds
//! - CongestionLevel: ordered wait-time categories
//! - Slot / DailyAnalytics: computed, never persisted
//! - Appointment: a stored booking with its frozen prediction
//! - BookingRequest / NewAppointment: what callers hand to the engine and store

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, SchedulingError};

/// Default appointment length when the caller does not give one.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Longest appointment that can be booked.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Rendering used for stored timestamps and for the date-prefix filter.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The known appointment kinds.
///
/// Appointments keep the caller's raw type string; this enum is only the
/// lookup table behind feature codes and wait multipliers. Unknown keys
/// behave like a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    Consultation,
    Checkup,
    Emergency,
    Surgery,
    FollowUp,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 5] = [
        AppointmentType::Consultation,
        AppointmentType::Checkup,
        AppointmentType::Emergency,
        AppointmentType::Surgery,
        AppointmentType::FollowUp,
    ];

    /// Look up a type key, case-insensitively.
    pub fn from_key(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "consultation" => Some(AppointmentType::Consultation),
            "checkup" => Some(AppointmentType::Checkup),
            "emergency" => Some(AppointmentType::Emergency),
            "surgery" => Some(AppointmentType::Surgery),
            "follow-up" => Some(AppointmentType::FollowUp),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AppointmentType::Consultation => "consultation",
            AppointmentType::Checkup => "checkup",
            AppointmentType::Emergency => "emergency",
            AppointmentType::Surgery => "surgery",
            AppointmentType::FollowUp => "follow-up",
        }
    }

    /// Numeric code fed to the prediction model.
    pub fn code(&self) -> u8 {
        match self {
            AppointmentType::Consultation => 0,
            AppointmentType::Checkup => 1,
            AppointmentType::Emergency => 2,
            AppointmentType::Surgery => 3,
            AppointmentType::FollowUp => 4,
        }
    }

    /// Scale applied to the heuristic wait estimate.
    pub fn wait_multiplier(&self) -> f64 {
        match self {
            AppointmentType::Consultation => 1.0,
            AppointmentType::Checkup => 0.8,
            AppointmentType::Emergency => 1.5,
            AppointmentType::Surgery => 2.0,
            AppointmentType::FollowUp => 0.6,
        }
    }

    /// Feature code for a raw key, 0 for unknown keys.
    pub fn code_for(key: &str) -> u8 {
        Self::from_key(key).map(|t| t.code()).unwrap_or(0)
    }

    /// Heuristic multiplier for a raw key, 1.0 for unknown keys.
    pub fn multiplier_for(key: &str) -> f64 {
        Self::from_key(key).map(|t| t.wait_multiplier()).unwrap_or(1.0)
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Congestion categories, ordered from least to most crowded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CongestionLevel {
    Low,
    Moderate,
    High,
}

impl CongestionLevel {
    pub fn name(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low",
            CongestionLevel::Moderate => "Moderate",
            CongestionLevel::High => "High",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CongestionLevel::Low => "Low congestion - minimal wait",
            CongestionLevel::Moderate => "Moderate congestion - some wait",
            CongestionLevel::High => "High congestion - significant wait",
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A candidate appointment instant with its prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub time: NaiveDateTime,
    pub predicted_wait_minutes: f64,
    pub confidence: f64,
    pub congestion_level: CongestionLevel,
}

impl Slot {
    /// Clock time of the slot, e.g. `09:30`.
    pub fn label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// Congestion statistics over one day's batch of slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyAnalytics {
    pub total_slots: usize,
    pub average_wait: f64,
    pub min_wait: f64,
    pub max_wait: f64,
    pub std_dev: f64,
    pub low_congestion_slots: usize,
    pub moderate_congestion_slots: usize,
    pub high_congestion_slots: usize,
    /// Share of low-congestion slots, as a percentage.
    pub availability_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn name(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

/// A stored booking.
///
/// The prediction fields are captured when the booking is made and are
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub appointment_type: String,
    pub start: NaiveDateTime,
    pub duration_minutes: i64,
    #[serde(default)]
    pub predicted_wait_minutes: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub congestion_level: Option<CongestionLevel>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub cancelled_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub previous_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub rescheduled_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub reschedule_reason: Option<String>,
    #[serde(default)]
    pub conflict_warning: Option<String>,
}

impl Appointment {
    /// Exclusive end of the booked interval, saturating at the calendar's end.
    pub fn end(&self) -> NaiveDateTime {
        interval_end(self.start, self.duration_minutes).unwrap_or(NaiveDateTime::MAX)
    }

    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    /// Check whether `[start, end)` overlaps this appointment's interval.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end() && end > self.start
    }

    /// ISO rendering of the start time used by the date filter.
    pub fn start_key(&self) -> String {
        self.start.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// A booking as submitted by a caller, before prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub patient_name: String,
    pub patient_id: String,
    pub phone: String,
    pub email: String,
    pub appointment_type: String,
    pub start: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Check the caller-supplied fields.
    ///
    /// Errors name the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required: [(&'static str, &str); 5] = [
            ("patient_name", &self.patient_name),
            ("patient_id", &self.patient_id),
            ("phone", &self.phone),
            ("email", &self.email),
            ("appointment_type", &self.appointment_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(SchedulingError::missing(field));
            }
        }
        if !self.email.contains('@') {
            return Err(SchedulingError::Validation {
                field: "email",
                message: format!("'{}' is not a valid email address", self.email),
            });
        }
        if let Some(duration) = self.duration_minutes {
            check_duration(duration)?;
        }
        Ok(())
    }

    /// Attach a prediction, producing the record the store accepts.
    pub fn with_prediction(self, predicted_wait_minutes: f64, confidence: f64) -> NewAppointment {
        NewAppointment {
            patient_name: self.patient_name.trim().to_string(),
            patient_id: self.patient_id.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            appointment_type: self.appointment_type,
            start: self.start,
            duration_minutes: self.duration_minutes,
            predicted_wait_minutes: Some(predicted_wait_minutes),
            confidence: Some(confidence),
            notes: self.notes,
        }
    }
}

/// The record handed to `AppointmentStore::add`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_name: String,
    pub patient_id: String,
    pub phone: String,
    pub email: String,
    pub appointment_type: String,
    pub start: NaiveDateTime,
    pub duration_minutes: Option<i64>,
    pub predicted_wait_minutes: Option<f64>,
    pub confidence: Option<f64>,
    pub notes: Option<String>,
}

/// Filters for listing appointments. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    /// Prefix of the ISO start timestamp, usually `YYYY-MM-DD`.
    pub date: Option<String>,
    pub appointment_type: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, prefix: impl Into<String>) -> Self {
        self.date = Some(prefix.into());
        self
    }

    pub fn appointment_type(mut self, key: impl Into<String>) -> Self {
        self.appointment_type = Some(key.into());
        self
    }

    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// The date filter is a plain string prefix: `2026-01-2` also matches
    /// the 20th through the 29th.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }
        if let Some(key) = &self.appointment_type {
            if !appointment.appointment_type.eq_ignore_ascii_case(key) {
                return false;
            }
        }
        if let Some(prefix) = &self.date {
            if !appointment.start_key().starts_with(prefix.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Aggregate figures over confirmed appointments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Mean predicted wait over appointments that recorded one.
    pub average_wait: f64,
    pub upcoming_count: usize,
}

/// End of `[start, start + minutes)`, or `None` past the representable range.
pub fn interval_end(start: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    Duration::try_minutes(minutes).and_then(|d| start.checked_add_signed(d))
}

/// Durations must lie in `1..=MAX_DURATION_MINUTES`.
pub(crate) fn check_duration(minutes: i64) -> Result<()> {
    if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Err(SchedulingError::Validation {
            field: "duration_minutes",
            message: format!(
                "Duration must be between 1 and {} minutes, got {}",
                MAX_DURATION_MINUTES, minutes
            ),
        });
    }
    Ok(())
}

/// Round to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
