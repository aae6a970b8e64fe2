//! Wait-time aware appointment scheduling.
//!
//! The engine predicts how long a patient will wait for a given appointment
//! type and instant, ranks the slots of a day by that prediction, advises
//! whether a preferred time is worth keeping, and stores bookings with
//! conflict detection.

pub mod advisor;
pub mod config;
pub mod congestion;
pub mod display;
pub mod error;
pub mod features;
pub mod heuristic;
pub mod model;
pub mod models;
pub mod predictor;
pub mod recommender;
pub mod scheduler;
pub mod store;

pub use advisor::{AdvisorResult, AlternativeAdvisor, Verdict};
pub use config::EngineConfig;
pub use congestion::classify;
pub use error::{ModelError, Result, SchedulingError, StoreError};
pub use features::{extract_features, FeatureVector};
pub use heuristic::{HeuristicConfig, HeuristicModel};
pub use model::{Estimate, LinearModel, PredictionModel};
pub use models::{
    Appointment, AppointmentFilter, AppointmentStats, AppointmentStatus, AppointmentType,
    BookingRequest, CongestionLevel, DailyAnalytics, NewAppointment, Slot,
};
pub use predictor::{Prediction, PredictionSource, WaitTimePredictor};
pub use recommender::SlotRecommender;
pub use scheduler::SchedulingEngine;
pub use store::AppointmentStore;
