//! Accept-or-suggest decisions for a preferred slot.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::congestion::classify;
use crate::models::{round_to, CongestionLevel, Slot};
use crate::recommender::{sort_least_busy, SlotRecommender};

pub const DEFAULT_MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Accept,
    SuggestAlternative,
    NoBetterOption,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Accept => "ACCEPT",
            Verdict::SuggestAlternative => "SUGGEST_ALTERNATIVE",
            Verdict::NoBetterOption => "NO_BETTER_OPTION",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorResult {
    pub preferred: Slot,
    pub verdict: Verdict,
    /// `None` when the day was never searched (the preferred slot was
    /// accepted outright); `Some(vec![])` when the search found nothing.
    pub alternatives: Option<Vec<Slot>>,
    pub message: String,
}

impl AdvisorResult {
    pub fn alternatives(&self) -> &[Slot] {
        self.alternatives.as_deref().unwrap_or(&[])
    }
}

pub struct AlternativeAdvisor<'a> {
    recommender: &'a SlotRecommender,
}

impl<'a> AlternativeAdvisor<'a> {
    pub fn new(recommender: &'a SlotRecommender) -> Self {
        AlternativeAdvisor { recommender }
    }

    pub fn evaluate(
        &self,
        appointment_type: &str,
        preferred: NaiveDateTime,
        max_alternatives: usize,
        max_wait_preference: Option<f64>,
    ) -> AdvisorResult {
        let prediction = self.recommender.predictor().predict(appointment_type, preferred);
        let level = classify(prediction.wait_minutes);
        let preferred_slot = Slot {
            time: preferred,
            predicted_wait_minutes: round_to(prediction.wait_minutes, 1),
            confidence: round_to(prediction.confidence, 2),
            congestion_level: level,
        };

        if level == CongestionLevel::Low {
            debug!("Preferred slot {} is low congestion, accepting", preferred);
            return AdvisorResult {
                preferred: preferred_slot,
                verdict: Verdict::Accept,
                alternatives: None,
                message: "Great choice! This time has low congestion.".to_string(),
            };
        }

        let batch = self
            .recommender
            .batch_predict(appointment_type, preferred.date());

        let mut better: Vec<Slot> = match max_wait_preference {
            Some(max_wait) => batch
                .into_iter()
                .filter(|s| s.predicted_wait_minutes <= max_wait)
                .collect(),
            None => batch
                .into_iter()
                .filter(|s| s.congestion_level == CongestionLevel::Low)
                .collect(),
        };
        sort_least_busy(&mut better);
        better.truncate(max_alternatives);

        let (verdict, message) = match better.first() {
            Some(best) => (
                Verdict::SuggestAlternative,
                format!(
                    "Your preferred time has {} congestion ({:.0} min wait). \
                     We recommend {} ({:.0} min wait) instead, saving about {:.0} min.",
                    level,
                    prediction.wait_minutes,
                    best.label(),
                    best.predicted_wait_minutes,
                    (prediction.wait_minutes - best.predicted_wait_minutes).max(0.0)
                ),
            ),
            None => (
                Verdict::NoBetterOption,
                format!(
                    "No better options available. Your preferred time has {:.0} min predicted wait.",
                    prediction.wait_minutes
                ),
            ),
        };

        AdvisorResult {
            preferred: preferred_slot,
            verdict,
            alternatives: Some(better),
            message,
        }
    }
}
