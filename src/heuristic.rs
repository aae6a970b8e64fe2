//! Rule-based wait estimator.
//!
//! Used when no trained model is configured and as the fallback whenever
//! the trained model fails. Randomness comes from an owned, seedable RNG so
//! runs are reproducible under a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::sync::Mutex;

use crate::error::ModelError;
use crate::features::FeatureVector;
use crate::model::{Estimate, PredictionModel};
use crate::models::AppointmentType;

pub const MIN_WAIT_MINUTES: f64 = 5.0;
pub const MAX_WAIT_MINUTES: f64 = 240.0;

const BASE_WAIT_MINUTES: f64 = 20.0;
const BASE_CONFIDENCE: f64 = 0.75;
/// Noise is cut off at this many standard deviations.
const NOISE_BOUND_SIGMAS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicConfig {
    /// Standard deviation of the Gaussian noise added to each estimate.
    pub noise_std_dev: f64,
    /// Half-width of the uniform band around the base confidence.
    pub confidence_jitter: f64,
    /// Fixed RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        HeuristicConfig {
            noise_std_dev: 5.0,
            confidence_jitter: 0.1,
            seed: None,
        }
    }
}

impl HeuristicConfig {
    pub fn seeded(seed: u64) -> Self {
        HeuristicConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// No noise and no confidence jitter: the bare rule table.
    pub fn noiseless() -> Self {
        HeuristicConfig {
            noise_std_dev: 0.0,
            confidence_jitter: 0.0,
            seed: Some(0),
        }
    }
}

pub struct HeuristicModel {
    config: HeuristicConfig,
    rng: Mutex<StdRng>,
}

impl HeuristicModel {
    pub fn new(config: HeuristicConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        HeuristicModel {
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(HeuristicConfig::seeded(seed))
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Estimate for a feature vector. Never fails.
    pub fn estimate(&self, features: &FeatureVector) -> Estimate {
        let multiplier = multiplier_for_code(features.as_slice()[4]);
        let base = rule_wait(features.hour(), features.weekday(), multiplier);

        // A panicked holder cannot leave an RNG in an invalid state.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        let noise = if self.config.noise_std_dev > 0.0 {
            bounded_gaussian(&mut *rng, self.config.noise_std_dev)
        } else {
            0.0
        };
        let jitter = if self.config.confidence_jitter > 0.0 {
            rng.gen_range(-self.config.confidence_jitter..self.config.confidence_jitter)
        } else {
            0.0
        };

        Estimate {
            wait_minutes: (base + noise).clamp(MIN_WAIT_MINUTES, MAX_WAIT_MINUTES),
            confidence: Some((BASE_CONFIDENCE + jitter).clamp(0.0, 1.0)),
        }
    }
}

impl PredictionModel for HeuristicModel {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn infer(&self, features: &FeatureVector) -> Result<Estimate, ModelError> {
        Ok(self.estimate(features))
    }
}

/// Noise-free rule table.
///
/// Peak hours 9-12 and 14-16 add 30 minutes, the 12-14 lunch rush adds 25,
/// hours outside 9-17 subtract 10. Weekdays add 15, weekends subtract 10.
/// The sum is scaled by the appointment type's multiplier.
pub fn rule_wait(hour: u32, weekday: u32, multiplier: f64) -> f64 {
    let mut wait = BASE_WAIT_MINUTES;

    if (9..12).contains(&hour) || (14..16).contains(&hour) {
        wait += 30.0;
    } else if (12..14).contains(&hour) {
        wait += 25.0;
    } else if !(9..17).contains(&hour) {
        wait -= 10.0;
    }

    if weekday < 5 {
        wait += 15.0;
    } else {
        wait -= 10.0;
    }

    wait * multiplier
}

fn multiplier_for_code(code: f64) -> f64 {
    AppointmentType::ALL
        .iter()
        .find(|t| t.code() as f64 == code)
        .map(|t| t.wait_multiplier())
        .unwrap_or(1.0)
}

/// Box-Muller sample from N(0, std_dev), truncated to +/- 3 sigma.
fn bounded_gaussian<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z.clamp(-NOISE_BOUND_SIGMAS, NOISE_BOUND_SIGMAS) * std_dev
}
