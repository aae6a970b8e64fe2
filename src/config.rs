//! Engine configuration read from `WAITWISE_*` environment variables.
//!
//! Every setting has a default. A value that is blank or does not parse is
//! logged with `warn!` and replaced by that default.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::models::DEFAULT_DURATION_MINUTES;
use crate::recommender::DEFAULT_INTERVAL_MINUTES;

pub const STORE_PATH_VAR: &str = "WAITWISE_STORE_PATH";
pub const MODEL_PATH_VAR: &str = "WAITWISE_MODEL_PATH";
pub const SEED_VAR: &str = "WAITWISE_SEED";
pub const MODEL_TIMEOUT_VAR: &str = "WAITWISE_MODEL_TIMEOUT_MS";
pub const SLOT_INTERVAL_VAR: &str = "WAITWISE_SLOT_INTERVAL";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// JSON document backing the store; `None` keeps appointments in memory.
    pub store_path: Option<PathBuf>,
    /// Trained linear model weights; `None` runs heuristic-only.
    pub model_path: Option<PathBuf>,
    pub heuristic_seed: Option<u64>,
    pub model_timeout: Option<Duration>,
    pub slot_interval_minutes: u32,
    pub default_duration_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            store_path: None,
            model_path: None,
            heuristic_seed: None,
            model_timeout: None,
            slot_interval_minutes: DEFAULT_INTERVAL_MINUTES,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unparseable values are logged and
    /// replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let slot_interval_minutes = match parse_var::<u32>(SLOT_INTERVAL_VAR, value(SLOT_INTERVAL_VAR)) {
            Some(0) => {
                warn!("{} must be positive, using default", SLOT_INTERVAL_VAR);
                defaults.slot_interval_minutes
            }
            Some(minutes) => minutes,
            None => defaults.slot_interval_minutes,
        };

        let config = EngineConfig {
            store_path: value(STORE_PATH_VAR).map(PathBuf::from),
            model_path: value(MODEL_PATH_VAR).map(PathBuf::from),
            heuristic_seed: parse_var(SEED_VAR, value(SEED_VAR)),
            model_timeout: parse_var::<u64>(MODEL_TIMEOUT_VAR, value(MODEL_TIMEOUT_VAR))
                .map(Duration::from_millis),
            slot_interval_minutes,
            default_duration_minutes: defaults.default_duration_minutes,
        };

        if config.store_path.is_none() {
            warn!("{} not set, appointments will not be persisted", STORE_PATH_VAR);
        }

        config
    }

    pub fn is_persistent(&self) -> bool {
        self.store_path.is_some()
    }
}

fn parse_var<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{}='{}' is not valid, using default", key, raw);
            None
        }
    }
}
