//! Feature extraction for wait-time prediction.

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::f64::consts::PI;

use crate::models::AppointmentType;

/// Number of features produced per (type, instant) pair.
pub const FEATURE_COUNT: usize = 9;

/// Fixed-order model input:
/// `[hour, weekday, day_of_month, month, type_code, hour_sin, hour_cos, weekday_sin, weekday_cos]`.
///
/// Weekday counts from Monday = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn hour(&self) -> u32 {
        self.0[0] as u32
    }

    pub fn weekday(&self) -> u32 {
        self.0[1] as u32
    }
}

pub fn extract_features(appointment_type: &str, instant: NaiveDateTime) -> FeatureVector {
    let hour = instant.hour() as f64;
    let weekday = instant.weekday().num_days_from_monday() as f64;
    let hour_angle = 2.0 * PI * hour / 24.0;
    let weekday_angle = 2.0 * PI * weekday / 7.0;

    FeatureVector([
        hour,
        weekday,
        instant.day() as f64,
        instant.month() as f64,
        AppointmentType::code_for(appointment_type) as f64,
        hour_angle.sin(),
        hour_angle.cos(),
        weekday_angle.sin(),
        weekday_angle.cos(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn extracts_calendar_and_cyclical_features() {
        // 2026-01-20 is a Tuesday.
        let instant = NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(6, 30, 0)
            .unwrap();
        let features = extract_features("Surgery", instant);
        let f = features.as_slice();

        assert_eq!(f.len(), FEATURE_COUNT);
        assert_eq!(&f[..5], &[6.0, 1.0, 20.0, 1.0, 3.0]);
        assert!((f[5] - 1.0).abs() < 1e-12);
        assert!(f[6].abs() < 1e-12);
        assert!((f[7] - (2.0 * PI / 7.0).sin()).abs() < 1e-12);
        assert!((f[8] - (2.0 * PI / 7.0).cos()).abs() < 1e-12);
    }

    #[test]
    fn unknown_type_encodes_as_zero() {
        let instant = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let features = extract_features("dentist", instant);
        assert_eq!(features.0[4], 0.0);
        assert_eq!(features.hour(), 10);
        assert_eq!(features.weekday(), 0);
    }
}
