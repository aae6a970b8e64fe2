//! Property tests for the wait-time predictor and congestion bands.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use waitwise::{classify, CongestionLevel, HeuristicConfig, WaitTimePredictor};

fn type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("consultation".to_string()),
        Just("follow-up".to_string()),
        Just("checkup".to_string()),
        Just("procedure".to_string()),
        Just("surgery".to_string()),
        "[a-z]{0,12}",
    ]
}

fn instant_strategy() -> impl Strategy<Value = NaiveDateTime> {
    // Any minute across roughly four years.
    (0i64..4 * 365 * 24 * 60).prop_map(|minutes| {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn predictions_stay_within_bounds(
        kind in type_strategy(),
        instant in instant_strategy(),
        seed in any::<u64>(),
    ) {
        let predictor = WaitTimePredictor::heuristic(HeuristicConfig::seeded(seed));
        let prediction = predictor.predict(&kind, instant);
        prop_assert!(
            (5.0..=240.0).contains(&prediction.wait_minutes),
            "wait {} out of range", prediction.wait_minutes
        );
        prop_assert!(
            (0.0..=1.0).contains(&prediction.confidence),
            "confidence {} out of range", prediction.confidence
        );
    }

    #[test]
    fn classification_is_monotone(a in 0.0f64..300.0, b in 0.0f64..300.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify(low) <= classify(high));
    }

    #[test]
    fn waits_above_thirty_are_high(wait in 30.000_001f64..240.0) {
        prop_assert_eq!(classify(wait), CongestionLevel::High);
    }
}
