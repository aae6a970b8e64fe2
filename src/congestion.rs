//! Wait-time to congestion level mapping.

use crate::models::CongestionLevel;

/// Upper bound (inclusive) of the Low band, in minutes.
pub const LOW_MAX_WAIT: f64 = 15.0;
/// Upper bound (inclusive) of the Moderate band, in minutes.
pub const MODERATE_MAX_WAIT: f64 = 30.0;

/// Boundary values belong to the lower category: 15 is Low, 30 is Moderate.
pub fn classify(wait_minutes: f64) -> CongestionLevel {
    if wait_minutes <= LOW_MAX_WAIT {
        CongestionLevel::Low
    } else if wait_minutes <= MODERATE_MAX_WAIT {
        CongestionLevel::Moderate
    } else {
        CongestionLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_fall_to_lower_category() {
        assert_eq!(classify(5.0), CongestionLevel::Low);
        assert_eq!(classify(15.0), CongestionLevel::Low);
        assert_eq!(classify(15.01), CongestionLevel::Moderate);
        assert_eq!(classify(30.0), CongestionLevel::Moderate);
        assert_eq!(classify(30.01), CongestionLevel::High);
        assert_eq!(classify(240.0), CongestionLevel::High);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(CongestionLevel::Low < CongestionLevel::Moderate);
        assert!(CongestionLevel::Moderate < CongestionLevel::High);
    }
}
