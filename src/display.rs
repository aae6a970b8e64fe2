//! Plain-text rendering for slots, analytics and advice.

use std::fmt::Write;

use crate::advisor::{AdvisorResult, Verdict};
use crate::models::{DailyAnalytics, Slot};

/// Ranked slot table. Rank is the 1-based position in `slots`.
pub fn format_slot_table(slots: &[Slot]) -> String {
    if slots.is_empty() {
        return "No slots available\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6}{:<8}{:>10}{:>12}  {}",
        "Rank", "Time", "Wait", "Confidence", "Congestion"
    );
    let _ = writeln!(out, "{}", "-".repeat(60));
    for (i, slot) in slots.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<6}{:<8}{:>6.1} min{:>11.0}%  {}",
            i + 1,
            slot.label(),
            slot.predicted_wait_minutes,
            slot.confidence * 100.0,
            slot.congestion_level.description()
        );
    }
    out
}

pub fn format_analytics(analytics: &DailyAnalytics) -> String {
    format!(
        "Slots analyzed: {}\n\
         Average wait: {:.1} min (min {:.1}, max {:.1}, std dev {:.1})\n\
         Congestion: {} low / {} moderate / {} high\n\
         Availability score: {:.1}%\n",
        analytics.total_slots,
        analytics.average_wait,
        analytics.min_wait,
        analytics.max_wait,
        analytics.std_dev,
        analytics.low_congestion_slots,
        analytics.moderate_congestion_slots,
        analytics.high_congestion_slots,
        analytics.availability_score
    )
}

pub fn format_advice(result: &AdvisorResult) -> String {
    let preferred = &result.preferred;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Preferred {}: {:.1} min wait ({})",
        preferred.time.format("%Y-%m-%d %H:%M"),
        preferred.predicted_wait_minutes,
        preferred.congestion_level
    );
    let _ = writeln!(out, "Verdict: {}", result.verdict);
    let _ = writeln!(out, "{}", result.message);

    if result.verdict == Verdict::SuggestAlternative {
        let _ = writeln!(out, "\nAlternatives:");
        out.push_str(&format_slot_table(result.alternatives()));
    }
    out
}
