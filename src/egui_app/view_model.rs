//! Pure formatting helpers shared by the egui renderer.

use crate::dataset::Outcome;

/// Held-out accuracy as a percentage with one decimal, e.g. `91.7%`.
pub fn accuracy_label(accuracy: f64) -> String {
    format!("{:.1}%", accuracy * 100.0)
}

/// R² with two decimals.
pub fn r2_label(r2: f64) -> String {
    format!("{r2:.2}")
}

/// Predicted semester percentage with two decimals.
pub fn percentage_label(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "PASS",
        Outcome::Fail => "FAIL",
    }
}

pub fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "You are on track for success!",
        Outcome::Fail => "You might need to improve your study plan.",
    }
}

/// `total/max` as shown under the marks grid.
pub fn total_label(total: u32, max: u32) -> String {
    format!("{total}/{max}")
}
