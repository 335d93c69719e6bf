//! Difficulty calculation for masked targets

use crate::MaskedTarget;

/// Expected number of candidates to try before the target is hit.
///
/// Each constrained bit halves the chance of a random digest matching, so the
/// difficulty is `2^mask_bits`. A target with bits outside its mask can never
/// be hit and reports infinity.
pub fn calculate_difficulty(target: &MaskedTarget) -> f64 {
    if target.has_stray_bits() {
        return f64::INFINITY;
    }
    2.0_f64.powi(target.mask_bits() as i32)
}

/// Format difficulty as human-readable string
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty.is_infinite() {
        "impossible".to_string()
    } else if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.0}", difficulty)
    }
}

/// Estimate seconds until a match is found with 50% probability
pub fn estimate_time_50pct(difficulty: f64, candidates_per_second: f64) -> f64 {
    // ln(0.5) / ln(1 - 1/difficulty) ~= difficulty * ln 2 for large difficulty
    (difficulty * std::f64::consts::LN_2) / candidates_per_second
}
