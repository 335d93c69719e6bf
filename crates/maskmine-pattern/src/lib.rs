//! maskmine Target Matching
//!
//! Masked digest targets: bit/byte prefix and suffix builders, word-wise
//! masking, comparison, and difficulty estimates.

mod difficulty;
mod mask;

pub use difficulty::{calculate_difficulty, estimate_time_50pct, format_difficulty};
pub use mask::{apply_mask, MaskedTarget, TargetError};
