//! Live search statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe search statistics
#[derive(Debug)]
pub struct SearchStats {
    /// Total candidates hashed
    candidates_tested: AtomicU64,
    /// Start time
    start_time: Instant,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment candidates tested by amount
    pub fn add_candidates(&self, count: u64) {
        self.candidates_tested.fetch_add(count, Ordering::Relaxed);
    }

    /// Get total candidates tested
    pub fn total_candidates(&self) -> u64 {
        self.candidates_tested.load(Ordering::Relaxed)
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get candidates per second
    pub fn candidates_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_candidates() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Fraction of a search space of `space` candidates already covered
    pub fn progress(&self, space: u128) -> f64 {
        if space == 0 {
            return 1.0;
        }
        (self.total_candidates() as f64 / space as f64).min(1.0)
    }

    /// Seconds until a match is found with 50% probability, or infinity if
    /// the space runs out first
    fn time_to_even_odds(&self, difficulty: f64, space: u128) -> f64 {
        let tested = self.total_candidates() as f64;
        let rate = self.candidates_per_second();
        if !difficulty.is_finite() {
            return f64::INFINITY;
        }

        let needed = difficulty * std::f64::consts::LN_2;
        if needed > space as f64 {
            return f64::INFINITY;
        }
        if tested >= needed {
            return 0.0;
        }
        if rate > 0.0 {
            (needed - tested) / rate
        } else {
            f64::INFINITY
        }
    }

    /// Seconds until the whole space of `space` candidates is exhausted
    fn time_to_exhaust(&self, space: u128) -> f64 {
        let remaining = space.saturating_sub(u128::from(self.total_candidates()));
        let rate = self.candidates_per_second();
        match remaining {
            0 => 0.0,
            _ if rate > 0.0 => remaining as f64 / rate,
            _ => f64::INFINITY,
        }
    }

    /// One-line status for a search over `space` candidates
    pub fn format(&self, difficulty: f64, space: u128) -> String {
        let tested = self.total_candidates();

        let hit = if difficulty.is_finite() && difficulty > 0.0 {
            1.0 - (-(tested as f64) / difficulty).exp()
        } else {
            0.0
        };

        format!(
            "[{:.2} MH/s][{}/{} {:.1}%][Hit {:.1}%][50% in {}][Space in {}]",
            self.candidates_per_second() / 1_000_000.0,
            format_count(u128::from(tested)),
            format_count(space),
            self.progress(space) * 100.0,
            hit * 100.0,
            format_duration(self.time_to_even_odds(difficulty, space)),
            format_duration(self.time_to_exhaust(space)),
        )
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self {
            candidates_tested: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

fn format_count(count: u128) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "G"), (1e6, "M"), (1e3, "K")];

    let value = count as f64;
    if value >= 1e15 {
        return format!("{:.2e}", value);
    }
    UNITS
        .iter()
        .find(|(scale, _)| value >= *scale)
        .map_or_else(
            || count.to_string(),
            |(scale, unit)| format!("{:.2}{}", value / scale, unit),
        )
}

/// Format seconds as a short human-readable duration
pub fn format_duration(seconds: f64) -> String {
    if seconds <= 0.0 {
        return "now".to_string();
    }
    if !seconds.is_finite() {
        return "never".to_string();
    }
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.0}s", seconds)
    } else if seconds < 3600.0 {
        format!("{:.0}m", seconds / 60.0)
    } else if seconds < 86400.0 {
        format!("{:.1}h", seconds / 3600.0)
    } else if seconds < 86400.0 * 365.0 {
        format!("{:.1}d", seconds / 86400.0)
    } else {
        format!("{:.1}y", seconds / (86400.0 * 365.0))
    }
}
