//! Playout statistics.

use serde::{Deserialize, Serialize};

/// Counters accumulated across playouts until reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutStats {
    /// Playouts run.
    pub playouts: u64,

    /// Plies applied, both paths.
    pub plies: u64,

    /// Plies taken by a fast path.
    pub fast_plies: u64,

    /// Plies taken by the general path.
    pub general_plies: u64,

    /// Passes inserted because the mover had no legal move.
    pub passes_inserted: u64,

    /// Wall time spent in playouts (microseconds).
    pub time_us: u64,
}

impl PlayoutStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn plies_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.plies as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    #[must_use]
    pub fn avg_plies_per_playout(&self) -> f64 {
        if self.playouts == 0 {
            0.0
        } else {
            self.plies as f64 / self.playouts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let mut stats = PlayoutStats::new();
        assert_eq!(stats.plies_per_second(), 0.0);

        stats.playouts = 4;
        stats.plies = 2000;
        stats.time_us = 1_000_000;
        assert_eq!(stats.plies_per_second(), 2000.0);
        assert_eq!(stats.avg_plies_per_playout(), 500.0);

        stats.reset();
        assert_eq!(stats, PlayoutStats::default());
    }
}
