//! Position store: team -> instrument -> signed net position.
//!
//! The position-tracker pipeline stage is the sole writer; every other
//! stage only reads through `get`/`total_absolute`. A single store-wide
//! lock serializes writes, matching the venue's own per-book locking
//! convention rather than reaching for per-team locks the simulator's
//! scale doesn't need.

use std::collections::HashMap;

use parking_lot::RwLock;

pub struct PositionStore {
    teams: RwLock<HashMap<String, HashMap<String, i64>>>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self {
            teams: RwLock::new(HashMap::new()),
        }
    }

    /// Register a team with an empty position map. Idempotent: calling it
    /// for an already-known team is a no-op.
    pub fn initialize_team(&self, team_id: &str) {
        self.teams.write().entry(team_id.to_string()).or_default();
    }

    /// Apply a signed delta to one team's position in one instrument,
    /// lazily initializing both the team and the instrument entry.
    pub fn update(&self, team_id: &str, instrument_id: &str, signed_delta: i64) {
        let mut teams = self.teams.write();
        let positions = teams.entry(team_id.to_string()).or_default();
        *positions.entry(instrument_id.to_string()).or_insert(0) += signed_delta;
    }

    /// A defensive copy of every position held by `team_id`. An unknown
    /// team reads as empty without mutating the store.
    pub fn get_all(&self, team_id: &str) -> HashMap<String, i64> {
        self.teams
            .read()
            .get(team_id)
            .cloned()
            .unwrap_or_default()
    }

    /// A single instrument's position. Absent team or instrument reads as
    /// zero without mutation.
    pub fn get(&self, team_id: &str, instrument_id: &str) -> i64 {
        self.teams
            .read()
            .get(team_id)
            .and_then(|positions| positions.get(instrument_id))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of absolute position magnitudes across every instrument held by
    /// `team_id`.
    pub fn total_absolute(&self, team_id: &str) -> i64 {
        self.teams
            .read()
            .get(team_id)
            .map(|positions| positions.values().map(|v| v.abs()).sum())
            .unwrap_or(0)
    }
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_team_reads_as_zero_without_mutation() {
        let store = PositionStore::new();
        assert_eq!(store.get("TEAM_A", "SPX_4500_CALL"), 0);
        assert!(store.get_all("TEAM_A").is_empty());
    }

    #[test]
    fn update_accumulates_signed_deltas() {
        let store = PositionStore::new();
        store.update("TEAM_A", "SPX_4500_CALL", 10);
        store.update("TEAM_A", "SPX_4500_CALL", -3);
        assert_eq!(store.get("TEAM_A", "SPX_4500_CALL"), 7);
    }

    #[test]
    fn initialize_team_is_idempotent() {
        let store = PositionStore::new();
        store.update("TEAM_A", "SPX_4500_CALL", 5);
        store.initialize_team("TEAM_A");
        assert_eq!(store.get("TEAM_A", "SPX_4500_CALL"), 5);
    }

    #[test]
    fn total_absolute_sums_magnitudes_across_instruments() {
        let store = PositionStore::new();
        store.update("TEAM_A", "SPX_4500_CALL", 10);
        store.update("TEAM_A", "SPX_4500_PUT", -6);
        assert_eq!(store.total_absolute("TEAM_A"), 16);
    }
}
