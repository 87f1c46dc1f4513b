//! Team identity carried alongside an order through the pipeline.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Static identity/role record for a submitting team.
///
/// This is the core's notion of "who submitted this" without any
/// authentication mechanism attached — that belongs to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub team_id: String,
    pub team_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TeamInfo {
    pub fn new(team_id: impl Into<String>, team_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            team_name: team_name.into(),
            role: role.into(),
            created_at: Utc::now(),
        }
    }
}

/// Registry of every known team, so pipeline stages can resolve a
/// counterparty's role from just a trader id (the matching engine only
/// ever carries trader ids, never full team records, on resting orders).
#[derive(Default)]
pub struct TeamDirectory {
    teams: DashMap<String, TeamInfo>,
}

impl TeamDirectory {
    pub fn new() -> Self {
        Self {
            teams: DashMap::new(),
        }
    }

    pub fn register(&self, team: TeamInfo) {
        self.teams.insert(team.team_id.clone(), team);
    }

    pub fn get(&self, team_id: &str) -> Option<TeamInfo> {
        self.teams.get(team_id).map(|t| t.clone())
    }

    /// Role for a team id, or `"unknown"` if the team was never registered.
    pub fn role_of(&self, team_id: &str) -> String {
        self.teams
            .get(team_id)
            .map(|t| t.role.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_of_unknown_team_falls_back() {
        let directory = TeamDirectory::new();
        assert_eq!(directory.role_of("TEAM_Z"), "unknown");
    }

    #[test]
    fn registered_team_role_is_resolved() {
        let directory = TeamDirectory::new();
        directory.register(TeamInfo::new("TEAM_A", "Alpha", "market_maker"));
        assert_eq!(directory.role_of("TEAM_A"), "market_maker");
    }
}
