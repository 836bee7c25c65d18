use serde::{Deserialize, Serialize};

/// League-level generation settings supplied by the caller.
///
/// Precondition (validated by the caller, not here):
/// `min_females + min_males <= max_team_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueConfig {
    pub max_team_size: usize,
    pub min_females: usize,
    pub min_males: usize,
    /// Fixed team count; when unset the count is derived from roster size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_teams: Option<usize>,
    #[serde(default = "default_allow_mixed_gender")]
    pub allow_mixed_gender: bool,
}

fn default_allow_mixed_gender() -> bool {
    true
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            max_team_size: 10,
            min_females: 0,
            min_males: 0,
            target_teams: None,
            allow_mixed_gender: true,
        }
    }
}

impl LeagueConfig {
    /// Number of team shells to create for a roster of `roster_len` players.
    pub fn team_count(&self, roster_len: usize) -> usize {
        if let Some(target) = self.target_teams {
            return target;
        }
        if roster_len == 0 || self.max_team_size == 0 {
            return 0;
        }
        roster_len.div_ceil(self.max_team_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_count_uses_target_when_set() {
        let config = LeagueConfig { target_teams: Some(3), ..LeagueConfig::default() };
        assert_eq!(config.team_count(100), 3);
        assert_eq!(config.team_count(0), 3);
    }

    #[test]
    fn test_team_count_derives_from_roster() {
        let config = LeagueConfig { max_team_size: 4, ..LeagueConfig::default() };
        assert_eq!(config.team_count(12), 3);
        assert_eq!(config.team_count(13), 4);
        assert_eq!(config.team_count(0), 0);
    }

    #[test]
    fn test_zero_target_teams_is_allowed() {
        let config = LeagueConfig { target_teams: Some(0), ..LeagueConfig::default() };
        assert_eq!(config.team_count(10), 0);
    }
}
