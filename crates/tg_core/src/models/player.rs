use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roster member as supplied by the caller.
///
/// Players are treated as input snapshots: the pipeline never mutates the
/// caller's copies. Output players carry `team_id`, `group_id` and
/// `unfulfilled_requests` stamped on fresh clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub gender: Gender,
    /// Base skill rating, typically 0-10.
    pub skill_rating: f32,
    /// Executive override; takes precedence over `skill_rating` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_skill_rating: Option<f32>,
    /// Free-text teammate requests. Index 0 is the must-have request,
    /// later entries are nice-to-have.
    #[serde(default)]
    pub teammate_requests: Vec<String>,
    /// Free-text names this player may never share a team with.
    #[serde(default)]
    pub avoid_requests: Vec<String>,
    #[serde(default)]
    pub is_handler: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    /// Diagnostic list filled after group formation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unfulfilled_requests: Vec<UnfulfilledRequest>,
}

impl Player {
    pub fn new(name: impl Into<String>, gender: Gender, skill_rating: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            gender,
            skill_rating,
            exec_skill_rating: None,
            teammate_requests: Vec::new(),
            avoid_requests: Vec::new(),
            is_handler: false,
            team_id: None,
            group_id: None,
            unfulfilled_requests: Vec::new(),
        }
    }

    /// Executive override when present, base rating otherwise.
    pub fn effective_skill(&self) -> f32 {
        self.exec_skill_rating.unwrap_or(self.skill_rating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Priority tier of a teammate request, derived from its list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestPriority {
    MustHave,
    NiceToHave,
}

impl RequestPriority {
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            RequestPriority::MustHave
        } else {
            RequestPriority::NiceToHave
        }
    }
}

/// Why a teammate request did not land both players in the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestFailure {
    /// No roster member matched the free-text name at the acceptance threshold.
    NotFound,
    /// An avoid relationship exists between requester and target.
    Conflict,
    /// The request was mutual but the group size cap truncated it.
    GroupTooLarge,
    /// The target never requested the requester back.
    NonReciprocal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfulfilledRequest {
    pub name: String,
    pub reason: RequestFailure,
    pub priority: RequestPriority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_skill_prefers_exec_override() {
        let mut player = Player::new("Ana", Gender::Female, 6.0);
        assert_eq!(player.effective_skill(), 6.0);

        player.exec_skill_rating = Some(8.5);
        assert_eq!(player.effective_skill(), 8.5);
    }

    #[test]
    fn test_request_priority_from_index() {
        assert_eq!(RequestPriority::from_index(0), RequestPriority::MustHave);
        assert_eq!(RequestPriority::from_index(1), RequestPriority::NiceToHave);
        assert_eq!(RequestPriority::from_index(5), RequestPriority::NiceToHave);
    }

    #[test]
    fn test_player_serde_round_trip() {
        let mut player = Player::new("Sam Lee", Gender::Other, 4.5);
        player.teammate_requests = vec!["Ana".to_string()];
        player.is_handler = true;

        let json = serde_json::to_string(&player).unwrap();
        let back: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(back, player);
    }
}
