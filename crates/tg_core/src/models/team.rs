use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::player::{Gender, Player};

/// A team plus derived membership stats.
///
/// Invariant: `average_skill`, `gender_breakdown` and `handler_count` are a
/// pure function of `players`. All membership changes go through
/// [`Team::add_player`] / [`Team::remove_player`], which recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<Player>,
    pub average_skill: f32,
    pub gender_breakdown: GenderBreakdown,
    pub handler_count: usize,
}

impl Team {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players: Vec::new(),
            average_skill: 0.0,
            gender_breakdown: GenderBreakdown::default(),
            handler_count: 0,
        }
    }

    pub fn add_player(&mut self, mut player: Player) {
        player.team_id = Some(self.id);
        self.players.push(player);
        self.recompute();
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> Option<Player> {
        let pos = self.players.iter().position(|p| p.id == player_id)?;
        let mut player = self.players.remove(pos);
        player.team_id = None;
        self.recompute();
        Some(player)
    }

    pub fn contains(&self, player_id: Uuid) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn remaining_slots(&self, max_team_size: usize) -> usize {
        max_team_size.saturating_sub(self.players.len())
    }

    /// Rebuild the derived fields from current membership.
    pub fn recompute(&mut self) {
        self.average_skill = if self.players.is_empty() {
            0.0
        } else {
            let sum: f32 = self.players.iter().map(Player::effective_skill).sum();
            sum / self.players.len() as f32
        };
        self.gender_breakdown = GenderBreakdown::of(&self.players);
        self.handler_count = self.players.iter().filter(|p| p.is_handler).count();
    }
}

/// Per-gender membership counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderBreakdown {
    pub female: usize,
    pub male: usize,
    pub other: usize,
}

impl GenderBreakdown {
    pub fn of(players: &[Player]) -> Self {
        let mut counts = Self::default();
        for player in players {
            match player.gender {
                Gender::Female => counts.female += 1,
                Gender::Male => counts.male += 1,
                Gender::Other => counts.other += 1,
            }
        }
        counts
    }

    pub fn count(&self, gender: Gender) -> usize {
        match gender {
            Gender::Female => self.female,
            Gender::Male => self.male,
            Gender::Other => self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, gender: Gender, skill: f32, handler: bool) -> Player {
        let mut p = Player::new(name, gender, skill);
        p.is_handler = handler;
        p
    }

    #[test]
    fn test_derived_fields_track_membership() {
        let mut team = Team::empty("Team 1");
        assert_eq!(team.average_skill, 0.0);

        team.add_player(player("Ana", Gender::Female, 8.0, true));
        team.add_player(player("Ben", Gender::Male, 4.0, false));

        assert_eq!(team.len(), 2);
        assert!((team.average_skill - 6.0).abs() < f32::EPSILON);
        assert_eq!(team.gender_breakdown.female, 1);
        assert_eq!(team.gender_breakdown.male, 1);
        assert_eq!(team.handler_count, 1);
    }

    #[test]
    fn test_remove_player_recomputes_and_clears_team_id() {
        let mut team = Team::empty("Team 1");
        let ana = player("Ana", Gender::Female, 8.0, true);
        let ana_id = ana.id;
        team.add_player(ana);
        team.add_player(player("Ben", Gender::Male, 4.0, false));

        let removed = team.remove_player(ana_id).unwrap();
        assert_eq!(removed.team_id, None);
        assert_eq!(team.len(), 1);
        assert!((team.average_skill - 4.0).abs() < f32::EPSILON);
        assert_eq!(team.handler_count, 0);
    }

    #[test]
    fn test_add_player_stamps_team_id() {
        let mut team = Team::empty("Team 1");
        team.add_player(player("Ana", Gender::Female, 5.0, false));
        assert_eq!(team.players[0].team_id, Some(team.id));
    }

    #[test]
    fn test_remaining_slots_saturates() {
        let mut team = Team::empty("Team 1");
        team.add_player(player("Ana", Gender::Female, 5.0, false));
        assert_eq!(team.remaining_slots(4), 3);
        assert_eq!(team.remaining_slots(0), 0);
    }
}
