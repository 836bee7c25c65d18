//! Post-generation move primitive for manual adjustments.

use tracing::debug;
use uuid::Uuid;

use crate::avoid::AvoidSet;
use crate::error::MoveError;
use crate::models::{LeagueConfig, Player, PlayerGroup, Team};

/// Move a player onto `target_team`, or to the unassigned list when
/// `target_team` is `None`.
///
/// Rejections:
/// - splitting a formed group across locations, unless `force` is set;
/// - an avoid conflict in the destination team (never force-overridable);
/// - a full destination team.
pub fn move_player(
    teams: &mut [Team],
    unassigned: &mut Vec<Player>,
    groups: &[PlayerGroup],
    avoid: &AvoidSet,
    config: &LeagueConfig,
    player_id: Uuid,
    target_team: Option<Uuid>,
    force: bool,
) -> Result<(), MoveError> {
    let source_team = teams.iter().position(|t| t.contains(player_id));
    let in_unassigned = unassigned.iter().position(|p| p.id == player_id);
    if source_team.is_none() && in_unassigned.is_none() {
        return Err(MoveError::PlayerNotFound(player_id));
    }

    let target_index = match target_team {
        Some(team_id) => {
            let index = teams
                .iter()
                .position(|t| t.id == team_id)
                .ok_or(MoveError::TeamNotFound(team_id))?;
            if source_team == Some(index) {
                return Ok(()); // already there
            }
            Some(index)
        }
        None => {
            if source_team.is_none() {
                return Ok(()); // already unassigned
            }
            None
        }
    };

    if let Some(index) = target_index {
        let team = &teams[index];
        if team.len() >= config.max_team_size {
            return Err(MoveError::TeamFull {
                name: team.name.clone(),
                size: team.len(),
                max_team_size: config.max_team_size,
            });
        }
        let player_name = player_name(teams, unassigned, player_id);
        if let Some(other) = team.players.iter().find(|p| avoid.blocks(p.id, player_id)) {
            return Err(MoveError::AvoidConflict {
                player: player_name,
                other: other.name.clone(),
            });
        }
    }

    if !force {
        check_group_atomicity(teams, groups, player_id, target_team)?;
    }

    let player = match source_team {
        Some(index) => teams[index]
            .remove_player(player_id)
            .ok_or(MoveError::PlayerNotFound(player_id))?,
        None => unassigned.remove(in_unassigned.ok_or(MoveError::PlayerNotFound(player_id))?),
    };

    debug!(player = %player.name, target = ?target_team, force, "moving player");
    match target_index {
        Some(index) => teams[index].add_player(player),
        None => unassigned.push(player),
    }
    Ok(())
}

/// Every other member of the player's group must already sit at the move
/// destination, otherwise the move splits the group.
fn check_group_atomicity(
    teams: &[Team],
    groups: &[PlayerGroup],
    player_id: Uuid,
    target_team: Option<Uuid>,
) -> Result<(), MoveError> {
    let Some(group) = groups.iter().find(|g| g.contains(player_id)) else {
        return Ok(());
    };

    for &member in &group.player_ids {
        if member == player_id {
            continue;
        }
        let location = teams.iter().find(|t| t.contains(member)).map(|t| t.id);
        if location != target_team {
            return Err(MoveError::SplitsGroup { label: group.label.clone() });
        }
    }
    Ok(())
}

fn player_name(teams: &[Team], unassigned: &[Player], player_id: Uuid) -> String {
    teams
        .iter()
        .flat_map(|t| t.players.iter())
        .chain(unassigned.iter())
        .find(|p| p.id == player_id)
        .map(|p| p.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::NameResolver;
    use crate::models::Gender;

    struct Fixture {
        teams: Vec<Team>,
        unassigned: Vec<Player>,
        groups: Vec<PlayerGroup>,
        avoid: AvoidSet,
        config: LeagueConfig,
    }

    fn fixture() -> Fixture {
        let mut ana = Player::new("Ana Diaz", Gender::Female, 6.0);
        let ben = Player::new("Ben Ko", Gender::Male, 5.0);
        let cai = Player::new("Cai Wu", Gender::Other, 4.0);
        let dee = Player::new("Dee Fox", Gender::Female, 7.0);
        ana.avoid_requests = vec!["Dee Fox".to_string()];

        let group = PlayerGroup::new(0, vec![ben.id, cai.id]);

        let mut team_one = Team::empty("Team 1");
        team_one.add_player(ana.clone());
        let mut team_two = Team::empty("Team 2");
        team_two.add_player(ben.clone());
        team_two.add_player(cai.clone());

        let roster = vec![ana, ben, cai, dee.clone()];
        let mut resolver = NameResolver::new();
        let avoid = AvoidSet::build(&roster, &mut resolver);

        Fixture {
            teams: vec![team_one, team_two],
            unassigned: vec![dee],
            groups: vec![group],
            avoid,
            config: LeagueConfig { max_team_size: 3, ..LeagueConfig::default() },
        }
    }

    #[test]
    fn test_move_unassigned_player_onto_team() {
        let mut f = fixture();
        let dee = f.unassigned[0].id;
        let target = f.teams[1].id;

        move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            dee,
            Some(target),
            false,
        )
        .unwrap();

        assert!(f.unassigned.is_empty());
        assert!(f.teams[1].contains(dee));
        assert_eq!(f.teams[1].players.last().unwrap().team_id, Some(target));
    }

    #[test]
    fn test_move_rejects_avoid_conflict_even_with_force() {
        let mut f = fixture();
        let dee = f.unassigned[0].id;
        let target = f.teams[0].id; // Ana avoids Dee

        let err = move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            dee,
            Some(target),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, MoveError::AvoidConflict { .. }));
    }

    #[test]
    fn test_move_rejects_group_split_without_force() {
        let mut f = fixture();
        let ben = f.teams[1].players[0].id;
        let target = f.teams[0].id;

        let err = move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            ben,
            Some(target),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MoveError::SplitsGroup { .. }));
    }

    #[test]
    fn test_force_overrides_group_split() {
        let mut f = fixture();
        let ben = f.teams[1].players[0].id;
        let target = f.teams[0].id;

        move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            ben,
            Some(target),
            true,
        )
        .unwrap();
        assert!(f.teams[0].contains(ben));
    }

    #[test]
    fn test_move_to_unassigned_splits_group_without_force() {
        let mut f = fixture();
        let cai = f.teams[1].players[1].id;

        let err = move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            cai,
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MoveError::SplitsGroup { .. }));
    }

    #[test]
    fn test_move_rejects_full_team() {
        let mut f = fixture();
        f.config.max_team_size = 2; // team two already holds 2
        let dee = f.unassigned[0].id;
        let target = f.teams[1].id;

        let err = move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            dee,
            Some(target),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MoveError::TeamFull { .. }));
    }

    #[test]
    fn test_move_unknown_player_errors() {
        let mut f = fixture();
        let err = move_player(
            &mut f.teams,
            &mut f.unassigned,
            &f.groups,
            &f.avoid,
            &f.config,
            Uuid::new_v4(),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MoveError::PlayerNotFound(_)));
    }
}
