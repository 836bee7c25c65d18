//! End-to-end team generation pipeline.
//!
//! One call in, one result out: resolve names, form affinity groups, place
//! constraint units, optionally balance skill, collect stats. No global
//! state; concurrent invocations must not share Player/Team values.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::assignment::{build_units, AssignMode, ConstraintAssigner};
use crate::avoid::AvoidSet;
use crate::balance::{BalanceReport, BalancerConfig, SkillBalancer};
use crate::grouping::{
    self, ClassifiedRequest, ConflictKind, DroppedRequest, NearMiss, RequestConflict,
    ResolutionWarning,
};
use crate::matching::NameResolver;
use crate::models::{LeagueConfig, Player, PlayerGroup, Team};
use crate::stats::{collect_stats, GenerationStats};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub mode: AssignMode,
    /// Seed for reproducible runs; entropy-seeded when unset.
    pub seed: Option<u64>,
    /// Whether to run the skill balancer after balanced-mode assignment.
    pub balance: bool,
    pub balancer: BalancerConfig,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            mode: AssignMode::Balanced,
            seed: None,
            balance: true,
            balancer: BalancerConfig::default(),
        }
    }
}

/// Everything surfaced for explanation, none of it blocking.
#[derive(Debug, Clone, Default)]
pub struct GenerationDiagnostics {
    pub dropped: Vec<DroppedRequest>,
    pub warnings: Vec<ResolutionWarning>,
    pub conflicts: Vec<RequestConflict>,
    pub near_misses: Vec<NearMiss>,
    pub outcomes: Vec<ClassifiedRequest>,
    pub balance: Option<BalanceReport>,
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub teams: Vec<Team>,
    pub unassigned: Vec<Player>,
    pub groups: Vec<PlayerGroup>,
    pub diagnostics: GenerationDiagnostics,
    pub stats: GenerationStats,
}

/// Generate teams for a roster under the given config.
///
/// `custom_groups` are caller-side explicit groups placed before any
/// formed mutual groups. Degenerate inputs (empty roster, zero target
/// teams) yield empty results, never errors.
pub fn generate_teams(
    players: &[Player],
    config: &LeagueConfig,
    custom_groups: &[PlayerGroup],
    options: &GenerationOptions,
) -> GenerationResult {
    let started = Instant::now();
    info!(roster = players.len(), mode = %options.mode, "generating teams");

    let mut resolver = NameResolver::new();
    let avoid = AvoidSet::build(players, &mut resolver);
    let formation = grouping::form_groups(players, &avoid, &mut resolver);

    let units = build_units(&formation.players, custom_groups, &formation.groups);
    let mut rng = match options.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let assigner = ConstraintAssigner::new(config, &avoid);
    let mut outcome = assigner.assign(&formation.players, &units, options.mode, &mut rng);

    let balance = if options.mode == AssignMode::Balanced && options.balance {
        Some(SkillBalancer::new(options.balancer).balance(&mut outcome.teams, config, &avoid))
    } else {
        None
    };

    let conflicts_detected = formation
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::AvoidVsRequest)
        .count();
    let stats = collect_stats(
        &formation.players,
        &outcome.teams,
        &outcome.unassigned,
        conflicts_detected,
        &avoid,
        &mut resolver,
        started.elapsed(),
    );

    info!(
        teams = outcome.teams.len(),
        assigned = stats.assigned_players,
        unassigned = stats.unassigned_players,
        duration_ms = stats.duration_ms,
        "generation complete"
    );
    GenerationResult {
        teams: outcome.teams,
        unassigned: outcome.unassigned,
        groups: formation.groups,
        diagnostics: GenerationDiagnostics {
            dropped: formation.dropped,
            warnings: formation.warnings,
            conflicts: formation.conflicts,
            near_misses: formation.near_misses,
            outcomes: formation.outcomes,
            balance,
        },
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn player(name: &str, skill: f32) -> Player {
        Player::new(name, Gender::Other, skill)
    }

    fn seeded() -> GenerationOptions {
        GenerationOptions { seed: Some(42), ..GenerationOptions::default() }
    }

    fn team_of(result: &GenerationResult, id: Uuid) -> Option<Uuid> {
        result.teams.iter().find(|t| t.contains(id)).map(|t| t.id)
    }

    #[test]
    fn test_mutual_pair_lands_together() {
        // 4 players, A and B mutually request each other, 2 teams of 2.
        let mut a = player("Ana Diaz", 5.0);
        let mut b = player("Ben Ko", 5.0);
        a.teammate_requests = vec!["Ben Ko".to_string()];
        b.teammate_requests = vec!["Ana Diaz".to_string()];
        let roster = vec![a.clone(), b.clone(), player("Cai Wu", 5.0), player("Dee Fox", 5.0)];

        let config =
            LeagueConfig { max_team_size: 2, target_teams: Some(2), ..LeagueConfig::default() };
        let result = generate_teams(&roster, &config, &[], &seeded());

        assert_eq!(result.teams.len(), 2);
        assert!(result.unassigned.is_empty());
        assert_eq!(team_of(&result, a.id), team_of(&result, b.id));
        assert!(team_of(&result, a.id).is_some());
    }

    #[test]
    fn test_custom_group_of_three_keeps_a_team() {
        let roster: Vec<Player> = (0..12).map(|i| player(&format!("P {i}"), 5.0)).collect();
        let trio: Vec<Uuid> = roster[..3].iter().map(|p| p.id).collect();
        let custom = PlayerGroup::new(0, trio.clone());

        let config =
            LeagueConfig { max_team_size: 4, target_teams: Some(3), ..LeagueConfig::default() };
        let result = generate_teams(&roster, &config, &[custom], &seeded());

        let homes: Vec<Option<Uuid>> =
            trio.iter().map(|&id| team_of(&result, id)).collect();
        assert!(homes.iter().all(|h| h.is_some()), "no group member may be unassigned");
        assert!(homes.windows(2).all(|w| w[0] == w[1]));

        let group_team =
            result.teams.iter().find(|t| t.contains(trio[0])).unwrap();
        assert!(group_team.len() <= 4, "group of 3 takes at most 1 extra player");
    }

    #[test]
    fn test_manual_mode_yields_empty_shells() {
        let mut roster: Vec<Player> =
            (0..10).map(|i| player(&format!("P {i}"), 5.0)).collect();
        // Even a mutual pair stays unassigned in manual mode.
        roster[0].teammate_requests = vec!["P 1".to_string()];
        roster[1].teammate_requests = vec!["P 0".to_string()];

        let config = LeagueConfig { target_teams: Some(3), ..LeagueConfig::default() };
        let options = GenerationOptions { mode: AssignMode::Manual, ..seeded() };
        let result = generate_teams(&roster, &config, &[], &options);

        assert_eq!(result.teams.len(), 3);
        assert!(result.teams.iter().all(Team::is_empty));
        assert_eq!(result.unassigned.len(), 10);
        assert_eq!(result.groups.len(), 1);
    }

    #[test]
    fn test_empty_roster_yields_empty_result() {
        let result =
            generate_teams(&[], &LeagueConfig::default(), &[], &seeded());
        assert!(result.teams.is_empty());
        assert!(result.unassigned.is_empty());
        assert_eq!(result.stats, GenerationStats::default());
    }

    #[test]
    fn test_zero_target_teams_unassigns_everyone() {
        let roster: Vec<Player> = (0..4).map(|i| player(&format!("P {i}"), 5.0)).collect();
        let config = LeagueConfig { target_teams: Some(0), ..LeagueConfig::default() };
        let result = generate_teams(&roster, &config, &[], &seeded());

        assert!(result.teams.is_empty());
        assert_eq!(result.unassigned.len(), 4);
    }

    #[test]
    fn test_same_seed_reproduces_randomized_run() {
        let roster: Vec<Player> =
            (0..9).map(|i| player(&format!("P {i}"), i as f32)).collect();
        let config =
            LeagueConfig { max_team_size: 3, target_teams: Some(3), ..LeagueConfig::default() };
        let options =
            GenerationOptions { mode: AssignMode::Randomized, ..seeded() };

        let first = generate_teams(&roster, &config, &[], &options);
        let second = generate_teams(&roster, &config, &[], &options);

        let rosters = |r: &GenerationResult| -> Vec<Vec<String>> {
            r.teams
                .iter()
                .map(|t| t.players.iter().map(|p| p.name.clone()).collect())
                .collect()
        };
        assert_eq!(rosters(&first), rosters(&second));
    }

    #[test]
    fn test_stats_stay_consistent_with_result() {
        let mut a = player("Ana Diaz", 2.0);
        let mut b = player("Ben Ko", 9.0);
        a.teammate_requests = vec!["Ben Ko".to_string()];
        b.teammate_requests = vec!["Ana Diaz".to_string()];
        let roster =
            vec![a, b, player("Cai Wu", 5.0), player("Dee Fox", 6.0)];
        let config =
            LeagueConfig { max_team_size: 2, target_teams: Some(2), ..LeagueConfig::default() };

        let result = generate_teams(&roster, &config, &[], &seeded());
        let placed: usize = result.teams.iter().map(Team::len).sum();
        assert_eq!(result.stats.assigned_players, placed);
        assert_eq!(result.stats.unassigned_players, result.unassigned.len());
        assert_eq!(result.stats.total_players, 4);
        assert_eq!(result.stats.must_have_honored, 2);
        assert_eq!(result.stats.avoid_violations, 0);
    }

    fn build_roster(
        count: usize,
        mutual: &[(usize, usize)],
        avoids: &[(usize, usize)],
    ) -> Vec<Player> {
        let mut players: Vec<Player> = (0..count)
            .map(|i| {
                let gender = match i % 3 {
                    0 => Gender::Female,
                    1 => Gender::Male,
                    _ => Gender::Other,
                };
                let mut p = Player::new(format!("Player {i}"), gender, (i % 10) as f32);
                p.is_handler = i % 4 == 0;
                p
            })
            .collect();
        for &(a, b) in mutual {
            let (a, b) = (a % count, b % count);
            if a != b {
                let name_a = players[a].name.clone();
                let name_b = players[b].name.clone();
                players[a].teammate_requests.push(name_b);
                players[b].teammate_requests.push(name_a);
            }
        }
        for &(a, b) in avoids {
            let (a, b) = (a % count, b % count);
            if a != b {
                let name_b = players[b].name.clone();
                players[a].avoid_requests.push(name_b);
            }
        }
        players
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_generation_invariants(
            count in 2usize..28,
            mutual in proptest::collection::vec((0usize..28, 0usize..28), 0..10),
            avoids in proptest::collection::vec((0usize..28, 0usize..28), 0..6),
            seed in any::<u64>(),
        ) {
            let roster = build_roster(count, &mutual, &avoids);
            let config = LeagueConfig {
                max_team_size: 4,
                ..LeagueConfig::default()
            };
            let options =
                GenerationOptions { seed: Some(seed), ..GenerationOptions::default() };
            let result = generate_teams(&roster, &config, &[], &options);

            // Capacity invariant.
            for team in &result.teams {
                prop_assert!(team.len() <= config.max_team_size);
            }

            // Cap invariant: formed groups are always 2..=4 strong.
            for group in &result.groups {
                prop_assert!(group.len() > 1 && group.len() <= 4);
            }

            // Conservation: every player is placed or unassigned, never both.
            let placed: usize = result.teams.iter().map(Team::len).sum();
            prop_assert_eq!(placed + result.unassigned.len(), count);

            // No-avoid invariant, post-balance.
            let mut resolver = NameResolver::new();
            let avoid = AvoidSet::build(&roster, &mut resolver);
            for team in &result.teams {
                for (i, a) in team.players.iter().enumerate() {
                    for b in &team.players[i + 1..] {
                        prop_assert!(!avoid.blocks(a.id, b.id));
                    }
                }
            }
            prop_assert_eq!(result.stats.avoid_violations, 0);

            // Group atomicity: same team for all members, or all unassigned.
            for group in &result.groups {
                let homes: Vec<Option<Uuid>> = group
                    .player_ids
                    .iter()
                    .map(|&id| {
                        result.teams.iter().find(|t| t.contains(id)).map(|t| t.id)
                    })
                    .collect();
                prop_assert!(homes.windows(2).all(|w| w[0] == w[1]));
            }
        }
    }
}
