//! Constraint-aware placement of groups and singletons into team slots.
//!
//! Units (custom groups, then formed mutual groups, then singletons) are
//! placed whole: a unit with no feasible team goes entirely to the
//! unassigned list, never split. Feasibility covers capacity, gender-quota
//! achievability and symmetric avoid constraints.

mod movement;

pub use movement::move_player;

use std::fmt;

use fxhash::{FxHashMap, FxHashSet};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::avoid::AvoidSet;
use crate::models::{Gender, LeagueConfig, Player, PlayerGroup, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignMode {
    /// Most-constrained-first placement with skill-aware tie-breaks.
    Balanced,
    /// Same feasibility filter, first feasible team in shuffled order.
    Randomized,
    /// Empty team shells only; every player starts unassigned.
    Manual,
}

impl fmt::Display for AssignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignMode::Balanced => write!(f, "balanced"),
            AssignMode::Randomized => write!(f, "randomized"),
            AssignMode::Manual => write!(f, "manual"),
        }
    }
}

/// Placement priority of a unit; lower places first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitPriority {
    CustomGroup,
    MutualGroup,
    Singleton,
}

/// Atomic placement item: a whole group or a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintUnit {
    pub player_ids: Vec<Uuid>,
    pub priority: UnitPriority,
}

/// Custom explicit groups first, formed mutual groups not overlapping a
/// custom group next, everyone else as singletons.
pub fn build_units(
    players: &[Player],
    custom_groups: &[PlayerGroup],
    formed_groups: &[PlayerGroup],
) -> Vec<ConstraintUnit> {
    let known: FxHashSet<Uuid> = players.iter().map(|p| p.id).collect();
    let mut covered: FxHashSet<Uuid> = FxHashSet::default();
    let mut units = Vec::new();

    for group in custom_groups {
        let ids: Vec<Uuid> = group
            .player_ids
            .iter()
            .filter(|id| known.contains(id) && !covered.contains(id))
            .copied()
            .collect();
        if ids.is_empty() {
            continue;
        }
        covered.extend(&ids);
        units.push(ConstraintUnit { player_ids: ids, priority: UnitPriority::CustomGroup });
    }

    for group in formed_groups {
        if group.player_ids.iter().any(|id| covered.contains(id)) {
            continue;
        }
        covered.extend(&group.player_ids);
        units.push(ConstraintUnit {
            player_ids: group.player_ids.clone(),
            priority: UnitPriority::MutualGroup,
        });
    }

    for player in players {
        if !covered.contains(&player.id) {
            units.push(ConstraintUnit {
                player_ids: vec![player.id],
                priority: UnitPriority::Singleton,
            });
        }
    }

    units
}

#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    pub teams: Vec<Team>,
    pub unassigned: Vec<Player>,
}

/// Running totals per team shell while placement is in flight. Teams are
/// materialized from the placement map only at the end.
#[derive(Debug, Default, Clone)]
struct TeamDraft {
    ids: Vec<Uuid>,
    skill_sum: f32,
    female: usize,
    male: usize,
    other: usize,
}

pub struct ConstraintAssigner<'a> {
    config: &'a LeagueConfig,
    avoid: &'a AvoidSet,
}

impl<'a> ConstraintAssigner<'a> {
    pub fn new(config: &'a LeagueConfig, avoid: &'a AvoidSet) -> Self {
        Self { config, avoid }
    }

    pub fn assign<R: Rng>(
        &self,
        players: &[Player],
        units: &[ConstraintUnit],
        mode: AssignMode,
        rng: &mut R,
    ) -> AssignmentOutcome {
        let team_count = self.config.team_count(players.len());
        let mut teams: Vec<Team> =
            (0..team_count).map(|i| Team::empty(format!("Team {}", i + 1))).collect();

        if mode == AssignMode::Manual {
            return AssignmentOutcome { teams, unassigned: players.to_vec() };
        }

        let by_id: FxHashMap<Uuid, &Player> = players.iter().map(|p| (p.id, p)).collect();
        let roster_mean = if players.is_empty() {
            0.0
        } else {
            players.iter().map(|p| p.effective_skill()).sum::<f32>() / players.len() as f32
        };

        let mut ordered: Vec<&ConstraintUnit> = units.iter().collect();
        if mode == AssignMode::Balanced {
            // Most constrained first: units carrying the most avoid requests
            // have the fewest feasible homes.
            ordered.sort_by_key(|unit| std::cmp::Reverse(self.unit_avoid_count(unit, &by_id)));
        }

        let mut drafts = vec![TeamDraft::default(); team_count];
        let mut placements: FxHashMap<Uuid, usize> = FxHashMap::default();
        let mut unassigned: Vec<Uuid> = Vec::new();

        for unit in ordered {
            let members: Vec<&Player> =
                unit.player_ids.iter().filter_map(|id| by_id.get(id).copied()).collect();
            if members.is_empty() {
                continue;
            }

            let chosen = if self.has_internal_conflict(&members) {
                None
            } else {
                match mode {
                    AssignMode::Balanced => self.pick_balanced(&drafts, &members, roster_mean, rng),
                    AssignMode::Randomized => self.pick_randomized(&drafts, &members, rng),
                    AssignMode::Manual => unreachable!("manual mode returns early"),
                }
            };

            match chosen {
                Some(team_index) => {
                    for member in &members {
                        drafts[team_index].push(member);
                        placements.insert(member.id, team_index);
                    }
                }
                None => {
                    // Soft failure: the whole unit stays out, never split.
                    warn!(
                        unit_size = members.len(),
                        priority = ?unit.priority,
                        "no feasible team for unit; leaving unassigned"
                    );
                    unassigned.extend(unit.player_ids.iter().copied());
                }
            }
        }

        // Materialize team membership from the placement map.
        for player in players {
            if let Some(&team_index) = placements.get(&player.id) {
                teams[team_index].add_player(player.clone());
            }
        }
        let unassigned_set: FxHashSet<Uuid> = unassigned.into_iter().collect();
        let unassigned_players: Vec<Player> = players
            .iter()
            .filter(|p| unassigned_set.contains(&p.id))
            .cloned()
            .collect();

        debug!(
            teams = teams.len(),
            placed = placements.len(),
            unassigned = unassigned_players.len(),
            %mode,
            "assignment complete"
        );
        AssignmentOutcome { teams, unassigned: unassigned_players }
    }

    fn unit_avoid_count(&self, unit: &ConstraintUnit, by_id: &FxHashMap<Uuid, &Player>) -> usize {
        unit.player_ids
            .iter()
            .filter_map(|id| by_id.get(id))
            .map(|p| p.avoid_requests.len())
            .sum()
    }

    /// A unit whose own members avoid each other can never be legally placed.
    fn has_internal_conflict(&self, members: &[&Player]) -> bool {
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if self.avoid.blocks(a.id, b.id) {
                    return true;
                }
            }
        }
        false
    }

    fn fits(&self, draft: &TeamDraft, members: &[&Player]) -> bool {
        let new_size = draft.ids.len() + members.len();
        if new_size > self.config.max_team_size {
            return false;
        }

        // Quota achievability: enough slots must remain to still reach each
        // gender minimum after this unit is inserted.
        let remaining = self.config.max_team_size - new_size;
        let female =
            draft.female + members.iter().filter(|p| p.gender == Gender::Female).count();
        let male = draft.male + members.iter().filter(|p| p.gender == Gender::Male).count();
        if female + remaining < self.config.min_females {
            return false;
        }
        if male + remaining < self.config.min_males {
            return false;
        }

        if !self.config.allow_mixed_gender {
            let mut genders: FxHashSet<Gender> = FxHashSet::default();
            if draft.female > 0 {
                genders.insert(Gender::Female);
            }
            if draft.male > 0 {
                genders.insert(Gender::Male);
            }
            if draft.other > 0 {
                genders.insert(Gender::Other);
            }
            genders.extend(members.iter().map(|p| p.gender));
            if genders.len() > 1 {
                return false;
            }
        }

        for member in members {
            for &existing in &draft.ids {
                if self.avoid.blocks(member.id, existing) {
                    return false;
                }
            }
        }
        true
    }

    /// Fewest current players, tie-broken by keeping the team average
    /// closest to the roster-wide mean; residual ties go to the RNG.
    fn pick_balanced<R: Rng>(
        &self,
        drafts: &[TeamDraft],
        members: &[&Player],
        roster_mean: f32,
        rng: &mut R,
    ) -> Option<usize> {
        let feasible: Vec<usize> =
            (0..drafts.len()).filter(|&t| self.fits(&drafts[t], members)).collect();
        if feasible.is_empty() {
            return None;
        }

        let min_len = feasible.iter().map(|&t| drafts[t].ids.len()).min()?;
        let emptiest: Vec<usize> =
            feasible.into_iter().filter(|&t| drafts[t].ids.len() == min_len).collect();

        let unit_skill: f32 = members.iter().map(|p| p.effective_skill()).sum();
        let distance = |t: usize| -> f32 {
            let draft = &drafts[t];
            let new_size = (draft.ids.len() + members.len()) as f32;
            let new_avg = (draft.skill_sum + unit_skill) / new_size;
            (new_avg - roster_mean).abs()
        };

        let best_distance =
            emptiest.iter().map(|&t| distance(t)).fold(f32::INFINITY, f32::min);
        let closest: Vec<usize> = emptiest
            .into_iter()
            .filter(|&t| (distance(t) - best_distance).abs() < 1e-6)
            .collect();

        closest.choose(rng).copied()
    }

    fn pick_randomized<R: Rng>(
        &self,
        drafts: &[TeamDraft],
        members: &[&Player],
        rng: &mut R,
    ) -> Option<usize> {
        let mut order: Vec<usize> = (0..drafts.len()).collect();
        order.shuffle(rng);
        order.into_iter().find(|&t| self.fits(&drafts[t], members))
    }
}

impl TeamDraft {
    fn push(&mut self, player: &Player) {
        self.ids.push(player.id);
        self.skill_sum += player.effective_skill();
        match player.gender {
            Gender::Female => self.female += 1,
            Gender::Male => self.male += 1,
            Gender::Other => self.other += 1,
        }
    }
}
