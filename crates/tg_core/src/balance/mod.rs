//! Bounded local-search pass over assigned teams.
//!
//! Swaps players across teams to shrink the spread of team skill averages,
//! with a secondary pull toward a fixed handler count per team. Greedy and
//! deliberately non-exhaustive: bounded passes, sampled candidates, one
//! committed swap per pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::avoid::AvoidSet;
use crate::models::{Gender, LeagueConfig, Player, Team};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancerConfig {
    /// Hard cap on optimization passes.
    pub max_passes: usize,
    /// Spread of team averages below which the teams count as balanced.
    pub min_gap: f32,
    /// Smallest per-pass improvement worth committing.
    pub min_improvement: f32,
    /// Players sampled per team side, spread across the skill spectrum.
    pub sample_per_team: usize,
    /// Handler count each team is pulled toward.
    pub handler_target: usize,
    /// Weight of the handler term relative to the skill-gap term.
    pub role_weight: f32,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            max_passes: 10,
            min_gap: 0.5,
            min_improvement: 0.05,
            sample_per_team: 4,
            handler_target: 2,
            role_weight: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub passes_run: usize,
    pub swaps_committed: usize,
}

#[derive(Debug, Clone, Copy)]
struct SwapCandidate {
    low_team: usize,
    low_pos: usize,
    high_team: usize,
    high_pos: usize,
    score: f32,
}

pub struct SkillBalancer {
    config: BalancerConfig,
}

impl SkillBalancer {
    pub fn new(config: BalancerConfig) -> Self {
        Self { config }
    }

    /// Run bounded swap passes over `teams` in place. Swaps that would
    /// break a gender quota or an avoid pair are never candidates.
    pub fn balance(
        &self,
        teams: &mut [Team],
        league: &LeagueConfig,
        avoid: &AvoidSet,
    ) -> BalanceReport {
        let mut report = BalanceReport::default();
        if teams.len() < 2 {
            return report;
        }

        for _ in 0..self.config.max_passes {
            let mut order: Vec<usize> = (0..teams.len()).collect();
            order.sort_by(|&a, &b| {
                teams[a]
                    .average_skill
                    .partial_cmp(&teams[b].average_skill)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let spread = teams[order[order.len() - 1]].average_skill
                - teams[order[0]].average_skill;
            if spread < self.config.min_gap {
                break;
            }
            report.passes_run += 1;

            let mut pairs: Vec<(usize, usize)> =
                order.windows(2).map(|w| (w[0], w[1])).collect();
            if order.len() > 2 {
                pairs.push((order[0], order[order.len() - 1]));
            }

            let best = pairs
                .iter()
                .filter_map(|&(low, high)| {
                    self.best_swap_for_pair(teams, league, avoid, low, high)
                })
                .max_by(|a, b| {
                    a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)
                });

            match best {
                Some(swap) if swap.score > self.config.min_improvement => {
                    if self.commit(teams, swap) {
                        report.swaps_committed += 1;
                    }
                }
                _ => break,
            }
        }

        debug!(
            passes = report.passes_run,
            swaps = report.swaps_committed,
            "skill balancing finished"
        );
        report
    }

    /// Best legal swap between one weak/strong team pair, from sampled
    /// representatives on both sides.
    fn best_swap_for_pair(
        &self,
        teams: &[Team],
        league: &LeagueConfig,
        avoid: &AvoidSet,
        low_team: usize,
        high_team: usize,
    ) -> Option<SwapCandidate> {
        let low = &teams[low_team];
        let high = &teams[high_team];
        let mut best: Option<SwapCandidate> = None;

        for &low_pos in &sample_positions(&low.players, self.config.sample_per_team) {
            for &high_pos in &sample_positions(&high.players, self.config.sample_per_team) {
                let weak = &low.players[low_pos];
                let strong = &high.players[high_pos];
                if weak.effective_skill() >= strong.effective_skill() {
                    continue;
                }
                if introduces_conflict(avoid, low, high, low_pos, high_pos) {
                    continue;
                }
                if !gender_legal_after(league, low, weak.gender, strong.gender)
                    || !gender_legal_after(league, high, strong.gender, weak.gender)
                {
                    continue;
                }

                let score = self.swap_score(low, high, weak, strong);
                if best.map_or(true, |b| score > b.score) {
                    best = Some(SwapCandidate { low_team, low_pos, high_team, high_pos, score });
                }
            }
        }
        best
    }

    fn swap_score(&self, low: &Team, high: &Team, weak: &Player, strong: &Player) -> f32 {
        let delta = strong.effective_skill() - weak.effective_skill();
        let gap_before = (high.average_skill - low.average_skill).abs();
        let low_after = low.average_skill + delta / low.players.len() as f32;
        let high_after = high.average_skill - delta / high.players.len() as f32;
        let gap_after = (high_after - low_after).abs();

        let target = self.config.handler_target as i32;
        let dev = |count: i32| (count - target).abs() as f32;
        let low_handlers = low.handler_count as i32;
        let high_handlers = high.handler_count as i32;
        let handler_shift = strong.is_handler as i32 - weak.is_handler as i32;
        let role_before = dev(low_handlers) + dev(high_handlers);
        let role_after = dev(low_handlers + handler_shift) + dev(high_handlers - handler_shift);

        (gap_before - gap_after) + self.config.role_weight * (role_before - role_after)
    }

    fn commit(&self, teams: &mut [Team], swap: SwapCandidate) -> bool {
        let weak_id = teams[swap.low_team].players[swap.low_pos].id;
        let strong_id = teams[swap.high_team].players[swap.high_pos].id;
        debug!(score = swap.score, "committing balancing swap");

        // remove_player/add_player keep the derived stats in sync.
        let Some(weak) = teams[swap.low_team].remove_player(weak_id) else {
            return false;
        };
        let Some(strong) = teams[swap.high_team].remove_player(strong_id) else {
            teams[swap.low_team].add_player(weak);
            return false;
        };
        teams[swap.low_team].add_player(strong);
        teams[swap.high_team].add_player(weak);
        true
    }
}

/// Teams are final at this point, so a quota holds iff the post-swap
/// count meets the minimum outright.
fn gender_legal_after(league: &LeagueConfig, team: &Team, out: Gender, incoming: Gender) -> bool {
    let mut counts = team.gender_breakdown;
    match out {
        Gender::Female => counts.female -= 1,
        Gender::Male => counts.male -= 1,
        Gender::Other => counts.other -= 1,
    }
    match incoming {
        Gender::Female => counts.female += 1,
        Gender::Male => counts.male += 1,
        Gender::Other => counts.other += 1,
    }

    if counts.female < league.min_females || counts.male < league.min_males {
        return false;
    }
    if !league.allow_mixed_gender {
        let present = [counts.female, counts.male, counts.other]
            .iter()
            .filter(|&&c| c > 0)
            .count();
        if present > 1 {
            return false;
        }
    }
    true
}

/// Up to `count` player positions spread across the skill spectrum rather
/// than an exhaustive enumeration, keeping each pass near-linear.
fn sample_positions(players: &[Player], count: usize) -> Vec<usize> {
    if players.is_empty() || count == 0 {
        return Vec::new();
    }
    // A single sample cannot anchor both ends of the spectrum; the stride
    // below also needs count >= 2 to stay divisible.
    let count = count.max(2);
    let mut by_skill: Vec<usize> = (0..players.len()).collect();
    by_skill.sort_by(|&a, &b| {
        players[a]
            .effective_skill()
            .partial_cmp(&players[b].effective_skill())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if by_skill.len() <= count {
        return by_skill;
    }

    let mut sampled = Vec::with_capacity(count);
    let last = by_skill.len() - 1;
    for i in 0..count {
        let pick = by_skill[i * last / (count - 1)];
        if !sampled.contains(&pick) {
            sampled.push(pick);
        }
    }
    sampled
}

fn introduces_conflict(
    avoid: &AvoidSet,
    low: &Team,
    high: &Team,
    low_pos: usize,
    high_pos: usize,
) -> bool {
    let weak = &low.players[low_pos];
    let strong = &high.players[high_pos];

    let weak_blocked = high
        .players
        .iter()
        .filter(|p| p.id != strong.id)
        .any(|p| avoid.blocks(p.id, weak.id));
    let strong_blocked = low
        .players
        .iter()
        .filter(|p| p.id != weak.id)
        .any(|p| avoid.blocks(p.id, strong.id));
    weak_blocked || strong_blocked
}
