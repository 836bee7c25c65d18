//! Affinity group formation from teammate requests.
//!
//! Resolves each player's free-text requests, builds the mutual-connection
//! graph (true reciprocity only), extracts size-capped components into
//! labeled groups, and classifies every original request for diagnostics.

pub mod graph;

use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::avoid::AvoidSet;
use crate::error::{GenerationError, Result};
use crate::matching::{MatchConfidence, NameResolver, ACCEPT_THRESHOLD};
use crate::models::{
    Player, PlayerGroup, RequestFailure, RequestPriority, UnfulfilledRequest, MAX_GROUP_SIZE,
};

use graph::MutualGraph;

/// A teammate request successfully resolved to a roster member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRequest {
    pub requester: Uuid,
    pub target: Uuid,
    pub raw: String,
    pub priority: RequestPriority,
    pub confidence: MatchConfidence,
}

/// A request with no roster member above the acceptance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRequest {
    pub requester: Uuid,
    pub raw: String,
    pub priority: RequestPriority,
}

/// Medium-confidence resolution the caller should surface for verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionWarning {
    pub requester: Uuid,
    pub raw: String,
    pub matched: String,
    pub confidence: MatchConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    /// A requests B while B avoids A (or vice versa).
    AvoidVsRequest,
    /// A requests B but B never requests A back.
    OneWayRequest,
}

/// Diagnostic only; neither kind blocks group formation by itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConflict {
    pub requester: Uuid,
    pub target: Uuid,
    pub kind: ConflictKind,
}

/// Players that almost formed one oversized group, truncated by the cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearMiss {
    pub members: Vec<Uuid>,
    pub excluded: Vec<Uuid>,
    pub reason: RequestFailure,
}

/// Post-formation classification of one original request, for explanation
/// purposes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestOutcome {
    Honored,
    NotFound,
    Conflict,
    GroupTooLarge,
    NonReciprocal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedRequest {
    pub requester: Uuid,
    pub raw: String,
    pub priority: RequestPriority,
    pub outcome: RequestOutcome,
}

/// Pre-generation group check result that does not block generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ValidationWarning {
    /// The group fills an entire team by itself.
    GroupFillsTeam { label: String, size: usize },
}

/// Everything group formation produces.
#[derive(Debug, Clone, Default)]
pub struct FormationOutput {
    /// Roster copies stamped with `group_id` and `unfulfilled_requests`.
    pub players: Vec<Player>,
    pub groups: Vec<PlayerGroup>,
    pub resolved: Vec<ResolvedRequest>,
    pub dropped: Vec<DroppedRequest>,
    pub warnings: Vec<ResolutionWarning>,
    pub conflicts: Vec<RequestConflict>,
    pub near_misses: Vec<NearMiss>,
    pub outcomes: Vec<ClassifiedRequest>,
}

/// Turn per-player teammate requests into symmetric affinity groups.
pub fn form_groups(
    players: &[Player],
    avoid: &AvoidSet,
    resolver: &mut NameResolver,
) -> FormationOutput {
    let mut output = FormationOutput { players: players.to_vec(), ..FormationOutput::default() };
    if players.is_empty() {
        return output;
    }

    let index_of: FxHashMap<Uuid, usize> =
        players.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

    resolve_requests(players, resolver, &mut output);

    let requested: FxHashSet<(usize, usize)> = output
        .resolved
        .iter()
        .map(|r| (index_of[&r.requester], index_of[&r.target]))
        .collect();

    output.conflicts = detect_request_conflicts(&output.resolved, &requested, &index_of, avoid);

    let graph = build_mutual_graph(players.len(), &output.resolved, &requested, &index_of);
    let components = graph.capped_components(MAX_GROUP_SIZE);

    for (group_index, component) in components.iter().enumerate() {
        let member_ids: Vec<Uuid> = component.members.iter().map(|&i| players[i].id).collect();
        let group = PlayerGroup::new(group_index, member_ids.clone());
        debug!(label = %group.label, size = group.len(), "formed affinity group");

        for &member in &component.members {
            output.players[member].group_id = Some(group.id);
        }
        if !component.overflow.is_empty() {
            output.near_misses.push(NearMiss {
                members: member_ids,
                excluded: component.overflow.iter().map(|&i| players[i].id).collect(),
                reason: RequestFailure::GroupTooLarge,
            });
        }
        output.groups.push(group);
    }

    classify_outcomes(&graph, &index_of, avoid, &mut output);
    output
}

fn resolve_requests(players: &[Player], resolver: &mut NameResolver, output: &mut FormationOutput) {
    for player in players {
        let others: Vec<&Player> = players.iter().filter(|p| p.id != player.id).collect();
        let other_names: Vec<String> = others.iter().map(|p| p.name.clone()).collect();

        for (index, raw) in player.teammate_requests.iter().enumerate() {
            let priority = RequestPriority::from_index(index);

            let Some(best) = resolver.best(raw, &other_names, ACCEPT_THRESHOLD) else {
                output.dropped.push(DroppedRequest {
                    requester: player.id,
                    raw: raw.clone(),
                    priority,
                });
                continue;
            };
            let Some(target) = others.iter().find(|p| p.name == best.candidate) else {
                continue;
            };

            if best.confidence.needs_review() {
                output.warnings.push(ResolutionWarning {
                    requester: player.id,
                    raw: raw.clone(),
                    matched: target.name.clone(),
                    confidence: best.confidence,
                });
            }
            output.resolved.push(ResolvedRequest {
                requester: player.id,
                target: target.id,
                raw: raw.clone(),
                priority,
                confidence: best.confidence,
            });
        }
    }
}

fn detect_request_conflicts(
    resolved: &[ResolvedRequest],
    requested: &FxHashSet<(usize, usize)>,
    index_of: &FxHashMap<Uuid, usize>,
    avoid: &AvoidSet,
) -> Vec<RequestConflict> {
    resolved
        .iter()
        .filter_map(|request| {
            let a = index_of[&request.requester];
            let b = index_of[&request.target];
            let kind = if avoid.blocks(request.requester, request.target) {
                ConflictKind::AvoidVsRequest
            } else if !requested.contains(&(b, a)) {
                ConflictKind::OneWayRequest
            } else {
                return None;
            };
            Some(RequestConflict { requester: request.requester, target: request.target, kind })
        })
        .collect()
}

/// An edge exists only when both directions resolved: one-way requests
/// never connect players. Edges are inserted in resolution order so
/// traversal stays deterministic for a given roster order.
fn build_mutual_graph(
    node_count: usize,
    resolved: &[ResolvedRequest],
    requested: &FxHashSet<(usize, usize)>,
    index_of: &FxHashMap<Uuid, usize>,
) -> MutualGraph {
    let mut graph = MutualGraph::new(node_count);
    for request in resolved {
        let a = index_of[&request.requester];
        let b = index_of[&request.target];
        if requested.contains(&(b, a)) {
            graph.add_edge(a, b);
        }
    }
    graph
}

fn classify_outcomes(
    graph: &MutualGraph,
    index_of: &FxHashMap<Uuid, usize>,
    avoid: &AvoidSet,
    output: &mut FormationOutput,
) {
    let resolved_by_key: FxHashMap<(Uuid, String), Uuid> = output
        .resolved
        .iter()
        .map(|r| ((r.requester, r.raw.clone()), r.target))
        .collect();
    let group_of: FxHashMap<Uuid, Uuid> = output
        .players
        .iter()
        .filter_map(|p| p.group_id.map(|g| (p.id, g)))
        .collect();

    for player_index in 0..output.players.len() {
        let requester = output.players[player_index].id;
        let requests = output.players[player_index].teammate_requests.clone();

        for (index, raw) in requests.iter().enumerate() {
            let priority = RequestPriority::from_index(index);
            let outcome = match resolved_by_key.get(&(requester, raw.clone())) {
                None => RequestOutcome::NotFound,
                Some(&target) => {
                    let same_group = match (group_of.get(&requester), group_of.get(&target)) {
                        (Some(a), Some(b)) => a == b,
                        _ => false,
                    };
                    if same_group {
                        RequestOutcome::Honored
                    } else if avoid.blocks(requester, target) {
                        RequestOutcome::Conflict
                    } else if graph.has_edge(index_of[&requester], index_of[&target]) {
                        RequestOutcome::GroupTooLarge
                    } else {
                        RequestOutcome::NonReciprocal
                    }
                }
            };

            output.outcomes.push(ClassifiedRequest {
                requester,
                raw: raw.clone(),
                priority,
                outcome,
            });
            if let Some(reason) = failure_reason(outcome) {
                output.players[player_index].unfulfilled_requests.push(UnfulfilledRequest {
                    name: raw.clone(),
                    reason,
                    priority,
                });
            }
        }
    }
}

fn failure_reason(outcome: RequestOutcome) -> Option<RequestFailure> {
    match outcome {
        RequestOutcome::Honored => None,
        RequestOutcome::NotFound => Some(RequestFailure::NotFound),
        RequestOutcome::Conflict => Some(RequestFailure::Conflict),
        RequestOutcome::GroupTooLarge => Some(RequestFailure::GroupTooLarge),
        RequestOutcome::NonReciprocal => Some(RequestFailure::NonReciprocal),
    }
}

/// Pre-generation check run by the caller before assignment.
///
/// A group larger than the team capacity is a hard error; a group exactly
/// filling a team is only a warning (it will monopolize that team).
pub fn validate_groups_for_generation(
    groups: &[PlayerGroup],
    max_team_size: usize,
) -> Result<Vec<ValidationWarning>> {
    let mut warnings = Vec::new();
    for group in groups {
        if group.len() > max_team_size {
            return Err(GenerationError::GroupTooLarge {
                label: group.label.clone(),
                size: group.len(),
                max_team_size,
            });
        }
        if group.len() == max_team_size {
            warnings.push(ValidationWarning::GroupFillsTeam {
                label: group.label.clone(),
                size: group.len(),
            });
        }
    }
    Ok(warnings)
}
