//! Symmetric avoid-pair set resolved once from free-text avoid requests.

use fxhash::FxHashSet;
use uuid::Uuid;

use crate::matching::{NameResolver, ACCEPT_THRESHOLD};
use crate::models::Player;

/// Hard mutual-exclusion constraints between roster members.
///
/// Built once per generation by resolving every player's avoid list against
/// the rest of the roster. The set is symmetric: either side naming the
/// other blocks the pair.
#[derive(Debug, Default, Clone)]
pub struct AvoidSet {
    pairs: FxHashSet<(Uuid, Uuid)>,
}

impl AvoidSet {
    pub fn build(players: &[Player], resolver: &mut NameResolver) -> Self {
        let mut pairs = FxHashSet::default();

        for player in players {
            let others: Vec<&Player> = players.iter().filter(|p| p.id != player.id).collect();
            let other_names: Vec<String> = others.iter().map(|p| p.name.clone()).collect();

            for raw in &player.avoid_requests {
                let Some(best) = resolver.best(raw, &other_names, ACCEPT_THRESHOLD) else {
                    continue;
                };
                if let Some(target) = others.iter().find(|p| p.name == best.candidate) {
                    pairs.insert(ordered(player.id, target.id));
                }
            }
        }

        Self { pairs }
    }

    /// True when `a` and `b` may never share a team.
    pub fn blocks(&self, a: Uuid, b: Uuid) -> bool {
        self.pairs.contains(&ordered(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn ordered(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    #[test]
    fn test_avoid_set_is_symmetric() {
        let mut ana = Player::new("Ana Diaz", Gender::Female, 5.0);
        let ben = Player::new("Ben Ko", Gender::Male, 5.0);
        ana.avoid_requests = vec!["Ben Ko".to_string()];

        let roster = vec![ana.clone(), ben.clone()];
        let mut resolver = NameResolver::new();
        let avoid = AvoidSet::build(&roster, &mut resolver);

        assert_eq!(avoid.len(), 1);
        assert!(avoid.blocks(ana.id, ben.id));
        assert!(avoid.blocks(ben.id, ana.id));
    }

    #[test]
    fn test_unresolvable_avoid_request_is_dropped() {
        let mut ana = Player::new("Ana Diaz", Gender::Female, 5.0);
        ana.avoid_requests = vec!["nobody on roster".to_string()];
        let ben = Player::new("Ben Ko", Gender::Male, 5.0);

        let roster = vec![ana, ben];
        let mut resolver = NameResolver::new();
        let avoid = AvoidSet::build(&roster, &mut resolver);
        assert!(avoid.is_empty());
    }

    #[test]
    fn test_fuzzy_avoid_request_resolves() {
        let mut ana = Player::new("Ana Diaz", Gender::Female, 5.0);
        // Nickname form of the roster entry "Michael Smith".
        ana.avoid_requests = vec!["mikesmith".to_string()];
        let mike = Player::new("Michael Smith", Gender::Male, 5.0);

        let roster = vec![ana.clone(), mike.clone()];
        let mut resolver = NameResolver::new();
        let avoid = AvoidSet::build(&roster, &mut resolver);
        assert!(avoid.blocks(ana.id, mike.id));
    }
}
