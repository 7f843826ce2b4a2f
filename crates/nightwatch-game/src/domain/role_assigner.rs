//! Randomized role distribution.

use std::collections::{BTreeMap, BTreeSet};

use nightwatch_core::player::PlayerId;
use nightwatch_core::rng::DeterministicRng;

use super::role_config::RoleConfig;

/// Player → role name, fixed once the game has started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    roles: BTreeMap<PlayerId, String>,
}

impl RoleAssignment {
    /// Role assigned to `player`, if any.
    #[must_use]
    pub fn role_of(&self, player: &PlayerId) -> Option<&str> {
        self.roles.get(player).map(String::as_str)
    }

    /// Number of players holding a role.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if no player holds a role.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Iterates assignments in player order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &str)> {
        self.roles.iter().map(|(p, r)| (p, r.as_str()))
    }

    pub(crate) fn insert(&mut self, player: PlayerId, role: String) {
        self.roles.insert(player, role);
    }
}

/// In-place Fisher–Yates shuffle.
#[allow(clippy::cast_possible_truncation)]
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let j = rng.next_u32_range(0, i as u32) as usize;
        items.swap(i, j);
    }
}

/// Deals the shuffled role pool to the roster.
///
/// The pool is zipped against the roster in ascending player order, so only
/// `min(roster.len(), config.total_slots())` players receive a role. Returns
/// the pairs in that order.
pub fn assign(
    roster: &BTreeSet<PlayerId>,
    config: &RoleConfig,
    rng: &mut dyn DeterministicRng,
) -> Vec<(PlayerId, String)> {
    let mut pool = config.pool();
    shuffle(&mut pool, rng);

    roster.iter().cloned().zip(pool).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightwatch_core::rng::StdRandom;
    use nightwatch_test_support::{MockRng, SequenceRng};

    fn roster(ids: &[&str]) -> BTreeSet<PlayerId> {
        ids.iter().map(|id| PlayerId::new(*id)).collect()
    }

    fn village() -> RoleConfig {
        let mut config = RoleConfig::new();
        config.set_role("villager", 2).unwrap();
        config.set_role("wolf", 1).unwrap();
        config
    }

    #[test]
    fn test_shuffle_with_mock_rng_swaps_each_index_with_zero() {
        let mut items = vec!["a", "b", "c"];

        shuffle(&mut items, &mut MockRng);

        // i=2 swaps with 0 -> c b a; i=1 swaps with 0 -> b c a
        assert_eq!(items, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_shuffle_follows_scripted_indices() {
        let mut items = vec![1, 2, 3, 4];

        shuffle(&mut items, &mut SequenceRng::new(vec![1, 2, 0]));

        // i=3<->1: 1 4 3 2; i=2<->2: unchanged; i=1<->0: 4 1 3 2
        assert_eq!(items, vec![4, 1, 3, 2]);
    }

    #[test]
    fn test_assign_preserves_role_multiset() {
        let mut rng = StdRandom::seeded(99);

        for _ in 0..50 {
            let pairs = assign(&roster(&["a", "b", "c"]), &village(), &mut rng);

            let mut roles: Vec<String> = pairs.into_iter().map(|(_, r)| r).collect();
            roles.sort();
            assert_eq!(roles, vec!["villager", "villager", "wolf"]);
        }
    }

    #[test]
    fn test_assign_gives_every_player_a_distinct_entry() {
        let pairs = assign(&roster(&["a", "b", "c"]), &village(), &mut MockRng);

        let players: BTreeSet<PlayerId> = pairs.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(players.len(), 3);
        assert_eq!(
            pairs,
            vec![
                (PlayerId::new("a"), "villager".to_owned()),
                (PlayerId::new("b"), "wolf".to_owned()),
                (PlayerId::new("c"), "villager".to_owned()),
            ]
        );
    }

    #[test]
    fn test_assign_leaves_excess_players_without_role() {
        let pairs = assign(
            &roster(&["a", "b", "c", "d", "e"]),
            &village(),
            &mut MockRng,
        );

        assert_eq!(pairs.len(), 3);
        let assigned: Vec<&str> = pairs.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(assigned, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_assign_with_empty_config_assigns_nobody() {
        let pairs = assign(&roster(&["a", "b"]), &RoleConfig::new(), &mut MockRng);

        assert!(pairs.is_empty());
    }
}
