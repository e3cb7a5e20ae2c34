//! Enemy propagation and war bookkeeping.
//!
//! A player's enemies are never declared directly. They are derived each
//! turn from the war records the player holds, read against the pre-turn
//! snapshot, and written back wholesale:
//!
//! 1. Each war record (support `S`, opponent `O`) contributes its target
//!    closure: `O`, allies of `O` that joined `O`'s war against `S`, `O`'s
//!    leader chain at declaration, and allies of those leaders that joined
//!    on `O`'s behalf.
//! 2. Targets in the player's own chain are dropped.
//! 3. Every visible target brings its whole subtree along.
//! 4. The direct leader's enemies (from the snapshot) are inherited.
//!
//! Because only the snapshot is read, the result does not depend on the
//! order players are processed in.

use crate::state::{PlayerData, PlayerId, WarCoreData};
use crate::view::UniverseView;
use std::collections::BTreeSet;

/// Players a single war record puts us against.
pub fn war_target_ids(war: &WarCoreData, view: &UniverseView) -> BTreeSet<PlayerId> {
    let opponent = war.opponent_id;
    let support = war.support_id;
    let mut targets = BTreeSet::new();
    targets.insert(opponent);

    if let Some(opponent_data) = view.get(opponent) {
        for ally in view.visible_allies(opponent_data.player_id) {
            if ally.internal.diplomacy.has_ally_war(opponent, support) {
                targets.insert(ally.player_id);
            }
        }
    }

    for &leader_id in &war.opponent_leader_ids {
        targets.insert(leader_id);
        for ally in view.visible_allies(leader_id) {
            if ally
                .internal
                .diplomacy
                .has_ally_subordinate_war(leader_id, opponent, support)
            {
                targets.insert(ally.player_id);
            }
        }
    }

    targets
}

/// Full enemy set of `player` for the current turn.
pub fn compute_enemy_ids(player: &PlayerData, view: &UniverseView) -> BTreeSet<PlayerId> {
    let mut all_war_target_ids: BTreeSet<PlayerId> = player
        .internal
        .diplomacy
        .all_wars()
        .flat_map(|war| war_target_ids(war, view))
        .collect();
    all_war_target_ids.retain(|id| !player.is_in_chain(*id));

    let mut enemy_ids: BTreeSet<PlayerId> = all_war_target_ids
        .iter()
        .filter_map(|id| view.get(*id))
        .flat_map(|target| target.subordinate_and_self_ids())
        .collect();

    if let Some(leader) = player.internal.direct_leader_id.and_then(|id| view.get(id)) {
        enemy_ids.extend(leader.internal.diplomacy.enemy_ids.iter().copied());
    }

    enemy_ids.retain(|id| !player.is_in_chain(*id) && view.is_visible(*id));
    enemy_ids
}

/// Recompute and replace the enemy set.
pub fn update_enemy_ids(player: &mut PlayerData, view: &UniverseView) {
    let enemy_ids = compute_enemy_ids(player, view);
    if enemy_ids != player.internal.diplomacy.enemy_ids {
        log::trace!(
            "Player {} enemies: {:?} -> {:?}",
            player.player_id,
            player.internal.diplomacy.enemy_ids,
            enemy_ids
        );
    }
    player.internal.diplomacy.enemy_ids = enemy_ids;
}

fn fights(view: &UniverseView, id: PlayerId, opponent: PlayerId) -> bool {
    view.get(id)
        .map(|p| p.internal.diplomacy.is_at_war_with(opponent))
        .unwrap_or(false)
}

/// Drop war records that no longer describe a real war. Returns how many
/// records were removed.
///
/// Records started this turn are kept even when the other side hasn't
/// caught up yet, because the snapshot predates them.
pub fn clean_war_state(player: &mut PlayerData, view: &UniverseView) -> usize {
    let self_id = player.player_id;
    let turn = view.turn;
    let fresh = |war: &WarCoreData| war.start_turn >= turn;

    let subordinate_ids = player.internal.subordinate_ids.clone();
    let ally_ids: BTreeSet<PlayerId> = player
        .internal
        .diplomacy
        .ally_map
        .keys()
        .copied()
        .collect();

    let relation = &mut player.internal.diplomacy;
    let before = relation.self_wars.len()
        + relation.subordinate_wars.len()
        + relation.ally_wars.len()
        + relation.ally_subordinate_wars.len();

    relation.self_wars.retain(|opponent, war| {
        view.is_visible(*opponent) && (fresh(war) || fights(view, *opponent, self_id))
    });
    relation.subordinate_wars.retain(|(sub, opponent), war| {
        view.is_visible(*opponent)
            && subordinate_ids.contains(sub)
            && (fresh(war) || fights(view, *sub, *opponent))
    });
    relation.ally_wars.retain(|(ally, opponent), war| {
        view.is_visible(*opponent)
            && ally_ids.contains(ally)
            && (fresh(war) || fights(view, *ally, *opponent))
    });
    relation
        .ally_subordinate_wars
        .retain(|(ally, sub, opponent), war| {
            let still_subordinate = view.get(*sub).map(|s| s.is_leader(*ally)).unwrap_or(false);
            view.is_visible(*opponent)
                && ally_ids.contains(ally)
                && still_subordinate
                && (fresh(war) || fights(view, *sub, *opponent))
        });

    let after = relation.self_wars.len()
        + relation.subordinate_wars.len()
        + relation.ally_wars.len()
        + relation.ally_subordinate_wars.len();
    let removed = before - after;
    if removed > 0 {
        log::debug!("Player {} dropped {} stale war records", self_id, removed);
    }
    removed
}

/// Leaders defend their subordinates: mirror every defensive war of a
/// subordinate into `subordinate_wars`. Returns how many wars were joined.
pub fn join_subordinate_wars(player: &mut PlayerData, view: &UniverseView) -> usize {
    let mut joined = Vec::new();
    for sub_id in &player.internal.subordinate_ids {
        let Some(sub) = view.get(*sub_id) else {
            continue;
        };
        for war in sub.internal.diplomacy.self_wars.values() {
            let opponent = war.opponent_id;
            if !war.is_defensive
                || player.is_in_chain(opponent)
                || player.is_ally(opponent)
                || player
                    .internal
                    .diplomacy
                    .subordinate_wars
                    .contains_key(&(*sub_id, opponent))
            {
                continue;
            }
            joined.push((
                (*sub_id, opponent),
                WarCoreData {
                    opponent_id: opponent,
                    support_id: *sub_id,
                    is_defensive: true,
                    is_offensive: false,
                    opponent_leader_ids: war.opponent_leader_ids.clone(),
                    start_turn: view.turn,
                },
            ));
        }
    }

    let count = joined.len();
    for (key, war) in joined {
        log::debug!(
            "Player {} joins defence of {} against {}",
            player.player_id,
            key.0,
            key.1
        );
        player.internal.diplomacy.subordinate_wars.insert(key, war);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{view_of, UniverseBuilder};
    use proptest::prelude::*;

    fn ids(set: &BTreeSet<PlayerId>) -> Vec<PlayerId> {
        set.iter().copied().collect()
    }

    #[test]
    fn test_declarer_sees_target_and_its_subtree() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_player(4)
            .with_leader(3, 2)
            .with_war(1, 2)
            .build();
        let view = view_of(&data, 1);

        let enemies = compute_enemy_ids(&data.players[&1], &view);
        assert_eq!(ids(&enemies), vec![2, 3]);

        let defender = compute_enemy_ids(&data.players[&2], &view);
        assert_eq!(ids(&defender), vec![1]);
    }

    #[test]
    fn test_joined_allies_become_enemies() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_player(4)
            .with_alliance(2, 3)
            .with_alliance(2, 4)
            .with_war(1, 2)
            .with_ally_war(3, 2, 1)
            .build();
        let view = view_of(&data, 1);

        let enemies = compute_enemy_ids(&data.players[&1], &view);
        // 4 is allied to 2 but never joined
        assert_eq!(ids(&enemies), vec![2, 3]);

        // 3 fights 1 through its ally war
        let supporter = compute_enemy_ids(&data.players[&3], &view);
        assert_eq!(ids(&supporter), vec![1]);
    }

    #[test]
    fn test_allies_of_opponent_leader_join_through_subordinate_war() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_player(5)
            .with_leader(2, 3)
            .with_alliance(3, 5)
            .with_war(1, 2)
            .with_ally_subordinate_war(5, 3, 2, 1)
            .build();
        let view = view_of(&data, 1);

        let enemies = compute_enemy_ids(&data.players[&1], &view);
        assert_eq!(ids(&enemies), vec![2, 3, 5]);
    }

    #[test]
    fn test_own_chain_is_never_an_enemy() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(1, 3)
            .with_war(1, 2)
            .build();
        // A stale record claims our own leader leads the opponent.
        data.players
            .get_mut(&1)
            .unwrap()
            .internal
            .diplomacy
            .self_wars
            .get_mut(&2)
            .unwrap()
            .opponent_leader_ids = vec![3];
        let view = view_of(&data, 1);

        let enemies = compute_enemy_ids(&data.players[&1], &view);
        assert_eq!(ids(&enemies), vec![2]);
    }

    #[test]
    fn test_leader_enemies_come_from_snapshot() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(1, 3)
            .build();
        data.players
            .get_mut(&3)
            .unwrap()
            .internal
            .diplomacy
            .enemy_ids
            .insert(2);
        let view = view_of(&data, 1);

        let enemies = compute_enemy_ids(&data.players[&1], &view);
        assert_eq!(ids(&enemies), vec![2]);
    }

    #[test]
    fn test_invisible_targets_are_filtered() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_war(1, 2)
            .build();
        data.players.get_mut(&2).unwrap().internal.is_alive = false;
        let view = view_of(&data, 1);

        assert!(compute_enemy_ids(&data.players[&1], &view).is_empty());
    }

    #[test]
    fn test_update_replaces_previous_enemies() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .build();
        let view = view_of(&data, 1);
        let player = data.players.get_mut(&1).unwrap();
        player.internal.diplomacy.enemy_ids.insert(2);

        update_enemy_ids(player, &view);
        assert!(player.internal.diplomacy.enemy_ids.is_empty());
    }

    #[test]
    fn test_one_sided_war_is_cleaned_after_a_turn() {
        let mut data = UniverseBuilder::new()
            .turn(5)
            .with_player(1)
            .with_player(2)
            .with_war(1, 2)
            .build();
        data.players
            .get_mut(&2)
            .unwrap()
            .internal
            .diplomacy
            .self_wars
            .clear();
        let view = view_of(&data, 1);
        let player = data.players.get_mut(&1).unwrap();

        // Started this turn: the snapshot can't know about it yet
        player.internal.diplomacy.self_wars.get_mut(&2).unwrap().start_turn = 5;
        assert_eq!(clean_war_state(player, &view), 0);

        player.internal.diplomacy.self_wars.get_mut(&2).unwrap().start_turn = 4;
        assert_eq!(clean_war_state(player, &view), 1);
        assert!(player.internal.diplomacy.self_wars.is_empty());
    }

    #[test]
    fn test_ally_war_dropped_with_alliance() {
        let mut data = UniverseBuilder::new()
            .turn(3)
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_alliance(2, 3)
            .with_war(1, 2)
            .with_ally_war(3, 2, 1)
            .build();
        let view = view_of(&data, 3);
        let supporter = data.players.get_mut(&3).unwrap();

        assert_eq!(clean_war_state(supporter, &view), 0);

        supporter.internal.diplomacy.ally_map.clear();
        assert_eq!(clean_war_state(supporter, &view), 1);
        assert!(supporter.internal.diplomacy.ally_wars.is_empty());
    }

    #[test]
    fn test_leader_joins_defensive_wars_of_subordinates() {
        let mut data = UniverseBuilder::new()
            .turn(2)
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_player(4)
            .with_leader(2, 3)
            .with_war(1, 2)
            .with_war(2, 4)
            .build();
        let view = view_of(&data, 3);
        let leader = data.players.get_mut(&3).unwrap();

        assert_eq!(join_subordinate_wars(leader, &view), 1);
        let record = &leader.internal.diplomacy.subordinate_wars[&(2, 1)];
        assert_eq!(record.support_id, 2);
        assert_eq!(record.start_turn, 2);
        // Offensive wars of the subordinate are its own business
        assert!(!leader.internal.diplomacy.subordinate_wars.contains_key(&(2, 4)));

        assert_eq!(join_subordinate_wars(leader, &view), 0);
    }

    proptest! {
        #[test]
        fn prop_enemies_exclude_own_chain(
            leaders in proptest::collection::vec(proptest::option::of(1u32..=6), 6),
            wars in proptest::collection::vec((1u32..=6, 1u32..=6), 0..8),
        ) {
            let mut builder = UniverseBuilder::new();
            for id in 1..=6 {
                builder = builder.with_player(id);
            }
            for (index, leader) in leaders.iter().enumerate() {
                let id = index as u32 + 1;
                if let Some(leader) = leader {
                    // Only point at lower ids so the forest has no cycles
                    if *leader < id {
                        builder = builder.with_leader(id, *leader);
                    }
                }
            }
            for (a, b) in wars {
                if a != b {
                    builder = builder.with_war(a, b);
                }
            }
            let data = builder.build();

            for player in data.players.values() {
                let view = view_of(&data, player.player_id);
                let enemies = compute_enemy_ids(player, &view);
                for enemy in enemies {
                    prop_assert!(!player.is_in_chain(enemy));
                }
            }
        }
    }
}
