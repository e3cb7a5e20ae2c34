//! Diplomatic upkeep run every universe turn.

use crate::diplomacy;
use crate::state::{PlayerData, PlayerId};
use crate::view::UniverseView;
use std::collections::BTreeSet;
use tracing::instrument;

/// Relation drift per turn toward enemies, allies and the own chain.
const ENEMY_DRIFT: f64 = -1.0;
const ALLY_DRIFT: f64 = 0.5;
const CHAIN_DRIFT: f64 = 0.25;

/// Fraction of every other relation forgotten per turn.
const RELATION_DECAY: f64 = 0.02;

/// Drop stale war records, then join the defensive wars of subordinates.
#[instrument(skip_all, name = "update_war_state")]
pub fn update_war_state(player: &mut PlayerData, view: &UniverseView) {
    diplomacy::clean_war_state(player, view);
    diplomacy::join_subordinate_wars(player, view);
}

#[instrument(skip_all, name = "update_enemy")]
pub fn update_enemy(player: &mut PlayerData, view: &UniverseView) {
    diplomacy::update_enemy_ids(player, view);
}

/// Forget players that are gone and let relations drift.
#[instrument(skip_all, name = "update_relation")]
pub fn update_relation(player: &mut PlayerData, view: &UniverseView) {
    let relation = &player.internal.diplomacy;
    let gone: BTreeSet<PlayerId> = relation
        .relation_map
        .keys()
        .chain(relation.ally_map.keys())
        .chain(relation.alliance_proposals.iter())
        .copied()
        .filter(|id| !view.is_visible(*id))
        .collect();
    for id in gone {
        log::debug!("Player {} forgets vanished player {}", player.player_id, id);
        player.internal.diplomacy.forget_player(id);
    }

    let self_id = player.player_id;
    let others: Vec<PlayerId> = view.player_ids().filter(|id| *id != self_id).collect();
    for id in others {
        let drift = if player.is_enemy(id) {
            ENEMY_DRIFT
        } else if player.is_ally(id) {
            ALLY_DRIFT
        } else if player.is_in_chain(id) {
            CHAIN_DRIFT
        } else {
            -player.internal.diplomacy.relation(id) * RELATION_DECAY
        };
        if drift != 0.0 {
            player.internal.diplomacy.change_relation(id, drift);
        }
    }
}

/// Count down peace treaties and drop those with vanished players.
#[instrument(skip_all, name = "update_modifier")]
pub fn update_modifier(player: &mut PlayerData, view: &UniverseView) {
    let modifiers = &mut player.internal.modifiers;
    modifiers.peace_treaty.retain(|id, _| view.is_visible(*id));
    modifiers.tick();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{view_of, UniverseBuilder};

    #[test]
    fn test_relation_drifts_toward_allies_and_away_from_enemies() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_alliance(1, 2)
            .build();
        let view = view_of(&data, 1);
        let player = data.players.get_mut(&1).unwrap();
        player.internal.diplomacy.enemy_ids.insert(3);

        update_relation(player, &view);

        assert_eq!(player.internal.diplomacy.relation(2), ALLY_DRIFT);
        assert_eq!(player.internal.diplomacy.relation(3), ENEMY_DRIFT);
    }

    #[test]
    fn test_neutral_relation_decays() {
        let mut data = UniverseBuilder::new().with_player(1).with_player(2).build();
        let view = view_of(&data, 1);
        let player = data.players.get_mut(&1).unwrap();
        player.internal.diplomacy.change_relation(2, 50.0);

        update_relation(player, &view);
        assert!((player.internal.diplomacy.relation(2) - 49.0).abs() < 1e-9);
    }

    #[test]
    fn test_vanished_players_are_forgotten() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_alliance(1, 2)
            .build();
        data.players.get_mut(&2).unwrap().internal.is_alive = false;
        let view = view_of(&data, 1);
        let player = data.players.get_mut(&1).unwrap();
        player.internal.diplomacy.change_relation(2, 10.0);
        player.internal.modifiers.add_peace_treaty(2, 5);

        update_relation(player, &view);
        update_modifier(player, &view);

        assert!(!player.is_ally(2));
        assert!(player.internal.diplomacy.relation_map.is_empty());
        assert!(player.internal.modifiers.peace_treaty.is_empty());
    }

    #[test]
    fn test_war_state_joins_and_cleans() {
        let mut data = UniverseBuilder::new()
            .turn(1)
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(2, 3)
            .with_war(1, 2)
            .build();
        let view = view_of(&data, 3);
        let leader = data.players.get_mut(&3).unwrap();

        update_war_state(leader, &view);
        assert!(leader.internal.diplomacy.subordinate_wars.contains_key(&(2, 1)));
    }
}
