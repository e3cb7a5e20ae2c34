//! Leader/subordinate bookkeeping.
//!
//! `direct_leader_id` is the authoritative link. Everything else
//! (`leader_ids`, `direct_subordinate_ids`, `subordinate_ids`) is derived
//! from it, one level per turn, by [`sync_hierarchy`].

use crate::command::{Command, CommandKind};
use crate::state::{OrdMap, PlayerData, PlayerId};
use crate::view::UniverseView;
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

/// Recompute every derived hierarchy field from `direct_leader_id` links,
/// in one pass over the whole universe.
///
/// Links to missing, dead or self ids are dropped. A cycle is broken by
/// cutting the link of its lowest id.
pub fn rebuild_chains(players: &mut OrdMap<PlayerId, PlayerData>) {
    let mut links: BTreeMap<PlayerId, Option<PlayerId>> = players
        .values()
        .map(|p| {
            let leader = p.internal.direct_leader_id.filter(|l| {
                *l != p.player_id && players.get(l).map(|l| l.is_alive()).unwrap_or(false)
            });
            (p.player_id, leader)
        })
        .collect();

    let ids: Vec<PlayerId> = links.keys().copied().collect();
    for &id in &ids {
        let mut seen = BTreeSet::from([id]);
        let mut current = links[&id];
        while let Some(next) = current {
            if !seen.insert(next) {
                if next == id {
                    log::warn!("Leader cycle through player {}; cutting its link", id);
                    links.insert(id, None);
                }
                break;
            }
            current = links.get(&next).copied().flatten();
        }
    }

    let mut chains: BTreeMap<PlayerId, Vec<PlayerId>> = BTreeMap::new();
    for &id in &ids {
        let mut chain = Vec::new();
        let mut current = links[&id];
        while let Some(next) = current {
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = links.get(&next).copied().flatten();
        }
        chains.insert(id, chain);
    }

    for &id in &ids {
        if let Some(player) = players.get_mut(&id) {
            let internal = &mut player.internal;
            internal.direct_leader_id = links.get(&id).copied().flatten();
            internal.leader_ids = chains.remove(&id).unwrap_or_default();
            internal.direct_subordinate_ids.clear();
            internal.subordinate_ids.clear();
        }
    }

    let edges: Vec<(PlayerId, Option<PlayerId>, Vec<PlayerId>)> = players
        .values()
        .map(|p| {
            (
                p.player_id,
                p.internal.direct_leader_id,
                p.internal.leader_ids.clone(),
            )
        })
        .collect();
    for (id, direct_leader, leaders) in edges {
        if let Some(leader) = direct_leader.and_then(|l| players.get_mut(&l)) {
            leader.internal.direct_subordinate_ids.insert(id);
        }
        for leader_id in leaders {
            if let Some(leader) = players.get_mut(&leader_id) {
                leader.internal.subordinate_ids.insert(id);
            }
        }
    }
}

/// Refresh the derived hierarchy fields of one player from the snapshot.
///
/// Returns a `SyncSubordinates` command for the direct leader when the
/// snapshot shows it doesn't know about us.
#[instrument(skip_all, name = "sync_hierarchy")]
pub fn sync_hierarchy(player: &mut PlayerData, view: &UniverseView) -> Vec<Command> {
    let self_id = player.player_id;

    let leader_ids = match player.internal.direct_leader_id {
        Some(leader_id) => match view.get(leader_id) {
            Some(leader) => {
                let mut chain = vec![leader_id];
                for &id in &leader.internal.leader_ids {
                    if id == self_id || chain.contains(&id) {
                        break;
                    }
                    chain.push(id);
                }
                chain
            }
            None => {
                log::info!("Player {} lost its leader {}", self_id, leader_id);
                player.internal.direct_leader_id = None;
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    // A subordinate that now answers to someone else is gone. One whose
    // snapshot shows no leader may have surrendered to us this turn.
    player.internal.direct_subordinate_ids.retain(|id| {
        !leader_ids.contains(id)
            && view
                .get(*id)
                .map(|sub| sub.internal.direct_leader_id.map_or(true, |l| l == self_id))
                .unwrap_or(false)
    });

    let mut subordinate_ids = BTreeSet::new();
    for &id in &player.internal.direct_subordinate_ids {
        subordinate_ids.insert(id);
        if let Some(sub) = view.get(id) {
            subordinate_ids.extend(sub.internal.subordinate_ids.iter().copied().filter(|s| {
                *s != self_id && !leader_ids.contains(s) && view.is_visible(*s)
            }));
        }
    }

    player.internal.leader_ids = leader_ids;
    player.internal.subordinate_ids = subordinate_ids;

    let mut commands = Vec::new();
    if let Some(leader) = player.internal.direct_leader_id.and_then(|id| view.get(id)) {
        if !leader.internal.direct_subordinate_ids.contains(&self_id) {
            commands.push(Command::new(
                self_id,
                leader.player_id,
                view.turn,
                CommandKind::SyncSubordinates {
                    subordinate_ids: player.internal.subordinate_ids.clone(),
                },
            ));
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{view_of, UniverseBuilder};

    #[test]
    fn test_rebuild_breaks_cycles() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .build();
        for (sub, leader) in [(1, 2), (2, 3), (3, 1)] {
            data.players.get_mut(&sub).unwrap().internal.direct_leader_id = Some(leader);
        }

        rebuild_chains(&mut data.players);

        assert!(data.players[&1].is_top_leader());
        assert_eq!(data.players[&3].internal.leader_ids, vec![1]);
        assert_eq!(data.players[&2].internal.leader_ids, vec![3, 1]);
        assert!(data.players[&1].is_subordinate(2));
        assert!(data.players[&1].is_subordinate(3));
    }

    #[test]
    fn test_rebuild_drops_dead_leaders() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_leader(2, 1)
            .build();
        data.players.get_mut(&1).unwrap().internal.is_alive = false;

        rebuild_chains(&mut data.players);
        assert!(data.players[&2].is_top_leader());
    }

    #[test]
    fn test_sync_follows_leader_chain() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(2, 1)
            .build();
        // 3 now answers to 2, which hasn't recorded it yet
        data.players.get_mut(&3).unwrap().internal.direct_leader_id = Some(2);
        let view = view_of(&data, 3);

        let player = data.players.get_mut(&3).unwrap();
        let commands = sync_hierarchy(player, &view);

        assert_eq!(player.internal.leader_ids, vec![2, 1]);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].to_id, 2);
        assert!(matches!(
            commands[0].kind,
            CommandKind::SyncSubordinates { .. }
        ));
    }

    #[test]
    fn test_sync_clears_dead_leader() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_leader(2, 1)
            .build();
        data.players.get_mut(&1).unwrap().internal.is_alive = false;
        let view = view_of(&data, 2);

        let player = data.players.get_mut(&2).unwrap();
        assert!(sync_hierarchy(player, &view).is_empty());
        assert!(player.is_top_leader());
        assert!(player.internal.leader_ids.is_empty());
    }

    #[test]
    fn test_sync_drops_subordinates_that_moved_on() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_player(4)
            .with_leader(2, 1)
            .with_leader(3, 1)
            .with_leader(4, 3)
            .build();
        data.players.get_mut(&2).unwrap().internal.direct_leader_id = Some(4);
        let view = view_of(&data, 1);

        let leader = data.players.get_mut(&1).unwrap();
        sync_hierarchy(leader, &view);

        let direct: Vec<_> = leader.internal.direct_subordinate_ids.iter().copied().collect();
        assert_eq!(direct, vec![3]);
        let all: Vec<_> = leader.internal.subordinate_ids.iter().copied().collect();
        assert_eq!(all, vec![3, 4]);
    }
}
