//! Read-only views of the pre-turn universe.
//!
//! A [`UniverseView`] is what a player's AI and mechanisms are allowed to
//! read about the rest of the universe. All views built during one turn
//! share the same frozen `OrdMap`, so constructing one is O(1) and no view
//! ever observes another player's in-progress mutation.

use crate::config::UniverseSettings;
use crate::state::{OrdMap, PlayerData, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseView {
    /// The player this view belongs to.
    pub center_player_id: PlayerId,
    pub turn: u64,
    pub settings: Arc<UniverseSettings>,
    players: OrdMap<PlayerId, PlayerData>,
}

impl UniverseView {
    pub fn new(
        center_player_id: PlayerId,
        turn: u64,
        settings: Arc<UniverseSettings>,
        players: OrdMap<PlayerId, PlayerData>,
    ) -> Self {
        Self {
            center_player_id,
            turn,
            settings,
            players,
        }
    }

    /// Same snapshot, seen from another player.
    pub fn recentered(&self, center_player_id: PlayerId) -> Self {
        Self {
            center_player_id,
            ..self.clone()
        }
    }

    /// The viewing player, if it is alive in the snapshot.
    pub fn center(&self) -> Option<&PlayerData> {
        self.get(self.center_player_id)
    }

    /// A living player in the snapshot. Dead or unknown ids are `None`.
    pub fn get(&self, id: PlayerId) -> Option<&PlayerData> {
        self.players.get(&id).filter(|p| p.is_alive())
    }

    pub fn is_visible(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    /// Living player ids in ascending order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players
            .values()
            .filter(|p| p.is_alive())
            .map(|p| p.player_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerData> {
        self.players.values().filter(|p| p.is_alive())
    }

    /// Living players other than the center, nearest first. Ties keep id
    /// order.
    pub fn neighbours(&self, max_count: usize) -> Vec<&PlayerData> {
        let Some(center) = self.center() else {
            return Vec::new();
        };
        let mut others: Vec<&PlayerData> = self
            .players()
            .filter(|p| p.player_id != center.player_id)
            .collect();
        others.sort_by(|a, b| {
            let da = a.position.distance(&center.position);
            let db = b.position.distance(&center.position);
            da.total_cmp(&db).then(a.player_id.cmp(&b.player_id))
        });
        others.truncate(max_count);
        others
    }

    /// Allies of `id` that are still visible.
    pub fn visible_allies(&self, id: PlayerId) -> Vec<&PlayerData> {
        match self.get(id) {
            Some(player) => player
                .internal
                .diplomacy
                .ally_map
                .keys()
                .filter_map(|ally| self.get(*ally))
                .collect(),
            None => Vec::new(),
        }
    }
}
