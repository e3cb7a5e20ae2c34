use crate::config::UniverseSettings;
use crate::mechanism::hierarchy::rebuild_chains;
use crate::state::{
    AllianceData, Double3D, GlobalData, PlayerData, PlayerId, PlayerType, UniverseData,
    WarCoreData,
};
use crate::view::UniverseView;
use std::sync::Arc;

/// Fluent builder for small hand-made universes.
///
/// Hierarchy links, wars and alliances are recorded as calls are made and
/// resolved in [`UniverseBuilder::build`], so call order doesn't matter as
/// long as every referenced player is added.
pub struct UniverseBuilder {
    data: UniverseData,
    leaders: Vec<(PlayerId, PlayerId)>,
    alliances: Vec<(PlayerId, PlayerId)>,
    wars: Vec<(PlayerId, PlayerId)>,
    ally_wars: Vec<(PlayerId, PlayerId, PlayerId)>,
    ally_subordinate_wars: Vec<(PlayerId, PlayerId, PlayerId, PlayerId)>,
}

impl UniverseBuilder {
    pub fn new() -> Self {
        Self {
            data: UniverseData::default(),
            leaders: Vec::new(),
            alliances: Vec::new(),
            wars: Vec::new(),
            ally_wars: Vec::new(),
            ally_subordinate_wars: Vec::new(),
        }
    }

    pub fn settings(mut self, settings: UniverseSettings) -> Self {
        self.data.settings = settings;
        self
    }

    pub fn turn(mut self, turn: u64) -> Self {
        self.data.state.turn = turn;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.data.state.seed = seed;
        self
    }

    /// An AI player at the origin with some fuel to spend.
    pub fn with_player(mut self, id: PlayerId) -> Self {
        let mut player = PlayerData::new(id);
        player.internal.physics.fuel.storage = 50.0;
        player.internal.physics.fuel.movement = 10.0;
        self.data.players.insert(id, player);
        self.data.state.max_player_id = self.data.state.max_player_id.max(id);
        self
    }

    pub fn with_player_at(self, id: PlayerId, position: Double3D) -> Self {
        self.with_player(id).update(id, |p| p.position = position)
    }

    pub fn with_human(self, id: PlayerId) -> Self {
        self.with_player(id)
            .update(id, |p| p.player_type = PlayerType::Human)
    }

    pub fn with_velocity(self, id: PlayerId, velocity: Double3D) -> Self {
        self.update(id, |p| p.velocity = velocity)
    }

    pub fn with_ai(self, id: PlayerId, ai_name: &str) -> Self {
        self.update(id, |p| p.internal.ai.ai_name = ai_name.to_string())
    }

    /// Apply an arbitrary edit to an already added player.
    pub fn update(mut self, id: PlayerId, edit: impl FnOnce(&mut PlayerData)) -> Self {
        if let Some(player) = self.data.players.get_mut(&id) {
            edit(player);
        }
        self
    }

    pub fn with_leader(mut self, subordinate: PlayerId, leader: PlayerId) -> Self {
        self.leaders.push((subordinate, leader));
        self
    }

    pub fn with_alliance(mut self, a: PlayerId, b: PlayerId) -> Self {
        self.alliances.push((a, b));
        self
    }

    /// `attacker` has declared war on `defender`; both sides hold the record.
    pub fn with_war(mut self, attacker: PlayerId, defender: PlayerId) -> Self {
        self.wars.push((attacker, defender));
        self
    }

    /// `player` supports `ally` against `opponent`.
    pub fn with_ally_war(mut self, player: PlayerId, ally: PlayerId, opponent: PlayerId) -> Self {
        self.ally_wars.push((player, ally, opponent));
        self
    }

    /// `player` supports `subordinate` of `ally` against `opponent`.
    pub fn with_ally_subordinate_war(
        mut self,
        player: PlayerId,
        ally: PlayerId,
        subordinate: PlayerId,
        opponent: PlayerId,
    ) -> Self {
        self.ally_subordinate_wars
            .push((player, ally, subordinate, opponent));
        self
    }

    fn leader_ids(&self, id: PlayerId) -> Vec<PlayerId> {
        self.data
            .players
            .get(&id)
            .map(|p| p.internal.leader_ids.clone())
            .unwrap_or_default()
    }

    fn war(&self, opponent: PlayerId, support: PlayerId, offensive: bool) -> WarCoreData {
        WarCoreData {
            opponent_id: opponent,
            support_id: support,
            is_defensive: !offensive,
            is_offensive: offensive,
            opponent_leader_ids: self.leader_ids(opponent),
            start_turn: 0,
        }
    }

    pub fn build(mut self) -> UniverseData {
        for (subordinate, leader) in std::mem::take(&mut self.leaders) {
            if let Some(player) = self.data.players.get_mut(&subordinate) {
                player.internal.direct_leader_id = Some(leader);
            }
        }
        rebuild_chains(&mut self.data.players);

        for (a, b) in std::mem::take(&mut self.alliances) {
            for (owner, other) in [(a, b), (b, a)] {
                if let Some(player) = self.data.players.get_mut(&owner) {
                    player
                        .internal
                        .diplomacy
                        .ally_map
                        .insert(other, AllianceData { start_turn: 0 });
                }
            }
        }

        for (attacker, defender) in std::mem::take(&mut self.wars) {
            let offense = self.war(defender, attacker, true);
            let defense = self.war(attacker, defender, false);
            if let Some(player) = self.data.players.get_mut(&attacker) {
                player.internal.diplomacy.self_wars.insert(defender, offense);
            }
            if let Some(player) = self.data.players.get_mut(&defender) {
                player.internal.diplomacy.self_wars.insert(attacker, defense);
            }
        }

        for (owner, ally, opponent) in std::mem::take(&mut self.ally_wars) {
            let record = self.war(opponent, ally, false);
            if let Some(player) = self.data.players.get_mut(&owner) {
                player
                    .internal
                    .diplomacy
                    .ally_wars
                    .insert((ally, opponent), record);
            }
        }

        for (owner, ally, sub, opponent) in std::mem::take(&mut self.ally_subordinate_wars) {
            let record = self.war(opponent, sub, false);
            if let Some(player) = self.data.players.get_mut(&owner) {
                player
                    .internal
                    .diplomacy
                    .ally_subordinate_wars
                    .insert((ally, sub, opponent), record);
            }
        }

        self.data.global = GlobalData::from_players(&self.data.players);
        self.data
    }
}

impl Default for UniverseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-turn view of `data` centred on `center`.
pub fn view_of(data: &UniverseData, center: PlayerId) -> UniverseView {
    UniverseView::new(
        center,
        data.state.turn,
        Arc::new(data.settings.clone()),
        data.players.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_resolves_hierarchy_both_ways() {
        let data = UniverseBuilder::default()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(3, 2)
            .with_leader(2, 1)
            .build();

        assert_eq!(data.players[&3].internal.leader_ids, vec![2, 1]);
        assert!(data.players[&1].is_subordinate(3));
        assert!(data.players[&1].internal.direct_subordinate_ids.contains(&2));
        assert!(!data.players[&1].internal.direct_subordinate_ids.contains(&3));
    }

    #[test]
    fn test_builder_wars_record_leader_chains() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(2, 3)
            .with_war(1, 2)
            .build();

        let record = &data.players[&1].internal.diplomacy.self_wars[&2];
        assert!(record.is_offensive);
        assert_eq!(record.opponent_leader_ids, vec![3]);
        assert!(data.players[&2].internal.diplomacy.self_wars[&1].is_defensive);
    }

    #[test]
    fn test_human_players() {
        let data = UniverseBuilder::new().with_human(1).with_player(2).build();
        assert_eq!(data.players[&1].player_type, PlayerType::Human);
        assert_eq!(data.players[&2].player_type, PlayerType::Ai);
        assert_eq!(data.state.max_player_id, 2);
    }
}
