//! Universe and player state.
//!
//! Everything here is plain data: serializable, cloneable and compared
//! structurally. Behaviour lives in the command, diplomacy and mechanism
//! modules.

pub mod components;
pub mod diplomacy;
pub mod player;

pub use components::{
    AiData, EconomyData, FuelData, ModifierData, PhysicsData, PoliticsData, PopulationData,
    ResourceType, ScienceData,
};
pub use diplomacy::{AllianceData, RelationData, WarCoreData};
pub use im::OrdMap;
pub use player::{Double3D, PlayerData, PlayerInternalData, PlayerType};

use crate::config::UniverseSettings;
use serde::{Deserialize, Serialize};

pub type PlayerId = u32;

/// Bookkeeping that changes every turn but belongs to no player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UniverseState {
    /// Number of completed universe turns.
    pub turn: u64,
    /// Seed every per-turn RNG stream is derived from.
    pub seed: u64,
    /// Highest player id ever assigned.
    pub max_player_id: PlayerId,
    /// Players removed after dying, in order of death.
    pub dead_player_ids: Vec<PlayerId>,
}

/// Universe-wide aggregates, refreshed at the end of every turn and read by
/// mechanisms on the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalData {
    /// Highest knowledge reached by any living player.
    pub max_knowledge: f64,
    pub total_population: f64,
    pub living_player_count: usize,
}

impl GlobalData {
    pub fn from_players(players: &OrdMap<PlayerId, PlayerData>) -> Self {
        let mut global = GlobalData::default();
        for player in players.values().filter(|p| p.is_alive()) {
            global.max_knowledge = global
                .max_knowledge
                .max(player.internal.science.knowledge);
            global.total_population += player.internal.population.population;
            global.living_player_count += 1;
        }
        global
    }
}

/// Complete serializable state of one universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UniverseData {
    pub settings: UniverseSettings,
    pub state: UniverseState,
    pub global: GlobalData,
    /// Live player data. `OrdMap` gives deterministic iteration and O(1)
    /// structural-sharing clones for per-turn snapshots.
    pub players: OrdMap<PlayerId, PlayerData>,
}

impl UniverseData {
    pub fn get(&self, id: PlayerId) -> Option<&PlayerData> {
        self.players.get(&id)
    }

    /// Living players in id order.
    pub fn living_players(&self) -> impl Iterator<Item = &PlayerData> {
        self.players.values().filter(|p| p.is_alive())
    }

    /// Compute a deterministic checksum of the universe.
    ///
    /// Hashes the JSON encoding, which is ordered because every map in the
    /// state is ordered.
    pub fn checksum(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.state.turn.hash(&mut hasher);
        match serde_json::to_string(&self.players) {
            Ok(json) => json.hash(&mut hasher),
            Err(e) => log::warn!("Checksum serialization failed: {}", e),
        }
        hasher.finish()
    }
}

/// Serialize maps with non-string keys as a list of entries.
///
/// JSON object keys must be strings, so the composite-key war tables go
/// through this.
pub mod serde_entries {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: DeserializeOwned + Ord,
        V: DeserializeOwned,
        D: Deserializer<'de>,
    {
        let entries: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::UniverseBuilder;

    #[test]
    fn test_checksum_determinism() {
        let data = UniverseBuilder::new().with_player(1).with_player(2).build();
        assert_eq!(data.checksum(), data.checksum());
    }

    #[test]
    fn test_checksum_sensitivity() {
        let a = UniverseBuilder::new().with_player(1).build();
        let mut b = a.clone();
        b.players
            .get_mut(&1)
            .unwrap()
            .internal
            .physics
            .fuel
            .storage += 1.0;

        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_global_data_skips_dead_players() {
        let mut data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .build();
        data.players.get_mut(&2).unwrap().internal.is_alive = false;

        let global = GlobalData::from_players(&data.players);
        assert_eq!(global.living_player_count, 1);
        assert_eq!(
            global.total_population,
            data.players[&1].internal.population.population
        );
    }
}
