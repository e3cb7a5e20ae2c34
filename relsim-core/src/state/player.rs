use super::components::{
    AiData, EconomyData, ModifierData, PhysicsData, PoliticsData, PopulationData, ScienceData,
};
use super::diplomacy::RelationData;
use super::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Who submits commands for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayerType {
    Human,
    #[default]
    Ai,
}

/// Position or velocity in grid units (velocity in grid units per turn).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Double3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Double3D {
    pub const ZERO: Double3D = Double3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Double3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn add(&self, other: &Double3D) -> Double3D {
        Double3D::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn sub(&self, other: &Double3D) -> Double3D {
        Double3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(&self, factor: f64) -> Double3D {
        Double3D::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn distance(&self, other: &Double3D) -> f64 {
        self.sub(other).magnitude()
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalize(&self) -> Double3D {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            Double3D::new(self.x / magnitude, self.y / magnitude, self.z / magnitude)
        } else {
            Double3D::ZERO
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Internal data of a player, split into independent components so each
/// mechanism touches only the parts it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInternalData {
    pub is_alive: bool,
    pub direct_leader_id: Option<PlayerId>,
    pub direct_subordinate_ids: BTreeSet<PlayerId>,
    /// Leader chain, direct leader first and top leader last.
    pub leader_ids: Vec<PlayerId>,
    /// All transitive subordinates.
    pub subordinate_ids: BTreeSet<PlayerId>,
    pub physics: PhysicsData,
    pub economy: EconomyData,
    pub population: PopulationData,
    pub diplomacy: RelationData,
    pub science: ScienceData,
    pub politics: PoliticsData,
    pub modifiers: ModifierData,
    pub ai: AiData,
}

impl Default for PlayerInternalData {
    fn default() -> Self {
        Self {
            is_alive: true,
            direct_leader_id: None,
            direct_subordinate_ids: BTreeSet::new(),
            leader_ids: Vec::new(),
            subordinate_ids: BTreeSet::new(),
            physics: PhysicsData::default(),
            economy: EconomyData::default(),
            population: PopulationData::default(),
            diplomacy: RelationData::default(),
            science: ScienceData::default(),
            politics: PoliticsData::default(),
            modifiers: ModifierData::default(),
            ai: AiData::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerData {
    pub player_id: PlayerId,
    pub name: String,
    pub player_type: PlayerType,
    pub position: Double3D,
    pub velocity: Double3D,
    /// Fraction of a proper-time turn accumulated so far, in `[0, 1)`.
    pub time_dilation_counter: f64,
    /// Whether dilated mechanisms run for this player this turn.
    pub is_time_dilation_action_turn: bool,
    pub internal: PlayerInternalData,
}

impl PlayerData {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            name: format!("Player {}", player_id),
            is_time_dilation_action_turn: true,
            ..Default::default()
        }
    }

    pub fn is_alive(&self) -> bool {
        self.internal.is_alive
    }

    pub fn is_top_leader(&self) -> bool {
        self.internal.direct_leader_id.is_none()
    }

    pub fn top_leader_id(&self) -> PlayerId {
        self.internal
            .leader_ids
            .last()
            .copied()
            .unwrap_or(self.player_id)
    }

    pub fn is_leader(&self, id: PlayerId) -> bool {
        self.internal.leader_ids.contains(&id)
    }

    pub fn is_leader_or_self(&self, id: PlayerId) -> bool {
        id == self.player_id || self.is_leader(id)
    }

    pub fn is_subordinate(&self, id: PlayerId) -> bool {
        self.internal.subordinate_ids.contains(&id)
    }

    pub fn is_subordinate_or_self(&self, id: PlayerId) -> bool {
        id == self.player_id || self.is_subordinate(id)
    }

    /// Whether `id` is anywhere in this player's own command chain.
    pub fn is_in_chain(&self, id: PlayerId) -> bool {
        self.is_leader_or_self(id) || self.is_subordinate(id)
    }

    pub fn subordinate_and_self_ids(&self) -> BTreeSet<PlayerId> {
        let mut ids = self.internal.subordinate_ids.clone();
        ids.insert(self.player_id);
        ids
    }

    pub fn is_ally(&self, id: PlayerId) -> bool {
        self.internal.diplomacy.ally_map.contains_key(&id)
    }

    pub fn is_enemy(&self, id: PlayerId) -> bool {
        self.internal.diplomacy.enemy_ids.contains(&id)
    }

    /// Rough military weight used by AI comparisons.
    pub fn strength(&self) -> f64 {
        let physics = &self.internal.physics;
        let population = self.internal.population.population;
        let tech = 1.0 + self.internal.science.knowledge / 100.0;
        (physics.core_rest_mass + physics.fuel.total() + population) * tech
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chained() -> PlayerData {
        let mut player = PlayerData::new(5);
        player.internal.direct_leader_id = Some(3);
        player.internal.leader_ids = vec![3, 1];
        player.internal.direct_subordinate_ids.insert(7);
        player.internal.subordinate_ids.extend([7, 9]);
        player
    }

    #[test]
    fn test_chain_queries() {
        let player = chained();

        assert!(player.is_leader(1));
        assert!(player.is_leader(3));
        assert!(!player.is_leader(7));
        assert!(player.is_subordinate(9));
        assert!(player.is_in_chain(5));
        assert!(!player.is_in_chain(2));
        assert_eq!(player.top_leader_id(), 1);
        assert!(!player.is_top_leader());
    }

    #[test]
    fn test_subordinate_and_self() {
        let ids: Vec<_> = chained().subordinate_and_self_ids().into_iter().collect();
        assert_eq!(ids, vec![5, 7, 9]);
    }

    #[test]
    fn test_top_leader_of_independent_player_is_self() {
        let player = PlayerData::new(4);
        assert!(player.is_top_leader());
        assert_eq!(player.top_leader_id(), 4);
    }

    #[test]
    fn test_vector_math() {
        let a = Double3D::new(3.0, 4.0, 0.0);
        assert_eq!(a.magnitude(), 5.0);
        assert_eq!(a.normalize(), Double3D::new(0.6, 0.8, 0.0));
        assert_eq!(Double3D::ZERO.normalize(), Double3D::ZERO);
        assert_eq!(a.distance(&Double3D::ZERO), 5.0);
    }
}
