//! Relation, alliance and war records of a single player.
//!
//! War participation is stored in four flat tables keyed by composite ids:
//!
//! | Table | Key | Meaning |
//! |-------|-----|---------|
//! | `self_wars` | opponent | this player fights `opponent` |
//! | `subordinate_wars` | (subordinate, opponent) | defending a subordinate |
//! | `ally_wars` | (ally, opponent) | supporting an ally |
//! | `ally_subordinate_wars` | (ally, ally subordinate, opponent) | supporting an ally's subordinate |
//!
//! `enemy_ids` is derived from these tables each turn by
//! [`crate::diplomacy::compute_enemy_ids`] and must never be edited by hand.

use super::{serde_entries, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Affinity bounds for `relation_map` entries.
pub const MIN_RELATION: f64 = -100.0;
pub const MAX_RELATION: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarCoreData {
    pub opponent_id: PlayerId,
    /// The side this record defends: the owner itself for self wars,
    /// otherwise the subordinate, ally or ally subordinate being supported.
    pub support_id: PlayerId,
    pub is_defensive: bool,
    pub is_offensive: bool,
    /// Opponent's leader chain when the war started.
    pub opponent_leader_ids: Vec<PlayerId>,
    pub start_turn: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllianceData {
    pub start_turn: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RelationData {
    /// Affinity toward other players in `[MIN_RELATION, MAX_RELATION]`.
    pub relation_map: BTreeMap<PlayerId, f64>,
    /// Derived each turn; see module docs.
    pub enemy_ids: BTreeSet<PlayerId>,
    pub ally_map: BTreeMap<PlayerId, AllianceData>,
    /// Players that proposed an alliance which hasn't been answered yet.
    pub alliance_proposals: BTreeSet<PlayerId>,
    pub self_wars: BTreeMap<PlayerId, WarCoreData>,
    #[serde(with = "serde_entries")]
    pub subordinate_wars: BTreeMap<(PlayerId, PlayerId), WarCoreData>,
    #[serde(with = "serde_entries")]
    pub ally_wars: BTreeMap<(PlayerId, PlayerId), WarCoreData>,
    #[serde(with = "serde_entries")]
    pub ally_subordinate_wars: BTreeMap<(PlayerId, PlayerId, PlayerId), WarCoreData>,
}

impl RelationData {
    pub fn relation(&self, id: PlayerId) -> f64 {
        self.relation_map.get(&id).copied().unwrap_or(0.0)
    }

    /// Add `delta` to the affinity toward `id`, clamped to the valid range.
    pub fn change_relation(&mut self, id: PlayerId, delta: f64) {
        let value = self.relation_map.entry(id).or_insert(0.0);
        *value = (*value + delta).clamp(MIN_RELATION, MAX_RELATION);
    }

    pub fn is_at_war_with(&self, id: PlayerId) -> bool {
        self.self_wars.contains_key(&id)
    }

    pub fn has_ally_war(&self, ally: PlayerId, opponent: PlayerId) -> bool {
        self.ally_wars.contains_key(&(ally, opponent))
    }

    pub fn has_ally_subordinate_war(
        &self,
        ally: PlayerId,
        subordinate: PlayerId,
        opponent: PlayerId,
    ) -> bool {
        self.ally_subordinate_wars
            .contains_key(&(ally, subordinate, opponent))
    }

    /// Every war record held, regardless of table.
    pub fn all_wars(&self) -> impl Iterator<Item = &WarCoreData> {
        self.self_wars
            .values()
            .chain(self.subordinate_wars.values())
            .chain(self.ally_wars.values())
            .chain(self.ally_subordinate_wars.values())
    }

    /// Drop the alliance with `ally` and every war fought on its behalf.
    pub fn remove_ally(&mut self, ally: PlayerId) {
        self.ally_map.remove(&ally);
        self.ally_wars.retain(|(a, _), _| *a != ally);
        self.ally_subordinate_wars.retain(|(a, _, _), _| *a != ally);
    }

    /// Drop every record that names `id` in any role.
    pub fn forget_player(&mut self, id: PlayerId) {
        self.relation_map.remove(&id);
        self.enemy_ids.remove(&id);
        self.alliance_proposals.remove(&id);
        self.remove_ally(id);
        self.self_wars.remove(&id);
        self.subordinate_wars
            .retain(|(s, o), _| *s != id && *o != id);
        self.ally_wars.retain(|(_, o), _| *o != id);
        self.ally_subordinate_wars
            .retain(|(_, s, o), _| *s != id && *o != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn war(opponent: PlayerId, support: PlayerId) -> WarCoreData {
        WarCoreData {
            opponent_id: opponent,
            support_id: support,
            is_defensive: true,
            is_offensive: false,
            opponent_leader_ids: vec![],
            start_turn: 0,
        }
    }

    #[test]
    fn test_relation_is_clamped() {
        let mut relation = RelationData::default();
        relation.change_relation(2, 250.0);
        assert_eq!(relation.relation(2), MAX_RELATION);

        relation.change_relation(2, -500.0);
        assert_eq!(relation.relation(2), MIN_RELATION);
    }

    #[test]
    fn test_remove_ally_drops_supporting_wars() {
        let mut relation = RelationData::default();
        relation.ally_map.insert(2, AllianceData { start_turn: 0 });
        relation.ally_wars.insert((2, 5), war(5, 2));
        relation.ally_subordinate_wars.insert((2, 3, 5), war(5, 3));
        relation.ally_wars.insert((4, 5), war(5, 4));

        relation.remove_ally(2);

        assert!(!relation.ally_map.contains_key(&2));
        assert!(!relation.has_ally_war(2, 5));
        assert!(!relation.has_ally_subordinate_war(2, 3, 5));
        assert!(relation.has_ally_war(4, 5));
    }

    #[test]
    fn test_war_tables_survive_json() {
        let mut relation = RelationData::default();
        relation.self_wars.insert(4, war(4, 1));
        relation.subordinate_wars.insert((2, 4), war(4, 2));
        relation.ally_wars.insert((3, 4), war(4, 3));
        relation.ally_subordinate_wars.insert((3, 6, 4), war(4, 6));

        let json = serde_json::to_string(&relation).unwrap();
        let back: RelationData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, relation);
    }
}
