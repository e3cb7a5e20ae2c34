//! Independent data components of a player.

use super::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FuelData {
    /// Reserve that can be sent, converted or allocated.
    pub storage: f64,
    /// Fuel set aside for velocity changes.
    pub movement: f64,
}

impl FuelData {
    pub fn total(&self) -> f64 {
        self.storage + self.movement
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsData {
    /// Rest mass of everything that isn't fuel.
    pub core_rest_mass: f64,
    pub fuel: FuelData,
    /// Fraction of total fuel the owner wants kept in the movement tank.
    pub target_movement_fraction: f64,
}

impl Default for PhysicsData {
    fn default() -> Self {
        Self {
            core_rest_mass: 10.0,
            fuel: FuelData::default(),
            target_movement_fraction: 0.3,
        }
    }
}

impl PhysicsData {
    pub fn total_rest_mass(&self) -> f64 {
        self.core_rest_mass + self.fuel.total()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ResourceType {
    Plant,
    Animal,
    Metal,
    Plastic,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Plant,
        ResourceType::Animal,
        ResourceType::Metal,
        ResourceType::Plastic,
    ];

    /// Whether the population eats this resource.
    pub fn is_food(&self) -> bool {
        matches!(self, ResourceType::Plant | ResourceType::Animal)
    }

    /// Fuel obtained per unit converted.
    pub fn fuel_value(&self) -> f64 {
        match self {
            ResourceType::Plant => 0.2,
            ResourceType::Animal => 0.3,
            ResourceType::Metal => 0.5,
            ResourceType::Plastic => 0.8,
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceType::Plant => "plant",
            ResourceType::Animal => "animal",
            ResourceType::Metal => "metal",
            ResourceType::Plastic => "plastic",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyData {
    pub resources: BTreeMap<ResourceType, f64>,
    /// Stock level the owner tries to hold per resource.
    pub resource_targets: BTreeMap<ResourceType, f64>,
}

impl Default for EconomyData {
    fn default() -> Self {
        Self {
            resources: ResourceType::ALL.iter().map(|r| (*r, 0.0)).collect(),
            resource_targets: ResourceType::ALL.iter().map(|r| (*r, 50.0)).collect(),
        }
    }
}

impl EconomyData {
    pub fn amount(&self, resource: ResourceType) -> f64 {
        self.resources.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn target(&self, resource: ResourceType) -> f64 {
        self.resource_targets.get(&resource).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, resource: ResourceType, amount: f64) {
        let stock = self.resources.entry(resource).or_insert(0.0);
        *stock = (*stock + amount).max(0.0);
    }

    pub fn food(&self) -> f64 {
        ResourceType::ALL
            .iter()
            .filter(|r| r.is_food())
            .map(|r| self.amount(*r))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationData {
    pub population: f64,
    /// In `[0, 1]`.
    pub satisfaction: f64,
    /// Per proper-time turn growth rate at full satisfaction.
    pub growth_rate: f64,
}

impl Default for PopulationData {
    fn default() -> Self {
        Self {
            population: 100.0,
            satisfaction: 0.5,
            growth_rate: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScienceData {
    pub knowledge: f64,
    /// Knowledge gained per unit of population per proper-time turn.
    pub research_rate: f64,
}

impl Default for ScienceData {
    fn default() -> Self {
        Self {
            knowledge: 0.0,
            research_rate: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticsData {
    /// Fraction of fuel production paid to the direct leader.
    pub tax_rate: f64,
}

impl Default for PoliticsData {
    fn default() -> Self {
        Self { tax_rate: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModifierData {
    /// Remaining turns during which war on the keyed player is forbidden.
    pub peace_treaty: BTreeMap<PlayerId, u32>,
}

impl ModifierData {
    pub fn can_declare_war(&self, id: PlayerId) -> bool {
        !self.peace_treaty.contains_key(&id)
    }

    /// Add or extend a peace treaty.
    pub fn add_peace_treaty(&mut self, id: PlayerId, turns: u32) {
        let remaining = self.peace_treaty.entry(id).or_insert(0);
        *remaining = (*remaining).max(turns);
    }

    /// Count every modifier down by one turn, dropping expired ones.
    pub fn tick(&mut self) {
        for remaining in self.peace_treaty.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.peace_treaty.retain(|_, remaining| *remaining > 0);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiData {
    /// Registered AI used when this player is AI controlled.
    pub ai_name: String,
}

impl Default for AiData {
    fn default() -> Self {
        Self {
            ai_name: "default".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peace_treaty_expires() {
        let mut modifiers = ModifierData::default();
        modifiers.add_peace_treaty(3, 2);
        assert!(!modifiers.can_declare_war(3));

        modifiers.tick();
        assert!(!modifiers.can_declare_war(3));

        modifiers.tick();
        assert!(modifiers.can_declare_war(3));
        assert!(modifiers.peace_treaty.is_empty());
    }

    #[test]
    fn test_peace_treaty_extension_keeps_longest() {
        let mut modifiers = ModifierData::default();
        modifiers.add_peace_treaty(3, 5);
        modifiers.add_peace_treaty(3, 2);
        assert_eq!(modifiers.peace_treaty[&3], 5);
    }

    #[test]
    fn test_resource_never_negative() {
        let mut economy = EconomyData::default();
        economy.add(ResourceType::Metal, 5.0);
        economy.add(ResourceType::Metal, -8.0);
        assert_eq!(economy.amount(ResourceType::Metal), 0.0);
    }

    #[test]
    fn test_food_sums_edible_resources() {
        let mut economy = EconomyData::default();
        economy.add(ResourceType::Plant, 2.0);
        economy.add(ResourceType::Animal, 3.0);
        economy.add(ResourceType::Metal, 10.0);
        assert_eq!(economy.food(), 5.0);
    }
}
