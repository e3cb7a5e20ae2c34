//! The per-turn mechanism pipeline.
//!
//! Mechanisms are a fixed, compiled-in set. A collection splits them into
//! two ordered lists:
//!
//! - **regular**: runs every universe turn,
//! - **dilated**: runs only on the player's proper-time action turns
//!   (see [`scheduler`]).
//!
//! A mechanism may mutate the player it runs for. Anything affecting
//! another player goes out as a [`Command`].

pub mod diplomacy;
pub mod economy;
pub mod hierarchy;
pub mod movement;
pub mod scheduler;
pub mod science;

use crate::command::Command;
use crate::config::UniverseSettings;
use crate::state::{GlobalData, PlayerData};
use crate::view::UniverseView;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub use scheduler::{advance_proper_time, process_mechanisms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    SyncHierarchy,
    UpdateWarState,
    UpdateEnemy,
    UpdateRelation,
    UpdateModifier,
    Movement,
    ResourceProduction,
    PopulationGrowth,
    Taxation,
    ScienceProgress,
    SyncScience,
}

impl Mechanism {
    pub fn name(&self) -> &'static str {
        match self {
            Mechanism::SyncHierarchy => "SyncHierarchy",
            Mechanism::UpdateWarState => "UpdateWarState",
            Mechanism::UpdateEnemy => "UpdateEnemy",
            Mechanism::UpdateRelation => "UpdateRelation",
            Mechanism::UpdateModifier => "UpdateModifier",
            Mechanism::Movement => "Movement",
            Mechanism::ResourceProduction => "ResourceProduction",
            Mechanism::PopulationGrowth => "PopulationGrowth",
            Mechanism::Taxation => "Taxation",
            Mechanism::ScienceProgress => "ScienceProgress",
            Mechanism::SyncScience => "SyncScience",
        }
    }

    /// Run this mechanism for one living player.
    pub fn process(
        &self,
        player: &mut PlayerData,
        view: &UniverseView,
        settings: &UniverseSettings,
        global: &GlobalData,
        rng: &mut StdRng,
    ) -> Vec<Command> {
        match self {
            Mechanism::SyncHierarchy => return hierarchy::sync_hierarchy(player, view),
            Mechanism::UpdateWarState => diplomacy::update_war_state(player, view),
            Mechanism::UpdateEnemy => diplomacy::update_enemy(player, view),
            Mechanism::UpdateRelation => diplomacy::update_relation(player, view),
            Mechanism::UpdateModifier => diplomacy::update_modifier(player, view),
            Mechanism::Movement => movement::run_movement(player, settings),
            Mechanism::ResourceProduction => {
                economy::run_resource_production(player, settings, rng)
            }
            Mechanism::PopulationGrowth => {
                economy::run_population_growth(player, settings);
            }
            Mechanism::Taxation => return economy::run_taxation(player, view, settings),
            Mechanism::ScienceProgress => science::run_science_progress(player),
            Mechanism::SyncScience => science::run_sync_science(player, view, global),
        }
        Vec::new()
    }
}

/// Ordered mechanism lists of one collection. The lists are disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MechanismLists {
    pub regular: Vec<Mechanism>,
    pub dilated: Vec<Mechanism>,
}

impl MechanismLists {
    /// Hierarchy, war state, enemies, relations, modifiers and movement
    /// every turn; economy and science on proper time.
    pub fn default_collection() -> Self {
        Self {
            regular: vec![
                Mechanism::SyncHierarchy,
                Mechanism::UpdateWarState,
                Mechanism::UpdateEnemy,
                Mechanism::UpdateRelation,
                Mechanism::UpdateModifier,
                Mechanism::Movement,
            ],
            dilated: vec![
                Mechanism::ResourceProduction,
                Mechanism::PopulationGrowth,
                Mechanism::Taxation,
                Mechanism::ScienceProgress,
                Mechanism::SyncScience,
            ],
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.dilated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_lists_are_disjoint() {
        let lists = MechanismLists::default_collection();
        let regular: HashSet<_> = lists.regular.iter().collect();
        assert!(lists.dilated.iter().all(|m| !regular.contains(m)));
        assert_eq!(lists.regular.len() + lists.dilated.len(), 11);
    }

    #[test]
    fn test_enemy_update_follows_war_state() {
        let lists = MechanismLists::default_collection();
        let position = |m: Mechanism| lists.regular.iter().position(|x| *x == m);
        assert!(position(Mechanism::SyncHierarchy) < position(Mechanism::UpdateWarState));
        assert!(position(Mechanism::UpdateWarState) < position(Mechanism::UpdateEnemy));
    }
}
