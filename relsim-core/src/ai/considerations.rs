//! Reusable considerations.
//!
//! Each holds only the ids and constants it needs and reads everything
//! else from the plan when scored.

use super::plan::PlanDataAtPlayer;
use super::utility::{Consideration, DualUtilityData, PlanState};
use crate::relativity;
use crate::state::{Double3D, PlayerId, ResourceType};

/// Fixed score regardless of the plan.
pub struct Constant(DualUtilityData);

impl Constant {
    pub fn new(rank: i32, multiplier: f64, bonus: f64) -> Self {
        Self(DualUtilityData::new(rank, multiplier, bonus))
    }
}

impl Consideration for Constant {
    fn dual_utility(&self, _plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        self.0
    }
}

/// Gate on the planner being a top leader.
pub struct IsTopLeader;

impl Consideration for IsTopLeader {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let multiplier = if plan.player.is_top_leader() { 1.0 } else { 0.0 };
        DualUtilityData::new(0, multiplier, 0.0)
    }
}

/// Distance between the movement tank and its target share of all fuel.
pub struct MovementFuelGap {
    pub rank: i32,
}

impl Consideration for MovementFuelGap {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let physics = &plan.player.internal.physics;
        let target = physics.fuel.total() * physics.target_movement_fraction;
        let gap = (target - physics.fuel.movement).abs();
        if gap < 1.0 {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(self.rank, 1.0, gap)
    }
}

/// Stock of a resource above what the planner wants to hold.
pub struct ResourceSurplus {
    pub resource: ResourceType,
}

impl Consideration for ResourceSurplus {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let economy = &plan.player.internal.economy;
        let target = economy.target(self.resource);
        let surplus = economy.amount(self.resource) - target;
        if surplus <= 0.0 || surplus < target * 0.5 {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(2, 1.0, surplus / target.max(1.0))
    }
}

/// Closeness of the nearest enemy. Vetoes when none is within `radius`.
pub struct EnemyNearby {
    pub radius: f64,
}

impl Consideration for EnemyNearby {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        match super::nearest_enemy(plan) {
            Some((_, distance)) if distance < self.radius => {
                DualUtilityData::new(3, 1.0, self.radius - distance)
            }
            _ => DualUtilityData::veto(),
        }
    }
}

/// Multiplier 0 when the velocity change can't be paid from the movement
/// tank.
pub struct AffordableVelocity {
    pub target_velocity: Double3D,
}

impl Consideration for AffordableVelocity {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let player = &plan.player;
        let cost = relativity::fuel_for_velocity_change(
            player.internal.physics.total_rest_mass(),
            &player.velocity,
            &self.target_velocity,
            plan.settings().speed_of_light,
        );
        let multiplier = if cost <= player.internal.physics.fuel.movement {
            1.0
        } else {
            0.0
        };
        DualUtilityData::new(0, multiplier, 0.0)
    }
}

/// Favour targets we are much stronger than and dislike.
pub struct WarProspect {
    pub target_id: PlayerId,
}

impl WarProspect {
    /// Required strength ratio before war is considered.
    pub const MIN_RATIO: f64 = 2.0;
}

impl Consideration for WarProspect {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let Some(target) = plan.other(self.target_id) else {
            return DualUtilityData::veto();
        };
        let ours = super::chain_strength(plan, plan.self_id());
        let theirs = super::chain_strength(plan, target.player_id);
        let ratio = ours / theirs.max(1e-6);
        if ratio < Self::MIN_RATIO {
            return DualUtilityData::veto();
        }
        let relation = plan.player.internal.diplomacy.relation(self.target_id);
        let hostility = (0.5 - relation / 100.0).max(0.0);
        DualUtilityData::new(2, hostility, ratio - Self::MIN_RATIO + 0.1)
    }
}

/// How long a war has dragged on.
pub struct WarWeariness {
    pub opponent_id: PlayerId,
    /// Turns after which peace is considered.
    pub patience: u64,
}

impl Consideration for WarWeariness {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let Some(war) = plan.player.internal.diplomacy.self_wars.get(&self.opponent_id) else {
            return DualUtilityData::veto();
        };
        let duration = plan.turn().saturating_sub(war.start_turn);
        if duration < self.patience {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(2, 1.0, duration as f64 / self.patience.max(1) as f64)
    }
}

/// The opponent's chain outweighs ours by `ratio` or more.
pub struct Outmatched {
    pub opponent_id: PlayerId,
    pub ratio: f64,
}

impl Consideration for Outmatched {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let ours = super::chain_strength(plan, plan.self_id());
        let theirs = super::chain_strength(plan, self.opponent_id);
        if theirs < ours * self.ratio {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(3, 1.0, theirs / ours.max(1e-6))
    }
}

/// Relation with `other` at or above `threshold`.
pub struct Friendly {
    pub other_id: PlayerId,
    pub threshold: f64,
    pub rank: i32,
}

impl Consideration for Friendly {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let relation = plan.player.internal.diplomacy.relation(self.other_id);
        if relation < self.threshold {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(self.rank, 1.0, 1.0 + (relation - self.threshold) / 100.0)
    }
}

/// Relation with `other` below `threshold`.
pub struct Hostile {
    pub other_id: PlayerId,
    pub threshold: f64,
    pub rank: i32,
}

impl Consideration for Hostile {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let relation = plan.player.internal.diplomacy.relation(self.other_id);
        if relation >= self.threshold {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(self.rank, 1.0, (self.threshold - relation) / 100.0)
    }
}

/// Shortfall of a player's fuel storage below `floor`.
pub struct FuelShortfall {
    pub player_id: PlayerId,
    pub floor: f64,
}

impl Consideration for FuelShortfall {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, state: &PlanState) -> DualUtilityData {
        if state.handled.contains(&self.player_id) {
            return DualUtilityData::veto();
        }
        let Some(player) = plan.other(self.player_id) else {
            return DualUtilityData::veto();
        };
        let shortfall = self.floor - player.internal.physics.fuel.storage;
        if shortfall <= 0.0 {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(2, 1.0, shortfall)
    }
}

/// Multiplier 0 when an enemy is within `radius`.
pub struct NoEnemyNearby {
    pub radius: f64,
}

impl Consideration for NoEnemyNearby {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let near = super::nearest_enemy(plan)
            .map(|(_, distance)| distance < self.radius)
            .unwrap_or(false);
        DualUtilityData::new(0, if near { 0.0 } else { 1.0 }, 0.0)
    }
}

/// The planner is moving at all.
pub struct Moving;

impl Consideration for Moving {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let speed = plan.player.speed();
        if speed <= 0.0 {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(2, 1.0, speed / plan.settings().max_speed().max(1e-6))
    }
}

/// A subordinate's tax rate differs from the one we want.
pub struct TaxRateGap {
    pub subordinate_id: PlayerId,
    pub desired: f64,
}

impl Consideration for TaxRateGap {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let Some(sub) = plan.other(self.subordinate_id) else {
            return DualUtilityData::veto();
        };
        let gap = (sub.internal.politics.tax_rate - self.desired).abs();
        if gap < 0.05 {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(2, 1.0, gap * 10.0)
    }
}

/// We and `other` share at least one enemy.
pub struct SharedEnemy {
    pub other_id: PlayerId,
}

impl Consideration for SharedEnemy {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let Some(other) = plan.other(self.other_id) else {
            return DualUtilityData::veto();
        };
        let shared = plan
            .player
            .internal
            .diplomacy
            .enemy_ids
            .intersection(&other.internal.diplomacy.enemy_ids)
            .count();
        if shared == 0 {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(2, 1.0, shared as f64)
    }
}

/// Our own strength is at least `ratio` times that of `other`.
pub struct Outweighs {
    pub other_id: PlayerId,
    pub ratio: f64,
}

impl Consideration for Outweighs {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, _state: &PlanState) -> DualUtilityData {
        let Some(other) = plan.other(self.other_id) else {
            return DualUtilityData::veto();
        };
        let ours = plan.player.strength();
        if ours < other.strength() * self.ratio {
            return DualUtilityData::veto();
        }
        DualUtilityData::new(0, 1.0, ours / other.strength().max(1e-6))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{view_of, UniverseBuilder};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plan(data: &crate::state::UniverseData, center: PlayerId) -> PlanDataAtPlayer {
        PlanDataAtPlayer::new(view_of(data, center), StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_movement_fuel_gap() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .update(1, |p| {
                p.internal.physics.fuel.storage = 90.0;
                p.internal.physics.fuel.movement = 10.0;
            })
            .build();
        let plan = plan(&data, 1);
        let score = MovementFuelGap { rank: 2 }.dual_utility(&plan, &PlanState::default());
        assert_eq!(score.rank, 2);
        assert!((score.bonus - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_war_prospect_needs_superiority() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .update(1, |p| p.internal.population.population = 1000.0)
            .build();
        let state = PlanState::default();

        let strong = plan(&data, 1);
        assert_eq!(WarProspect { target_id: 2 }.dual_utility(&strong, &state).rank, 2);

        let weak = plan(&data, 2);
        assert_eq!(
            WarProspect { target_id: 1 }.dual_utility(&weak, &state),
            DualUtilityData::veto()
        );
    }

    #[test]
    fn test_handled_players_are_not_rescored() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .update(2, |p| p.internal.physics.fuel.storage = 1.0)
            .build();
        let plan = plan(&data, 1);
        let consideration = FuelShortfall {
            player_id: 2,
            floor: 10.0,
        };

        let mut state = PlanState::default();
        assert_eq!(consideration.dual_utility(&plan, &state).bonus, 9.0);
        state.handled.insert(2);
        assert_eq!(
            consideration.dual_utility(&plan, &state),
            DualUtilityData::veto()
        );
    }
}
