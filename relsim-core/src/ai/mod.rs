//! AI decision making.
//!
//! An [`Ai`] turns the pre-turn view of one player into commands. It only
//! ever reads the frozen [`UniverseView`], so every player's AI can run in
//! parallel and the result doesn't depend on scheduling.
//!
//! # Determinism
//!
//! Each invocation gets its own RNG, derived by the caller from
//! `(seed, turn, player)`. Given the same view and RNG an AI must return
//! the same commands.

pub mod considerations;
pub mod default_ai;
pub mod plan;
pub mod utility;

pub use plan::PlanDataAtPlayer;
pub use utility::{
    AiOption, Consideration, DualUtilityData, OptionScore, PlanState, Reasoner, ReasonerKind,
};

use crate::command::Command;
use crate::state::PlayerId;
use crate::view::UniverseView;
use rand::rngs::StdRng;

/// Name of the AI that never issues commands.
pub const EMPTY_AI_NAME: &str = "empty";

pub trait Ai: Send + Sync {
    fn name(&self) -> &str;

    /// Commands for the view's center player this turn. Empty if the
    /// center isn't a living player.
    fn compute(&self, view: &UniverseView, rng: StdRng) -> Vec<Command>;
}

/// Issues nothing. Stand-in for unknown AI names.
pub struct EmptyAi;

impl Ai for EmptyAi {
    fn name(&self) -> &str {
        EMPTY_AI_NAME
    }

    fn compute(&self, _view: &UniverseView, _rng: StdRng) -> Vec<Command> {
        Vec::new()
    }
}

/// Runs a freshly built reasoner tree against a plan.
pub struct UtilityAi {
    name: String,
    root: fn() -> Reasoner,
}

impl UtilityAi {
    pub fn new(name: &str, root: fn() -> Reasoner) -> Self {
        Self {
            name: name.to_string(),
            root,
        }
    }
}

impl Ai for UtilityAi {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, view: &UniverseView, rng: StdRng) -> Vec<Command> {
        let Some(mut plan) = PlanDataAtPlayer::new(view.clone(), rng) else {
            log::debug!("No plan for dead player {}", view.center_player_id);
            return Vec::new();
        };
        (self.root)().run(&mut plan);
        plan.commands
    }
}

/// Combined strength of the chain `id` belongs to: its top leader and all
/// of the top leader's visible subordinates.
pub fn chain_strength(plan: &PlanDataAtPlayer, id: PlayerId) -> f64 {
    let Some(player) = plan.other(id) else {
        return 0.0;
    };
    let top = plan.other(player.top_leader_id()).unwrap_or(player);
    top.strength()
        + top
            .internal
            .subordinate_ids
            .iter()
            .filter_map(|sub| plan.other(*sub))
            .map(|sub| sub.strength())
            .sum::<f64>()
}

/// Closest visible enemy and its distance.
pub fn nearest_enemy(plan: &PlanDataAtPlayer) -> Option<(PlayerId, f64)> {
    let position = plan.player.position;
    plan.player
        .internal
        .diplomacy
        .enemy_ids
        .iter()
        .filter_map(|id| plan.view.get(*id))
        .map(|enemy| (enemy.player_id, enemy.position.distance(&position)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Double3D;
    use crate::testing::{view_of, UniverseBuilder};
    use rand::SeedableRng;

    #[test]
    fn test_empty_ai_issues_nothing() {
        let data = UniverseBuilder::new().with_player(1).build();
        let commands = EmptyAi.compute(&view_of(&data, 1), StdRng::seed_from_u64(0));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_utility_ai_skips_dead_center() {
        let mut data = UniverseBuilder::new().with_player(1).build();
        data.players.get_mut(&1).unwrap().internal.is_alive = false;
        let ai = UtilityAi::new("default", default_ai::default_reasoner);
        assert!(ai
            .compute(&view_of(&data, 1), StdRng::seed_from_u64(0))
            .is_empty());
    }

    #[test]
    fn test_chain_strength_counts_whole_tree() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_player(3)
            .with_leader(2, 1)
            .build();
        let plan = PlanDataAtPlayer::new(view_of(&data, 3), StdRng::seed_from_u64(0)).unwrap();

        let single = data.players[&3].strength();
        assert!((chain_strength(&plan, 2) - 2.0 * single).abs() < 1e-9);
        assert!((chain_strength(&plan, 1) - 2.0 * single).abs() < 1e-9);
        assert!((chain_strength(&plan, 3) - single).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_enemy() {
        let data = UniverseBuilder::new()
            .with_player_at(1, Double3D::ZERO)
            .with_player_at(2, Double3D::new(4.0, 0.0, 0.0))
            .with_player_at(3, Double3D::new(2.0, 0.0, 0.0))
            .update(1, |p| {
                p.internal.diplomacy.enemy_ids.extend([2, 3]);
            })
            .build();
        let plan = PlanDataAtPlayer::new(view_of(&data, 1), StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(nearest_enemy(&plan), Some((3, 2.0)));
    }
}
