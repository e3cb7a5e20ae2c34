//! Dual-utility reasoning.
//!
//! An [`AiOption`] is a named bundle of [`Consideration`]s plus the plan
//! update it performs when chosen. Each consideration scores the option as
//! a [`DualUtilityData`]; the option's rank is the highest rank among its
//! considerations and its weight is `Σ bonus × Π multiplier`.
//!
//! Selection keeps only options with positive weight, then only those of
//! the highest rank, and draws one of them with probability proportional
//! to weight. A [`Reasoner`] is itself an option whose plan update runs
//! its children in sequence, picks one by dual utility, or repeats a pick
//! until a condition fails.

use super::plan::PlanDataAtPlayer;
use crate::state::PlayerId;
use rand::Rng;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualUtilityData {
    pub rank: i32,
    pub multiplier: f64,
    pub bonus: f64,
}

impl DualUtilityData {
    pub fn new(rank: i32, multiplier: f64, bonus: f64) -> Self {
        Self {
            rank,
            multiplier,
            bonus,
        }
    }

    /// Rank 0 and no weight: never chosen.
    pub fn veto() -> Self {
        Self::new(0, 0.0, 0.0)
    }
}

/// Bookkeeping for one run of a reasoner. Created fresh for every run and
/// dropped afterwards; nothing carries over between turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanState {
    pub iteration: u32,
    /// Players already dealt with in this run.
    pub handled: BTreeSet<PlayerId>,
}

/// Scores one aspect of an option. Implementations hold only the ids or
/// constants they were built with.
pub trait Consideration {
    fn dual_utility(&self, plan: &PlanDataAtPlayer, state: &PlanState) -> DualUtilityData;
}

pub trait AiOption {
    fn name(&self) -> &str;

    /// Built fresh for every evaluation.
    fn considerations(&self) -> Vec<Box<dyn Consideration>>;

    /// Queue commands and update the scratch copies.
    fn update_plan(&self, plan: &mut PlanDataAtPlayer, state: &mut PlanState);

    /// Whether choosing this option means choosing to do nothing.
    fn is_no_op(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionScore {
    pub rank: i32,
    pub weight: f64,
}

/// Combine consideration scores into an option score.
pub fn combine(utilities: &[DualUtilityData]) -> OptionScore {
    if utilities.is_empty() {
        return OptionScore {
            rank: 0,
            weight: 0.0,
        };
    }
    let rank = utilities.iter().map(|u| u.rank).max().unwrap_or(0);
    let bonus: f64 = utilities.iter().map(|u| u.bonus).sum();
    let multiplier: f64 = utilities.iter().map(|u| u.multiplier).product();
    let weight = bonus * multiplier;
    OptionScore {
        rank,
        weight: if weight.is_nan() { 0.0 } else { weight },
    }
}

pub fn score_option(
    option: &dyn AiOption,
    plan: &PlanDataAtPlayer,
    state: &PlanState,
) -> OptionScore {
    let utilities: Vec<DualUtilityData> = option
        .considerations()
        .iter()
        .map(|c| c.dual_utility(plan, state))
        .collect();
    combine(&utilities)
}

/// Pick an index by dual utility. `None` if no option has positive weight.
pub fn select_option(scores: &[OptionScore], rng: &mut impl Rng) -> Option<usize> {
    let viable: Vec<usize> = (0..scores.len())
        .filter(|i| scores[*i].weight > 0.0 && scores[*i].weight.is_finite())
        .collect();
    let top_rank = viable.iter().map(|i| scores[*i].rank).max()?;
    let best: Vec<usize> = viable
        .into_iter()
        .filter(|i| scores[*i].rank == top_rank)
        .collect();

    let total: f64 = best.iter().map(|i| scores[*i].weight).sum();
    if !total.is_finite() {
        // Finite weights can still overflow when summed
        return best
            .into_iter()
            .max_by(|a, b| scores[*a].weight.total_cmp(&scores[*b].weight));
    }
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for &i in &best {
        cumulative += scores[i].weight;
        if roll < cumulative {
            return Some(i);
        }
    }
    best.last().copied()
}

/// Score `options`, pick one and run its plan update. Returns the chosen
/// option's no-op flag, or `None` if nothing was viable.
fn choose_and_apply(
    options: &[Box<dyn AiOption>],
    plan: &mut PlanDataAtPlayer,
    state: &mut PlanState,
) -> Option<bool> {
    let scores: Vec<OptionScore> = options
        .iter()
        .map(|o| score_option(o.as_ref(), plan, state))
        .collect();
    let index = select_option(&scores, &mut plan.rng)?;
    let chosen = &options[index];
    log::trace!(
        "Player {} chose {} (rank {}, weight {:.3})",
        plan.self_id(),
        chosen.name(),
        scores[index].rank,
        scores[index].weight
    );
    chosen.update_plan(plan, state);
    Some(chosen.is_no_op())
}

/// Produces a reasoner's children from the current plan.
pub type ChildrenFn = Box<dyn Fn(&PlanDataAtPlayer, &PlanState) -> Vec<Box<dyn AiOption>>>;

pub type ConditionFn = Box<dyn Fn(&PlanDataAtPlayer, &PlanState) -> bool>;

pub enum ReasonerKind {
    /// Every child, in order.
    Sequence,
    /// One child by dual utility.
    DualUtility,
    /// Dual-utility picks while the condition holds.
    RepeatUntil(ConditionFn),
}

pub struct Reasoner {
    name: String,
    kind: ReasonerKind,
    children: ChildrenFn,
}

impl Reasoner {
    pub fn sequence(
        name: &str,
        children: impl Fn(&PlanDataAtPlayer, &PlanState) -> Vec<Box<dyn AiOption>> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: ReasonerKind::Sequence,
            children: Box::new(children),
        }
    }

    pub fn dual_utility(
        name: &str,
        children: impl Fn(&PlanDataAtPlayer, &PlanState) -> Vec<Box<dyn AiOption>> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: ReasonerKind::DualUtility,
            children: Box::new(children),
        }
    }

    /// Repeat while `should_continue` holds, at most
    /// `max_repeat_iterations` times, stopping early once a no-op is picked.
    pub fn repeat_until(
        name: &str,
        children: impl Fn(&PlanDataAtPlayer, &PlanState) -> Vec<Box<dyn AiOption>> + 'static,
        should_continue: impl Fn(&PlanDataAtPlayer, &PlanState) -> bool + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: ReasonerKind::RepeatUntil(Box::new(should_continue)),
            children: Box::new(children),
        }
    }

    /// Run as the root of a plan.
    pub fn run(&self, plan: &mut PlanDataAtPlayer) {
        let mut state = PlanState::default();
        self.update_plan(plan, &mut state);
    }

    pub fn boxed(self) -> Box<dyn AiOption> {
        Box::new(self)
    }
}

impl AiOption for Reasoner {
    fn name(&self) -> &str {
        &self.name
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(super::considerations::Constant::new(1, 1.0, 1.0))]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, state: &mut PlanState) {
        match &self.kind {
            ReasonerKind::Sequence => {
                for child in (self.children)(plan, state) {
                    child.update_plan(plan, state);
                }
            }
            ReasonerKind::DualUtility => {
                let options = (self.children)(plan, state);
                choose_and_apply(&options, plan, state);
            }
            ReasonerKind::RepeatUntil(should_continue) => {
                let max = plan.settings().max_repeat_iterations;
                let mut local = PlanState::default();
                while local.iteration < max && should_continue(plan, &local) {
                    let options = (self.children)(plan, &local);
                    let no_op = choose_and_apply(&options, plan, &mut local);
                    local.iteration += 1;
                    if no_op.unwrap_or(true) {
                        break;
                    }
                }
                log::trace!(
                    "Player {} repeated {} {} times",
                    plan.self_id(),
                    self.name,
                    local.iteration
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "utility_tests.rs"]
mod tests;
