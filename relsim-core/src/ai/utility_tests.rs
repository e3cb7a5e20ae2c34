use super::*;
use crate::ai::considerations::Constant;
use crate::command::{Command, CommandKind};
use crate::config::UniverseSettings;
use crate::testing::{view_of, UniverseBuilder};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::rc::Rc;

fn plan_with(settings: UniverseSettings) -> PlanDataAtPlayer {
    let data = UniverseBuilder::new()
        .settings(settings)
        .with_player(1)
        .build();
    PlanDataAtPlayer::new(view_of(&data, 1), StdRng::seed_from_u64(7)).unwrap()
}

fn plan() -> PlanDataAtPlayer {
    plan_with(UniverseSettings::default())
}

/// Queues a 1-unit fuel allocation each time it is chosen.
struct Allocate {
    rank: i32,
    weight: f64,
}

impl AiOption for Allocate {
    fn name(&self) -> &str {
        "Allocate"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Constant::new(self.rank, 1.0, self.weight))]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, state: &mut PlanState) {
        let command = Command::new(
            plan.self_id(),
            plan.self_id(),
            plan.turn(),
            CommandKind::AllocateFuel { amount: 1.0 },
        );
        plan.try_add_command(command);
        state.handled.insert(state.iteration);
    }
}

struct Idle;

impl AiOption for Idle {
    fn name(&self) -> &str {
        "Idle"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Constant::new(5, 1.0, 1.0))]
    }

    fn update_plan(&self, _plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {}

    fn is_no_op(&self) -> bool {
        true
    }
}

#[test]
fn test_combine_takes_max_rank_and_weighted_bonus() {
    let score = combine(&[
        DualUtilityData::new(1, 2.0, 1.0),
        DualUtilityData::new(3, 0.5, 3.0),
        DualUtilityData::new(2, 1.0, 0.0),
    ]);
    assert_eq!(score.rank, 3);
    assert!((score.weight - 4.0).abs() < 1e-12);
}

#[test]
fn test_combine_empty_is_never_chosen() {
    assert_eq!(
        combine(&[]),
        OptionScore {
            rank: 0,
            weight: 0.0
        }
    );
}

#[test]
fn test_combine_nan_weight_is_zero() {
    let score = combine(&[DualUtilityData::new(1, f64::INFINITY, 0.0)]);
    assert_eq!(score.weight, 0.0);
}

#[test]
fn test_select_ignores_non_positive_weights() {
    let scores = [
        OptionScore {
            rank: 9,
            weight: 0.0,
        },
        OptionScore {
            rank: 8,
            weight: -1.0,
        },
        OptionScore {
            rank: 1,
            weight: 0.5,
        },
    ];
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(select_option(&scores, &mut rng), Some(2));
}

#[test]
fn test_select_nothing_viable() {
    let scores = [OptionScore {
        rank: 1,
        weight: 0.0,
    }];
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(select_option(&scores, &mut rng), None);
    assert_eq!(select_option(&[], &mut rng), None);
}

#[test]
fn test_select_huge_weights_pick_heaviest() {
    let scores = [
        OptionScore {
            rank: 1,
            weight: f64::MAX,
        },
        OptionScore {
            rank: 1,
            weight: f64::MAX / 2.0,
        },
        OptionScore {
            rank: 0,
            weight: 1.0,
        },
    ];
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(select_option(&scores, &mut rng), Some(0));
}

#[test]
fn test_select_roughly_proportional_to_weight() {
    let scores = [
        OptionScore {
            rank: 1,
            weight: 1.0,
        },
        OptionScore {
            rank: 1,
            weight: 3.0,
        },
    ];
    let mut rng = StdRng::seed_from_u64(42);
    let heavy = (0..4000)
        .filter(|_| select_option(&scores, &mut rng) == Some(1))
        .count();
    // Expect ~3000
    assert!((2700..3300).contains(&heavy), "heavy picked {} times", heavy);
}

#[test]
fn test_sequence_runs_every_child() {
    let mut plan = plan();
    let reasoner = Reasoner::sequence("all", |_, _| {
        vec![
            Box::new(Allocate {
                rank: 0,
                weight: 0.0,
            }) as Box<dyn AiOption>,
            Box::new(Idle),
            Box::new(Allocate {
                rank: 0,
                weight: 0.0,
            }),
        ]
    });
    reasoner.run(&mut plan);
    assert_eq!(plan.commands.len(), 2);
}

#[test]
fn test_dual_utility_picks_highest_rank() {
    let mut plan = plan();
    let reasoner = Reasoner::dual_utility("pick", |_, _| {
        vec![
            Box::new(Allocate {
                rank: 2,
                weight: 100.0,
            }) as Box<dyn AiOption>,
            Box::new(Idle),
        ]
    });
    reasoner.run(&mut plan);
    assert!(plan.commands.is_empty());
}

#[test]
fn test_repeat_until_is_bounded() {
    let settings = UniverseSettings {
        max_repeat_iterations: 3,
        ..Default::default()
    };
    let mut plan = plan_with(settings);
    let reasoner = Reasoner::repeat_until(
        "forever",
        |_, _| {
            vec![Box::new(Allocate {
                rank: 1,
                weight: 1.0,
            }) as Box<dyn AiOption>]
        },
        |_, _| true,
    );
    reasoner.run(&mut plan);
    assert_eq!(plan.commands.len(), 3);
}

#[test]
fn test_repeat_until_stops_on_condition() {
    let mut plan = plan();
    let reasoner = Reasoner::repeat_until(
        "twice",
        |_, _| {
            vec![Box::new(Allocate {
                rank: 1,
                weight: 1.0,
            }) as Box<dyn AiOption>]
        },
        |_, state| state.handled.len() < 2,
    );
    reasoner.run(&mut plan);
    assert_eq!(plan.commands.len(), 2);
}

#[test]
fn test_repeat_until_stops_on_no_op() {
    let mut plan = plan();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let reasoner = Reasoner::repeat_until(
        "idle",
        move |_, _| {
            counter.set(counter.get() + 1);
            vec![Box::new(Idle) as Box<dyn AiOption>]
        },
        |_, _| true,
    );
    reasoner.run(&mut plan);
    assert_eq!(calls.get(), 1);
    assert!(plan.commands.is_empty());
}

#[test]
fn test_repeat_until_stops_when_nothing_viable() {
    let mut plan = plan();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let reasoner = Reasoner::repeat_until(
        "vetoed",
        move |_, _| {
            counter.set(counter.get() + 1);
            vec![Box::new(Allocate {
                rank: 1,
                weight: 0.0,
            }) as Box<dyn AiOption>]
        },
        |_, _| true,
    );
    reasoner.run(&mut plan);
    assert_eq!(calls.get(), 1);
}

proptest! {
    #[test]
    fn prop_higher_rank_always_wins(
        low_weight in 0.001f64..1000.0,
        high_weight in 0.001f64..1000.0,
        seed in any::<u64>(),
    ) {
        let scores = [
            OptionScore { rank: 1, weight: low_weight },
            OptionScore { rank: 2, weight: high_weight },
        ];
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert_eq!(select_option(&scores, &mut rng), Some(1));
    }
}
