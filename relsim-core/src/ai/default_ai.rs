//! The stock AI.
//!
//! One pass of [`default_reasoner`] balances fuel, converts surplus
//! resources, reacts to nearby enemies, adjusts subordinate taxes, makes at
//! most one move per diplomacy area and finally hands out spare fuel to
//! needy subordinates.

use super::considerations::{
    AffordableVelocity, Constant, EnemyNearby, Friendly, FuelShortfall, Hostile, IsTopLeader,
    Moving, MovementFuelGap, NoEnemyNearby, Outmatched, Outweighs, ResourceSurplus, SharedEnemy,
    TaxRateGap, WarProspect, WarWeariness,
};
use super::plan::PlanDataAtPlayer;
use super::utility::{AiOption, Consideration, PlanState, Reasoner};
use crate::command::{build, Command, CommandKind};
use crate::state::{Double3D, PlayerId, ResourceType};

/// Enemies closer than this (grid units) make us run.
const DANGER_RADIUS: f64 = 2.0;
/// Fleeing speed as a fraction of the maximum speed.
const FLEE_SPEED_FRACTION: f64 = 0.3;
/// How many of the nearest players are considered for war or alliance.
const NEIGHBOUR_COUNT: usize = 5;
const MAX_ALLIES: usize = 3;
const PEACE_PATIENCE: u64 = 10;
const SURRENDER_RATIO: f64 = 3.0;
const INDEPENDENCE_RATIO: f64 = 1.2;
/// Storage a leader keeps for itself when aiding subordinates.
const AID_RESERVE: f64 = 20.0;
/// Subordinates below this storage get aid.
const AID_FLOOR: f64 = 10.0;

type Options = Vec<Box<dyn AiOption>>;

/// Always viable at rank 1. Picking it ends a repeat.
pub struct DoNothing;

impl AiOption for DoNothing {
    fn name(&self) -> &str {
        "DoNothing"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Constant::new(1, 1.0, 1.0))]
    }

    fn update_plan(&self, _plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {}

    fn is_no_op(&self) -> bool {
        true
    }
}

fn with_idle(mut options: Options) -> Options {
    options.insert(0, Box::new(DoNothing));
    options
}

/// Move fuel between storage and the movement tank toward the target split.
pub struct AllocateFuelOption;

impl AiOption for AllocateFuelOption {
    fn name(&self) -> &str {
        "AllocateFuel"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(MovementFuelGap { rank: 2 })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let physics = &plan.player.internal.physics;
        let target = physics.fuel.total() * physics.target_movement_fraction;
        let amount = (target - physics.fuel.movement).min(physics.fuel.storage);
        if amount == 0.0 {
            return;
        }
        let command = build::to_self(&plan.player, plan.turn(), CommandKind::AllocateFuel { amount });
        plan.try_add_command(command);
    }
}

/// Burn half of a resource's surplus for fuel.
pub struct ConvertResourceOption {
    pub resource: ResourceType,
}

impl AiOption for ConvertResourceOption {
    fn name(&self) -> &str {
        "ConvertResource"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(ResourceSurplus {
            resource: self.resource,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let economy = &plan.player.internal.economy;
        let amount = (economy.amount(self.resource) - economy.target(self.resource)) / 2.0;
        if amount <= 0.0 {
            return;
        }
        let command = build::to_self(
            &plan.player,
            plan.turn(),
            CommandKind::ConvertResource {
                resource: self.resource,
                amount,
            },
        );
        plan.try_add_command(command);
    }
}

/// Either run from the nearest enemy or come to a stop once safe.
pub struct ChangeVelocityOption {
    pub target_velocity: Double3D,
    pub flee: bool,
}

impl AiOption for ChangeVelocityOption {
    fn name(&self) -> &str {
        if self.flee {
            "Flee"
        } else {
            "Stop"
        }
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        let affordable: Box<dyn Consideration> = Box::new(AffordableVelocity {
            target_velocity: self.target_velocity,
        });
        if self.flee {
            vec![
                Box::new(EnemyNearby {
                    radius: DANGER_RADIUS,
                }),
                affordable,
            ]
        } else {
            vec![
                Box::new(Moving),
                Box::new(NoEnemyNearby {
                    radius: DANGER_RADIUS,
                }),
                affordable,
            ]
        }
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = build::to_self(
            &plan.player,
            plan.turn(),
            CommandKind::ChangeVelocity {
                target_velocity: self.target_velocity,
            },
        );
        plan.try_add_command(command);
    }
}

pub struct SetTaxRateOption {
    pub subordinate_id: PlayerId,
    pub tax_rate: f64,
}

impl AiOption for SetTaxRateOption {
    fn name(&self) -> &str {
        "SetTaxRate"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(TaxRateGap {
            subordinate_id: self.subordinate_id,
            desired: self.tax_rate,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = Command::new(
            plan.self_id(),
            self.subordinate_id,
            plan.turn(),
            CommandKind::ChangeTaxRate {
                tax_rate: self.tax_rate,
            },
        );
        plan.try_add_command(command);
    }
}

pub struct DeclareWarOption {
    pub target_id: PlayerId,
}

impl AiOption for DeclareWarOption {
    fn name(&self) -> &str {
        "DeclareWar"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![
            Box::new(IsTopLeader),
            Box::new(WarProspect {
                target_id: self.target_id,
            }),
        ]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let Some(target) = plan.other(self.target_id).cloned() else {
            return;
        };
        let command = build::declare_war(&plan.player, &target, plan.turn());
        plan.try_add_command(command);
    }
}

pub struct ProposePeaceOption {
    pub opponent_id: PlayerId,
}

impl AiOption for ProposePeaceOption {
    fn name(&self) -> &str {
        "ProposePeace"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(WarWeariness {
            opponent_id: self.opponent_id,
            patience: PEACE_PATIENCE,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = Command::new(
            plan.self_id(),
            self.opponent_id,
            plan.turn(),
            CommandKind::ProposePeace,
        );
        plan.try_add_command(command);
    }
}

pub struct SurrenderOption {
    pub opponent_id: PlayerId,
}

impl AiOption for SurrenderOption {
    fn name(&self) -> &str {
        "Surrender"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![
            Box::new(IsTopLeader),
            Box::new(Outmatched {
                opponent_id: self.opponent_id,
                ratio: SURRENDER_RATIO,
            }),
        ]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let Some(winner) = plan.other(self.opponent_id).cloned() else {
            return;
        };
        let command = build::surrender(&plan.player, &winner, plan.turn());
        plan.try_add_command(command);
    }
}

pub struct ProposeAllianceOption {
    pub other_id: PlayerId,
}

impl AiOption for ProposeAllianceOption {
    fn name(&self) -> &str {
        "ProposeAlliance"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![
            Box::new(SharedEnemy {
                other_id: self.other_id,
            }),
            Box::new(Friendly {
                other_id: self.other_id,
                threshold: -10.0,
                rank: 0,
            }),
        ]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = Command::new(
            plan.self_id(),
            self.other_id,
            plan.turn(),
            CommandKind::ProposeAlliance,
        );
        plan.try_add_command(command);
    }
}

pub struct AcceptAllianceOption {
    pub proposer_id: PlayerId,
}

impl AiOption for AcceptAllianceOption {
    fn name(&self) -> &str {
        "AcceptAlliance"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Friendly {
            other_id: self.proposer_id,
            threshold: -10.0,
            rank: 2,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = Command::new(
            plan.self_id(),
            self.proposer_id,
            plan.turn(),
            CommandKind::AcceptAlliance,
        );
        plan.try_add_command(command);
    }
}

pub struct CancelAllianceOption {
    pub ally_id: PlayerId,
}

impl AiOption for CancelAllianceOption {
    fn name(&self) -> &str {
        "CancelAlliance"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Hostile {
            other_id: self.ally_id,
            threshold: -20.0,
            rank: 2,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = Command::new(
            plan.self_id(),
            self.ally_id,
            plan.turn(),
            CommandKind::CancelAlliance,
        );
        plan.try_add_command(command);
    }
}

pub struct DeclareIndependenceOption {
    pub leader_id: PlayerId,
}

impl AiOption for DeclareIndependenceOption {
    fn name(&self) -> &str {
        "DeclareIndependence"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![
            Box::new(Hostile {
                other_id: self.leader_id,
                threshold: -10.0,
                rank: 2,
            }),
            Box::new(Outweighs {
                other_id: self.leader_id,
                ratio: INDEPENDENCE_RATIO,
            }),
        ]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let command = build::declare_independence(&plan.player, self.leader_id, plan.turn());
        plan.try_add_command(command);
    }
}

pub struct JoinAllyWarOption {
    pub ally_id: PlayerId,
    pub opponent_id: PlayerId,
}

impl AiOption for JoinAllyWarOption {
    fn name(&self) -> &str {
        "JoinAllyWar"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Friendly {
            other_id: self.ally_id,
            threshold: 0.0,
            rank: 2,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let Some(opponent) = plan.other(self.opponent_id).cloned() else {
            return;
        };
        let command = build::join_ally_war(&plan.player, self.ally_id, &opponent, plan.turn());
        plan.try_add_command(command);
    }
}

pub struct JoinAllySubordinateWarOption {
    pub ally_id: PlayerId,
    pub subordinate_id: PlayerId,
    pub opponent_id: PlayerId,
}

impl AiOption for JoinAllySubordinateWarOption {
    fn name(&self) -> &str {
        "JoinAllySubordinateWar"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(Friendly {
            other_id: self.ally_id,
            threshold: 0.0,
            rank: 2,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, _state: &mut PlanState) {
        let Some(opponent) = plan.other(self.opponent_id).cloned() else {
            return;
        };
        let command = build::join_ally_subordinate_war(
            &plan.player,
            self.ally_id,
            self.subordinate_id,
            &opponent,
            plan.turn(),
        );
        plan.try_add_command(command);
    }
}

/// Top up a subordinate's storage from our spare fuel.
pub struct SendFuelOption {
    pub target_id: PlayerId,
}

impl AiOption for SendFuelOption {
    fn name(&self) -> &str {
        "SendFuel"
    }

    fn considerations(&self) -> Vec<Box<dyn Consideration>> {
        vec![Box::new(FuelShortfall {
            player_id: self.target_id,
            floor: AID_FLOOR,
        })]
    }

    fn update_plan(&self, plan: &mut PlanDataAtPlayer, state: &mut PlanState) {
        state.handled.insert(self.target_id);
        let Some(target) = plan.other(self.target_id) else {
            return;
        };
        let shortfall = AID_FLOOR - target.internal.physics.fuel.storage;
        let spare = plan.player.internal.physics.fuel.storage - AID_RESERVE;
        let amount = shortfall.min(spare);
        if amount <= 0.0 {
            return;
        }
        let command = Command::new(
            plan.self_id(),
            self.target_id,
            plan.turn(),
            CommandKind::SendFuel { amount },
        );
        plan.try_add_command(command);
    }
}

fn fuel_balance() -> Reasoner {
    Reasoner::dual_utility("fuel_balance", |_, _| {
        with_idle(vec![Box::new(AllocateFuelOption)])
    })
}

fn resource_balance() -> Reasoner {
    Reasoner::sequence("resource_balance", |_, _| {
        ResourceType::ALL
            .iter()
            .map(|resource| {
                let resource = *resource;
                Reasoner::dual_utility("convert", move |_, _| {
                    with_idle(vec![Box::new(ConvertResourceOption { resource })])
                })
                .boxed()
            })
            .collect()
    })
}

fn movement() -> Reasoner {
    Reasoner::dual_utility("movement", |plan, _| {
        let mut options: Options = vec![Box::new(ChangeVelocityOption {
            target_velocity: Double3D::ZERO,
            flee: false,
        })];
        if let Some(enemy) = super::nearest_enemy(plan).and_then(|(id, _)| plan.view.get(id)) {
            let away = plan.player.position.sub(&enemy.position).normalize();
            if away != Double3D::ZERO {
                let speed = plan.settings().max_speed() * FLEE_SPEED_FRACTION;
                options.push(Box::new(ChangeVelocityOption {
                    target_velocity: away.scale(speed),
                    flee: true,
                }));
            }
        }
        with_idle(options)
    })
}

fn tax_policy() -> Reasoner {
    Reasoner::sequence("tax_policy", |plan, _| {
        plan.player
            .internal
            .direct_subordinate_ids
            .iter()
            .filter(|id| plan.view.is_visible(**id))
            .map(|id| {
                let subordinate_id = *id;
                let tax_rate = if plan.player.internal.diplomacy.relation(subordinate_id) >= 0.0 {
                    0.2
                } else {
                    0.1
                };
                Reasoner::dual_utility("tax", move |_, _| {
                    with_idle(vec![Box::new(SetTaxRateOption {
                        subordinate_id,
                        tax_rate,
                    })])
                })
                .boxed()
            })
            .collect()
    })
}

fn war_policy() -> Reasoner {
    Reasoner::dual_utility("war_policy", |plan, _| {
        let me = &plan.player;
        let relation = &me.internal.diplomacy;
        let mut options: Options = Vec::new();
        for other in plan.view.neighbours(NEIGHBOUR_COUNT) {
            let id = other.player_id;
            if me.is_in_chain(id)
                || me.is_ally(id)
                || relation.is_at_war_with(id)
                || !me.internal.modifiers.can_declare_war(id)
            {
                continue;
            }
            options.push(Box::new(DeclareWarOption { target_id: id }));
        }
        for opponent_id in relation.self_wars.keys().copied() {
            if !plan.view.is_visible(opponent_id) {
                continue;
            }
            options.push(Box::new(ProposePeaceOption { opponent_id }));
            options.push(Box::new(SurrenderOption { opponent_id }));
        }
        with_idle(options)
    })
}

fn alliance_policy() -> Reasoner {
    Reasoner::dual_utility("alliance_policy", |plan, _| {
        let me = &plan.player;
        let relation = &me.internal.diplomacy;
        let mut options: Options = Vec::new();
        if relation.ally_map.len() < MAX_ALLIES {
            for other in plan.view.neighbours(NEIGHBOUR_COUNT) {
                let id = other.player_id;
                let already_proposed = plan
                    .other(id)
                    .map(|p| p.internal.diplomacy.alliance_proposals.contains(&me.player_id))
                    .unwrap_or(true);
                if me.is_in_chain(id)
                    || me.is_ally(id)
                    || me.is_enemy(id)
                    || relation.is_at_war_with(id)
                    || already_proposed
                {
                    continue;
                }
                options.push(Box::new(ProposeAllianceOption { other_id: id }));
            }
            for proposer_id in relation.alliance_proposals.iter().copied() {
                if plan.view.is_visible(proposer_id) {
                    options.push(Box::new(AcceptAllianceOption { proposer_id }));
                }
            }
        }
        for ally_id in relation.ally_map.keys().copied() {
            options.push(Box::new(CancelAllianceOption { ally_id }));
        }
        with_idle(options)
    })
}

fn independence() -> Reasoner {
    Reasoner::dual_utility("independence", |plan, _| {
        let options: Options = match plan.player.internal.direct_leader_id {
            Some(leader_id) if plan.view.is_visible(leader_id) => {
                vec![Box::new(DeclareIndependenceOption { leader_id })]
            }
            _ => Vec::new(),
        };
        with_idle(options)
    })
}

fn ally_support() -> Reasoner {
    Reasoner::dual_utility("ally_support", |plan, _| {
        let me = &plan.player;
        let relation = &me.internal.diplomacy;
        let joinable = |opponent: PlayerId| {
            plan.view.is_visible(opponent) && !me.is_in_chain(opponent) && !me.is_ally(opponent)
        };
        let mut options: Options = Vec::new();
        for ally in plan.view.visible_allies(me.player_id) {
            let ally_id = ally.player_id;
            for opponent_id in ally.internal.diplomacy.self_wars.keys().copied() {
                if joinable(opponent_id) && !relation.has_ally_war(ally_id, opponent_id) {
                    options.push(Box::new(JoinAllyWarOption {
                        ally_id,
                        opponent_id,
                    }));
                }
            }
            for subordinate_id in ally.internal.subordinate_ids.iter().copied() {
                let Some(subordinate) = plan.view.get(subordinate_id) else {
                    continue;
                };
                for opponent_id in subordinate.internal.diplomacy.self_wars.keys().copied() {
                    if joinable(opponent_id)
                        && !relation.has_ally_subordinate_war(ally_id, subordinate_id, opponent_id)
                    {
                        options.push(Box::new(JoinAllySubordinateWarOption {
                            ally_id,
                            subordinate_id,
                            opponent_id,
                        }));
                    }
                }
            }
        }
        with_idle(options)
    })
}

fn needs_aid(plan: &PlanDataAtPlayer, state: &PlanState, id: PlayerId) -> bool {
    !state.handled.contains(&id)
        && plan
            .other(id)
            .map(|p| p.internal.physics.fuel.storage < AID_FLOOR)
            .unwrap_or(false)
}

fn subordinate_aid() -> Reasoner {
    Reasoner::repeat_until(
        "subordinate_aid",
        |plan, state| {
            let options: Options = plan
                .player
                .internal
                .direct_subordinate_ids
                .iter()
                .filter(|id| needs_aid(plan, state, **id))
                .map(|id| Box::new(SendFuelOption { target_id: *id }) as Box<dyn AiOption>)
                .collect();
            with_idle(options)
        },
        |plan, state| {
            plan.player.internal.physics.fuel.storage > AID_RESERVE
                && plan
                    .player
                    .internal
                    .direct_subordinate_ids
                    .iter()
                    .any(|id| needs_aid(plan, state, *id))
        },
    )
}

/// Root of the stock AI.
pub fn default_reasoner() -> Reasoner {
    Reasoner::sequence("default", |_, _| {
        vec![
            fuel_balance().boxed(),
            resource_balance().boxed(),
            movement().boxed(),
            tax_policy().boxed(),
            war_policy().boxed(),
            alliance_policy().boxed(),
            independence().boxed(),
            ally_support().boxed(),
            subordinate_aid().boxed(),
        ]
    })
}
