//! Commands: the only way player state changes from outside the mechanism
//! pipeline.
//!
//! A command is applied in two halves. [`Command::check_and_self_execute`]
//! validates and applies the issuer's part against the issuer's own data
//! (e.g. deducting fuel that is being sent). [`Command::check_and_execute`]
//! validates and applies the receiver's part against the target's current
//! data. Either half may fail with a [`CommandError`]; a failed command is
//! dropped and never affects anything else.

use crate::config::UniverseSettings;
use crate::relativity;
use crate::state::{
    AllianceData, Double3D, PlayerData, PlayerId, ResourceType, WarCoreData,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Highest tax rate a leader may impose.
pub const MAX_TAX_RATE: f64 = 0.5;

const WAR_RELATION_PENALTY: f64 = 50.0;
const BETRAYAL_RELATION_PENALTY: f64 = 80.0;
const PEACE_RELATION_BONUS: f64 = 10.0;
const ALLIANCE_RELATION_BONUS: f64 = 10.0;
const SUPPORT_RELATION_BONUS: f64 = 15.0;
const GIFT_RELATION_BONUS: f64 = 2.0;
const INDEPENDENCE_RELATION_PENALTY: f64 = 40.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Player {0} is dead")]
    Dead(PlayerId),
    #[error("Command from {expected} executed by {actual}")]
    WrongSender { expected: PlayerId, actual: PlayerId },
    #[error("Command to {expected} delivered to {actual}")]
    WrongTarget { expected: PlayerId, actual: PlayerId },
    #[error("Command must be addressed to its issuer")]
    NotSelfAddressed,
    #[error("Invalid amount {0}")]
    InvalidAmount(f64),
    #[error("Insufficient fuel: required {required}, available {available}")]
    InsufficientFuel { required: f64, available: f64 },
    #[error("Insufficient {resource}: required {required}, available {available}")]
    InsufficientResource {
        resource: ResourceType,
        required: f64,
        available: f64,
    },
    #[error("Player {0} is in the same command chain")]
    SameChain(PlayerId),
    #[error("Already at war with {0}")]
    AlreadyAtWar(PlayerId),
    #[error("Not at war with {0}")]
    NotAtWar(PlayerId),
    #[error("Peace treaty with {0} still in force")]
    PeaceTreaty(PlayerId),
    #[error("Player {0} is an ally")]
    IsAlly(PlayerId),
    #[error("Player {0} is not an ally")]
    NotAlly(PlayerId),
    #[error("Player {0} is an enemy")]
    IsEnemy(PlayerId),
    #[error("No alliance proposal from {0}")]
    NoProposal(PlayerId),
    #[error("Player {0} is not the direct leader")]
    NotDirectLeader(PlayerId),
    #[error("Player {0} is not a leader")]
    NotLeader(PlayerId),
    #[error("Player {0} is not a subordinate")]
    NotSubordinate(PlayerId),
    #[error("Player {0} is not a top leader")]
    NotTopLeader(PlayerId),
    #[error("Speed {speed} exceeds maximum {max}")]
    TooFast { speed: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandKind {
    // Diplomacy
    DeclareWar {
        sender_leader_ids: Vec<PlayerId>,
        target_leader_ids: Vec<PlayerId>,
    },
    ProposePeace,
    /// End a war by becoming the winner's direct subordinate.
    Surrender {
        sender_subordinate_ids: BTreeSet<PlayerId>,
        target_leader_ids: Vec<PlayerId>,
    },
    ProposeAlliance,
    AcceptAlliance,
    CancelAlliance,
    /// Addressed to the ally being supported.
    JoinAllyWar {
        opponent_id: PlayerId,
        opponent_leader_ids: Vec<PlayerId>,
    },
    /// Addressed to the subordinate of `ally_id` being supported.
    JoinAllySubordinateWar {
        ally_id: PlayerId,
        opponent_id: PlayerId,
        opponent_leader_ids: Vec<PlayerId>,
    },

    // Hierarchy
    DeclareIndependence {
        sender_subordinate_ids: BTreeSet<PlayerId>,
    },
    /// Ask the direct leader to record the sender's subtree.
    SyncSubordinates {
        subordinate_ids: BTreeSet<PlayerId>,
    },
    ChangeTaxRate {
        tax_rate: f64,
    },

    // Economy / physics
    SendFuel {
        amount: f64,
    },
    PayTax {
        amount: f64,
    },
    ChangeVelocity {
        target_velocity: Double3D,
    },
    /// Move fuel from storage to the movement tank (negative: back).
    AllocateFuel {
        amount: f64,
    },
    ConvertResource {
        resource: ResourceType,
        amount: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub from_id: PlayerId,
    pub to_id: PlayerId,
    /// Turn the command was issued on.
    pub turn: u64,
    pub kind: CommandKind,
}

fn valid_amount(amount: f64) -> Result<(), CommandError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CommandError::InvalidAmount(amount))
    }
}

fn take_storage_fuel(player: &mut PlayerData, amount: f64) -> Result<(), CommandError> {
    valid_amount(amount)?;
    let available = player.internal.physics.fuel.storage;
    if available < amount {
        return Err(CommandError::InsufficientFuel {
            required: amount,
            available,
        });
    }
    player.internal.physics.fuel.storage -= amount;
    Ok(())
}

impl Command {
    pub fn new(from_id: PlayerId, to_id: PlayerId, turn: u64, kind: CommandKind) -> Self {
        Self {
            from_id,
            to_id,
            turn,
            kind,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            CommandKind::DeclareWar { .. } => "DeclareWar",
            CommandKind::ProposePeace => "ProposePeace",
            CommandKind::Surrender { .. } => "Surrender",
            CommandKind::ProposeAlliance => "ProposeAlliance",
            CommandKind::AcceptAlliance => "AcceptAlliance",
            CommandKind::CancelAlliance => "CancelAlliance",
            CommandKind::JoinAllyWar { .. } => "JoinAllyWar",
            CommandKind::JoinAllySubordinateWar { .. } => "JoinAllySubordinateWar",
            CommandKind::DeclareIndependence { .. } => "DeclareIndependence",
            CommandKind::SyncSubordinates { .. } => "SyncSubordinates",
            CommandKind::ChangeTaxRate { .. } => "ChangeTaxRate",
            CommandKind::SendFuel { .. } => "SendFuel",
            CommandKind::PayTax { .. } => "PayTax",
            CommandKind::ChangeVelocity { .. } => "ChangeVelocity",
            CommandKind::AllocateFuel { .. } => "AllocateFuel",
            CommandKind::ConvertResource { .. } => "ConvertResource",
        }
    }

    pub fn is_self_addressed(&self) -> bool {
        self.from_id == self.to_id
    }

    fn war_record(
        &self,
        opponent_id: PlayerId,
        support_id: PlayerId,
        offensive: bool,
        opponent_leader_ids: &[PlayerId],
    ) -> WarCoreData {
        WarCoreData {
            opponent_id,
            support_id,
            is_defensive: !offensive,
            is_offensive: offensive,
            opponent_leader_ids: opponent_leader_ids.to_vec(),
            start_turn: self.turn,
        }
    }

    /// Validate and apply the issuer's part against the issuer's own data.
    pub fn check_and_self_execute(
        &self,
        sender: &mut PlayerData,
        settings: &UniverseSettings,
    ) -> Result<(), CommandError> {
        if sender.player_id != self.from_id {
            return Err(CommandError::WrongSender {
                expected: self.from_id,
                actual: sender.player_id,
            });
        }
        if !sender.is_alive() {
            return Err(CommandError::Dead(sender.player_id));
        }
        let to = self.to_id;

        match &self.kind {
            CommandKind::DeclareWar {
                target_leader_ids, ..
            } => {
                if sender.is_in_chain(to) {
                    return Err(CommandError::SameChain(to));
                }
                let relation = &sender.internal.diplomacy;
                if relation.is_at_war_with(to) {
                    return Err(CommandError::AlreadyAtWar(to));
                }
                if relation.ally_map.contains_key(&to) {
                    return Err(CommandError::IsAlly(to));
                }
                if !sender.internal.modifiers.can_declare_war(to) {
                    return Err(CommandError::PeaceTreaty(to));
                }
                let record = self.war_record(to, self.from_id, true, target_leader_ids);
                let relation = &mut sender.internal.diplomacy;
                relation.self_wars.insert(to, record);
                relation.alliance_proposals.remove(&to);
                relation.change_relation(to, -WAR_RELATION_PENALTY);
                Ok(())
            }
            CommandKind::ProposePeace => {
                if sender.internal.diplomacy.self_wars.remove(&to).is_none() {
                    return Err(CommandError::NotAtWar(to));
                }
                sender
                    .internal
                    .modifiers
                    .add_peace_treaty(to, settings.peace_treaty_length);
                Ok(())
            }
            CommandKind::Surrender {
                target_leader_ids, ..
            } => {
                if !sender.internal.diplomacy.is_at_war_with(to) {
                    return Err(CommandError::NotAtWar(to));
                }
                if !sender.is_top_leader() {
                    return Err(CommandError::NotTopLeader(sender.player_id));
                }
                if sender.is_subordinate(to) {
                    return Err(CommandError::SameChain(to));
                }
                sender.internal.diplomacy.self_wars.remove(&to);
                sender
                    .internal
                    .modifiers
                    .add_peace_treaty(to, settings.peace_treaty_length);
                sender.internal.direct_leader_id = Some(to);
                sender.internal.leader_ids = std::iter::once(to)
                    .chain(target_leader_ids.iter().copied())
                    .collect();
                Ok(())
            }
            CommandKind::ProposeAlliance => {
                if sender.is_in_chain(to) {
                    return Err(CommandError::SameChain(to));
                }
                if sender.is_ally(to) {
                    return Err(CommandError::IsAlly(to));
                }
                if sender.is_enemy(to) || sender.internal.diplomacy.is_at_war_with(to) {
                    return Err(CommandError::IsEnemy(to));
                }
                Ok(())
            }
            CommandKind::AcceptAlliance => {
                if !sender.internal.diplomacy.alliance_proposals.contains(&to) {
                    return Err(CommandError::NoProposal(to));
                }
                if sender.is_enemy(to) || sender.internal.diplomacy.is_at_war_with(to) {
                    return Err(CommandError::IsEnemy(to));
                }
                let relation = &mut sender.internal.diplomacy;
                relation.alliance_proposals.remove(&to);
                relation
                    .ally_map
                    .insert(to, AllianceData { start_turn: self.turn });
                relation.change_relation(to, ALLIANCE_RELATION_BONUS);
                Ok(())
            }
            CommandKind::CancelAlliance => {
                if !sender.is_ally(to) {
                    return Err(CommandError::NotAlly(to));
                }
                sender.internal.diplomacy.remove_ally(to);
                sender
                    .internal
                    .diplomacy
                    .change_relation(to, -ALLIANCE_RELATION_BONUS);
                Ok(())
            }
            CommandKind::JoinAllyWar {
                opponent_id,
                opponent_leader_ids,
            } => {
                let opponent = *opponent_id;
                if !sender.is_ally(to) {
                    return Err(CommandError::NotAlly(to));
                }
                if sender.is_in_chain(opponent) {
                    return Err(CommandError::SameChain(opponent));
                }
                if sender.is_ally(opponent) {
                    return Err(CommandError::IsAlly(opponent));
                }
                if sender.internal.diplomacy.has_ally_war(to, opponent) {
                    return Err(CommandError::AlreadyAtWar(opponent));
                }
                let record = self.war_record(opponent, to, false, opponent_leader_ids);
                sender
                    .internal
                    .diplomacy
                    .ally_wars
                    .insert((to, opponent), record);
                sender
                    .internal
                    .diplomacy
                    .change_relation(opponent, -WAR_RELATION_PENALTY / 2.0);
                Ok(())
            }
            CommandKind::JoinAllySubordinateWar {
                ally_id,
                opponent_id,
                opponent_leader_ids,
            } => {
                let (ally, opponent) = (*ally_id, *opponent_id);
                if !sender.is_ally(ally) {
                    return Err(CommandError::NotAlly(ally));
                }
                if sender.is_in_chain(opponent) {
                    return Err(CommandError::SameChain(opponent));
                }
                if sender.is_ally(opponent) {
                    return Err(CommandError::IsAlly(opponent));
                }
                if sender
                    .internal
                    .diplomacy
                    .has_ally_subordinate_war(ally, to, opponent)
                {
                    return Err(CommandError::AlreadyAtWar(opponent));
                }
                let record = self.war_record(opponent, to, false, opponent_leader_ids);
                sender
                    .internal
                    .diplomacy
                    .ally_subordinate_wars
                    .insert((ally, to, opponent), record);
                Ok(())
            }
            CommandKind::DeclareIndependence { .. } => {
                if sender.internal.direct_leader_id != Some(to) {
                    return Err(CommandError::NotDirectLeader(to));
                }
                sender.internal.direct_leader_id = None;
                sender.internal.leader_ids.clear();
                sender
                    .internal
                    .diplomacy
                    .change_relation(to, -INDEPENDENCE_RELATION_PENALTY);
                Ok(())
            }
            CommandKind::SyncSubordinates { .. } => {
                if sender.internal.direct_leader_id != Some(to) {
                    return Err(CommandError::NotDirectLeader(to));
                }
                Ok(())
            }
            CommandKind::ChangeTaxRate { tax_rate } => {
                if !sender.is_subordinate(to) {
                    return Err(CommandError::NotSubordinate(to));
                }
                if !(0.0..=MAX_TAX_RATE).contains(tax_rate) {
                    return Err(CommandError::InvalidAmount(*tax_rate));
                }
                Ok(())
            }
            CommandKind::SendFuel { amount } => take_storage_fuel(sender, *amount),
            CommandKind::PayTax { amount } => {
                if sender.internal.direct_leader_id != Some(to) {
                    return Err(CommandError::NotDirectLeader(to));
                }
                take_storage_fuel(sender, *amount)
            }
            CommandKind::ChangeVelocity { target_velocity } => {
                if !self.is_self_addressed() {
                    return Err(CommandError::NotSelfAddressed);
                }
                let speed = target_velocity.magnitude();
                if !target_velocity.is_finite() || speed > settings.max_speed() {
                    return Err(CommandError::TooFast {
                        speed,
                        max: settings.max_speed(),
                    });
                }
                Ok(())
            }
            CommandKind::AllocateFuel { .. } | CommandKind::ConvertResource { .. } => {
                if self.is_self_addressed() {
                    Ok(())
                } else {
                    Err(CommandError::NotSelfAddressed)
                }
            }
        }
    }

    /// Validate against the target's current data and apply the receiver's
    /// part. Safe on stale commands: anything no longer valid is an `Err`
    /// and leaves the target untouched.
    pub fn check_and_execute(
        &self,
        target: &mut PlayerData,
        settings: &UniverseSettings,
    ) -> Result<(), CommandError> {
        if target.player_id != self.to_id {
            return Err(CommandError::WrongTarget {
                expected: self.to_id,
                actual: target.player_id,
            });
        }
        if !target.is_alive() {
            return Err(CommandError::Dead(target.player_id));
        }
        let from = self.from_id;

        match &self.kind {
            CommandKind::DeclareWar {
                sender_leader_ids, ..
            } => {
                if target.is_in_chain(from) {
                    return Err(CommandError::SameChain(from));
                }
                if target.internal.diplomacy.is_at_war_with(from) {
                    return Err(CommandError::AlreadyAtWar(from));
                }
                let record = self.war_record(from, self.to_id, false, sender_leader_ids);
                let relation = &mut target.internal.diplomacy;
                if relation.ally_map.contains_key(&from) {
                    relation.remove_ally(from);
                    relation.change_relation(from, -BETRAYAL_RELATION_PENALTY);
                }
                relation.alliance_proposals.remove(&from);
                relation.self_wars.insert(from, record);
                relation.change_relation(from, -WAR_RELATION_PENALTY);
                Ok(())
            }
            CommandKind::ProposePeace => {
                if target.internal.diplomacy.self_wars.remove(&from).is_none() {
                    return Err(CommandError::NotAtWar(from));
                }
                target
                    .internal
                    .modifiers
                    .add_peace_treaty(from, settings.peace_treaty_length);
                target
                    .internal
                    .diplomacy
                    .change_relation(from, PEACE_RELATION_BONUS);
                Ok(())
            }
            CommandKind::Surrender {
                sender_subordinate_ids,
                ..
            } => {
                if !target.internal.diplomacy.is_at_war_with(from) {
                    return Err(CommandError::NotAtWar(from));
                }
                if target.is_leader(from) {
                    return Err(CommandError::SameChain(from));
                }
                target.internal.diplomacy.self_wars.remove(&from);
                target
                    .internal
                    .modifiers
                    .add_peace_treaty(from, settings.peace_treaty_length);
                target.internal.direct_subordinate_ids.insert(from);
                target.internal.subordinate_ids.insert(from);
                target
                    .internal
                    .subordinate_ids
                    .extend(sender_subordinate_ids.iter().copied());
                target
                    .internal
                    .diplomacy
                    .change_relation(from, PEACE_RELATION_BONUS);
                Ok(())
            }
            CommandKind::ProposeAlliance => {
                if target.is_in_chain(from) {
                    return Err(CommandError::SameChain(from));
                }
                if target.is_ally(from) {
                    return Err(CommandError::IsAlly(from));
                }
                if target.is_enemy(from) || target.internal.diplomacy.is_at_war_with(from) {
                    return Err(CommandError::IsEnemy(from));
                }
                target.internal.diplomacy.alliance_proposals.insert(from);
                Ok(())
            }
            CommandKind::AcceptAlliance => {
                if target.is_enemy(from) || target.internal.diplomacy.is_at_war_with(from) {
                    return Err(CommandError::IsEnemy(from));
                }
                if target.is_in_chain(from) {
                    return Err(CommandError::SameChain(from));
                }
                let relation = &mut target.internal.diplomacy;
                relation
                    .ally_map
                    .insert(from, AllianceData { start_turn: self.turn });
                relation.change_relation(from, ALLIANCE_RELATION_BONUS);
                Ok(())
            }
            CommandKind::CancelAlliance => {
                if !target.is_ally(from) {
                    return Err(CommandError::NotAlly(from));
                }
                target.internal.diplomacy.remove_ally(from);
                target
                    .internal
                    .diplomacy
                    .change_relation(from, -2.0 * ALLIANCE_RELATION_BONUS);
                Ok(())
            }
            CommandKind::JoinAllyWar { .. } => {
                if !target.is_ally(from) {
                    return Err(CommandError::NotAlly(from));
                }
                target
                    .internal
                    .diplomacy
                    .change_relation(from, SUPPORT_RELATION_BONUS);
                Ok(())
            }
            CommandKind::JoinAllySubordinateWar { ally_id, .. } => {
                if !target.is_leader(*ally_id) {
                    return Err(CommandError::NotLeader(*ally_id));
                }
                target
                    .internal
                    .diplomacy
                    .change_relation(from, SUPPORT_RELATION_BONUS);
                Ok(())
            }
            CommandKind::DeclareIndependence {
                sender_subordinate_ids,
            } => {
                if !target.internal.direct_subordinate_ids.remove(&from) {
                    return Err(CommandError::NotSubordinate(from));
                }
                target.internal.subordinate_ids.remove(&from);
                for id in sender_subordinate_ids {
                    target.internal.subordinate_ids.remove(id);
                }
                target
                    .internal
                    .diplomacy
                    .change_relation(from, -INDEPENDENCE_RELATION_PENALTY);
                Ok(())
            }
            CommandKind::SyncSubordinates { subordinate_ids } => {
                if target.is_leader_or_self(from) {
                    return Err(CommandError::SameChain(from));
                }
                target.internal.direct_subordinate_ids.insert(from);
                target.internal.subordinate_ids.insert(from);
                target
                    .internal
                    .subordinate_ids
                    .extend(subordinate_ids.iter().filter(|id| **id != target.player_id));
                Ok(())
            }
            CommandKind::ChangeTaxRate { tax_rate } => {
                if !target.is_leader(from) {
                    return Err(CommandError::NotLeader(from));
                }
                target.internal.politics.tax_rate = tax_rate.clamp(0.0, MAX_TAX_RATE);
                Ok(())
            }
            CommandKind::SendFuel { amount } => {
                valid_amount(*amount)?;
                target.internal.physics.fuel.storage += amount;
                if !self.is_self_addressed() {
                    target
                        .internal
                        .diplomacy
                        .change_relation(from, GIFT_RELATION_BONUS);
                }
                Ok(())
            }
            CommandKind::PayTax { amount } => {
                valid_amount(*amount)?;
                if !target.is_subordinate(from) {
                    return Err(CommandError::NotSubordinate(from));
                }
                target.internal.physics.fuel.storage += amount;
                Ok(())
            }
            CommandKind::ChangeVelocity { target_velocity } => {
                if !self.is_self_addressed() {
                    return Err(CommandError::NotSelfAddressed);
                }
                let speed = target_velocity.magnitude();
                if !target_velocity.is_finite() || speed > settings.max_speed() {
                    return Err(CommandError::TooFast {
                        speed,
                        max: settings.max_speed(),
                    });
                }
                let physics = &target.internal.physics;
                let required = relativity::fuel_for_velocity_change(
                    physics.total_rest_mass(),
                    &target.velocity,
                    target_velocity,
                    settings.speed_of_light,
                );
                if physics.fuel.movement < required {
                    return Err(CommandError::InsufficientFuel {
                        required,
                        available: physics.fuel.movement,
                    });
                }
                target.internal.physics.fuel.movement -= required;
                target.velocity = *target_velocity;
                Ok(())
            }
            CommandKind::AllocateFuel { amount } => {
                if !self.is_self_addressed() {
                    return Err(CommandError::NotSelfAddressed);
                }
                if !amount.is_finite() || *amount == 0.0 {
                    return Err(CommandError::InvalidAmount(*amount));
                }
                let fuel = &mut target.internal.physics.fuel;
                let available = if *amount > 0.0 {
                    fuel.storage
                } else {
                    fuel.movement
                };
                if available < amount.abs() {
                    return Err(CommandError::InsufficientFuel {
                        required: amount.abs(),
                        available,
                    });
                }
                fuel.storage -= amount;
                fuel.movement += amount;
                Ok(())
            }
            CommandKind::ConvertResource { resource, amount } => {
                if !self.is_self_addressed() {
                    return Err(CommandError::NotSelfAddressed);
                }
                valid_amount(*amount)?;
                let available = target.internal.economy.amount(*resource);
                if available < *amount {
                    return Err(CommandError::InsufficientResource {
                        resource: *resource,
                        required: *amount,
                        available,
                    });
                }
                target.internal.economy.add(*resource, -amount);
                target.internal.physics.fuel.storage += amount * resource.fuel_value();
                Ok(())
            }
        }
    }
}

/// A command with everything needed to send it, built from the sender's
/// view of the target.
pub mod build {
    use super::{Command, CommandKind};
    use crate::state::{PlayerData, PlayerId};

    pub fn declare_war(sender: &PlayerData, target: &PlayerData, turn: u64) -> Command {
        Command::new(
            sender.player_id,
            target.player_id,
            turn,
            CommandKind::DeclareWar {
                sender_leader_ids: sender.internal.leader_ids.clone(),
                target_leader_ids: target.internal.leader_ids.clone(),
            },
        )
    }

    pub fn surrender(sender: &PlayerData, winner: &PlayerData, turn: u64) -> Command {
        Command::new(
            sender.player_id,
            winner.player_id,
            turn,
            CommandKind::Surrender {
                sender_subordinate_ids: sender.internal.subordinate_ids.clone(),
                target_leader_ids: winner.internal.leader_ids.clone(),
            },
        )
    }

    pub fn join_ally_war(
        sender: &PlayerData,
        ally_id: PlayerId,
        opponent: &PlayerData,
        turn: u64,
    ) -> Command {
        Command::new(
            sender.player_id,
            ally_id,
            turn,
            CommandKind::JoinAllyWar {
                opponent_id: opponent.player_id,
                opponent_leader_ids: opponent.internal.leader_ids.clone(),
            },
        )
    }

    pub fn join_ally_subordinate_war(
        sender: &PlayerData,
        ally_id: PlayerId,
        subordinate_id: PlayerId,
        opponent: &PlayerData,
        turn: u64,
    ) -> Command {
        Command::new(
            sender.player_id,
            subordinate_id,
            turn,
            CommandKind::JoinAllySubordinateWar {
                ally_id,
                opponent_id: opponent.player_id,
                opponent_leader_ids: opponent.internal.leader_ids.clone(),
            },
        )
    }

    pub fn declare_independence(sender: &PlayerData, leader_id: PlayerId, turn: u64) -> Command {
        Command::new(
            sender.player_id,
            leader_id,
            turn,
            CommandKind::DeclareIndependence {
                sender_subordinate_ids: sender.internal.subordinate_ids.clone(),
            },
        )
    }

    pub fn to_self(sender: &PlayerData, turn: u64, kind: CommandKind) -> Command {
        Command::new(sender.player_id, sender.player_id, turn, kind)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
