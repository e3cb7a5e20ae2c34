//! The turn controller.
//!
//! A universe turn runs in five phases:
//!
//! 1. [`Universe::pre_process_universe`]: advance every living player's
//!    proper-time clock and freeze the pre-turn snapshot.
//! 2. [`Universe::compute_ai_commands`]: run each AI player's AI against its
//!    view of the snapshot, in parallel.
//! 3. [`Universe::post_process_universe`]: merge human and AI commands and
//!    apply them to the live state.
//! 4. Run the mechanism pipeline for every living player and apply the
//!    commands it produces.
//! 5. Remove dead players, refresh global data and advance the turn.
//!
//! # Parallelism
//!
//! Phases 2 and 4 and both halves of command application follow the same
//! shape: extract per-player inputs, process them on the rayon pool with
//! each task owning one player's data, then write the results back in id
//! order. Cross-player reads only ever see the frozen snapshot, and every
//! task draws from its own RNG stream derived from
//! `(seed, turn, player, stage)`, so results don't depend on scheduling.

use crate::ai::Ai;
use crate::command::Command;
use crate::config::{GenerateSettings, UniverseSettings};
use crate::mechanism::hierarchy::rebuild_chains;
use crate::mechanism::{advance_proper_time, process_mechanisms};
use crate::metrics::TurnMetrics;
use crate::profiling;
use crate::registry::Registry;
use crate::state::{GlobalData, OrdMap, PlayerData, PlayerId, PlayerType, UniverseData};
use crate::view::UniverseView;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Commands submitted for one turn, keyed by the submitting player.
pub type CommandMap = BTreeMap<PlayerId, Vec<Command>>;

/// Independent RNG streams within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ai = 1,
    Mechanism = 2,
}

/// RNG for one task of one turn.
pub fn task_rng(seed: u64, turn: u64, player_id: PlayerId, stage: Stage) -> StdRng {
    // splitmix64 over the mixed inputs
    let mut z = seed
        ^ turn.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (player_id as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (stage as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}

#[derive(Debug, Default, Clone, Copy)]
struct Delivery {
    applied: u64,
    rejected: u64,
}

pub struct Universe {
    data: UniverseData,
    settings: Arc<UniverseSettings>,
    registry: Arc<Registry>,
    /// Pre-turn players, set between `pre_process_universe` and the end of
    /// `post_process_universe`.
    snapshot: Option<OrdMap<PlayerId, PlayerData>>,
    turn_started: Option<Instant>,
    pub metrics: TurnMetrics,
}

impl Universe {
    pub fn new(data: UniverseData, registry: Arc<Registry>) -> Self {
        for name in registry.unknown_names(&data) {
            log::warn!("'{}' is not registered; falling back to an empty default", name);
        }
        let settings = Arc::new(data.settings.clone());
        Self {
            data,
            settings,
            registry,
            snapshot: None,
            turn_started: None,
            metrics: TurnMetrics::default(),
        }
    }

    /// Generate a fresh universe with the method named in `settings`.
    pub fn generate(settings: &GenerateSettings, registry: Arc<Registry>) -> Self {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let method = registry.generator(&settings.generate_method);
        let data = method.generate(settings, &mut rng);
        Self::new(data, registry)
    }

    pub fn data(&self) -> &UniverseData {
        &self.data
    }

    pub fn turn(&self) -> u64 {
        self.data.state.turn
    }

    /// Advance proper time for every living player and freeze the snapshot
    /// all views of this turn are built from.
    #[instrument(skip_all, name = "pre_process")]
    pub fn pre_process_universe(&mut self) {
        let start = Instant::now();
        self.turn_started = Some(start);
        if self.snapshot.is_some() {
            log::warn!(
                "Turn {} was pre-processed twice; refreezing the snapshot",
                self.turn()
            );
        }

        let ids: Vec<PlayerId> = self.data.living_players().map(|p| p.player_id).collect();
        let mut acting = 0;
        for id in ids {
            if let Some(player) = self.data.players.get_mut(&id) {
                if advance_proper_time(player, &self.settings) {
                    acting += 1;
                }
            }
        }
        log::trace!("Turn {}: {} players act on proper time", self.turn(), acting);

        self.snapshot = Some(self.data.players.clone());
        self.metrics.pre_process_time += start.elapsed();
    }

    fn frozen_players(&self) -> OrdMap<PlayerId, PlayerData> {
        match &self.snapshot {
            Some(snapshot) => snapshot.clone(),
            None => {
                log::warn!("No snapshot for turn {}; using live state", self.turn());
                self.data.players.clone()
            }
        }
    }

    fn snapshot_view(&self, players: OrdMap<PlayerId, PlayerData>) -> UniverseView {
        UniverseView::new(0, self.turn(), self.settings.clone(), players)
    }

    /// Commands from the AI of every living AI-controlled player.
    pub fn compute_ai_commands(&self) -> CommandMap {
        let ids: Vec<PlayerId> = self
            .frozen_players()
            .values()
            .filter(|p| p.is_alive() && p.player_type == PlayerType::Ai)
            .map(|p| p.player_id)
            .collect();
        self.compute_commands_for(ids)
    }

    #[instrument(skip_all, name = "ai")]
    fn compute_commands_for(&self, ids: Vec<PlayerId>) -> CommandMap {
        let base = self.snapshot_view(self.frozen_players());
        let seed = self.data.state.seed;
        let turn = self.turn();

        // PHASE 1: Resolve each player's AI
        let inputs: Vec<(PlayerId, Arc<dyn Ai>)> = ids
            .into_iter()
            .filter_map(|id| {
                let player = base.get(id)?;
                Some((id, self.registry.ai(&player.internal.ai.ai_name)))
            })
            .collect();

        // PHASE 2: Plan in parallel against the snapshot
        let _span = tracing::info_span!("ai_parallel", count = inputs.len()).entered();
        inputs
            .into_par_iter()
            .map(|(id, ai)| {
                let view = base.recentered(id);
                let commands = ai.compute(&view, task_rng(seed, turn, id, Stage::Ai));
                log::trace!("Player {} ({}) issued {} commands", id, ai.name(), commands.len());
                (id, commands)
            })
            .collect()
    }

    /// Apply the turn's commands, run the mechanisms and finish the turn.
    ///
    /// A human entry replaces the AI entry of the same player. Commands
    /// whose `from_id` isn't the submitting player are dropped.
    #[instrument(skip_all, name = "post_process")]
    pub fn post_process_universe(&mut self, human: CommandMap, ai: CommandMap) {
        let turn_start = Instant::now();
        let snapshot = self.frozen_players();
        self.snapshot = None;

        let mut merged = ai;
        merged.extend(human);
        let mut commands = Vec::new();
        let mut forged = 0;
        for (submitter, submitted) in merged {
            for command in submitted {
                if command.from_id == submitter {
                    commands.push(command);
                } else {
                    log::debug!(
                        "Dropping {} from {} submitted by player {}",
                        command.name(),
                        command.from_id,
                        submitter
                    );
                    forged += 1;
                }
            }
        }
        self.metrics.commands_rejected += forged;

        let start = Instant::now();
        let delivery = self.apply_commands(commands);
        self.metrics.command_time += start.elapsed();

        let start = Instant::now();
        let produced = self.run_mechanisms(snapshot);
        self.metrics.mechanism_time += start.elapsed();

        let start = Instant::now();
        let produced_delivery = self.apply_commands(produced);
        self.metrics.command_time += start.elapsed();

        let start = Instant::now();
        let dead = self.remove_dead_players();
        self.data.global = GlobalData::from_players(&self.data.players);
        self.data.state.turn += 1;
        self.metrics.cleanup_time += start.elapsed();

        log::debug!(
            "Turn {} done: {} commands applied, {} rejected, {} mechanism commands, {} died, {} alive",
            self.data.state.turn,
            delivery.applied,
            delivery.rejected + forged,
            produced_delivery.applied,
            dead.len(),
            self.data.global.living_player_count
        );

        self.metrics.total_turns += 1;
        self.metrics.total_time += self.turn_started.take().unwrap_or(turn_start).elapsed();
        profiling::frame_mark_turn();
    }

    /// Run a full turn with human commands for the human players.
    pub fn step(&mut self, human: CommandMap) {
        self.pre_process_universe();
        let start = Instant::now();
        let ai = self.compute_ai_commands();
        self.metrics.ai_time += start.elapsed();
        self.post_process_universe(human, ai);
    }

    /// Run a full turn with every living player, human or not, driven by
    /// its AI.
    pub fn pure_ai_step(&mut self) {
        self.pre_process_universe();
        let ids: Vec<PlayerId> = self.data.living_players().map(|p| p.player_id).collect();
        let ai = {
            let start = Instant::now();
            let commands = self.compute_commands_for(ids);
            self.metrics.ai_time += start.elapsed();
            commands
        };
        self.post_process_universe(CommandMap::new(), ai);
    }

    /// Apply commands in order: every sender's half first, then every
    /// target's half on the updated live state. Every command is stamped
    /// with the current turn.
    fn apply_commands(&mut self, commands: Vec<Command>) -> Delivery {
        let mut delivery = Delivery::default();
        if commands.is_empty() {
            return delivery;
        }
        let settings = self.settings.clone();
        let turn = self.turn();

        // War records take their start turn from the command, so the
        // submitted stamp is never trusted.
        let mut by_sender: BTreeMap<PlayerId, Vec<Command>> = BTreeMap::new();
        for mut command in commands {
            command.turn = turn;
            by_sender.entry(command.from_id).or_default().push(command);
        }
        let senders = self.extract_players(by_sender, &mut delivery);
        let executed: Vec<(PlayerData, Vec<Command>, u64)> = {
            let _span = tracing::info_span!("self_execute_parallel", count = senders.len()).entered();
            senders
                .into_par_iter()
                .map(|(mut sender, commands)| {
                    let mut accepted = Vec::with_capacity(commands.len());
                    let mut rejected = 0;
                    for command in commands {
                        match command.check_and_self_execute(&mut sender, &settings) {
                            Ok(()) => accepted.push(command),
                            Err(e) => {
                                log::debug!(
                                    "Player {} {} to {} rejected by sender: {}",
                                    command.from_id,
                                    command.name(),
                                    command.to_id,
                                    e
                                );
                                rejected += 1;
                            }
                        }
                    }
                    (sender, accepted, rejected)
                })
                .collect()
        };

        let mut by_target: BTreeMap<PlayerId, Vec<Command>> = BTreeMap::new();
        for (sender, accepted, rejected) in executed {
            delivery.rejected += rejected;
            self.data.players.insert(sender.player_id, sender);
            for command in accepted {
                by_target.entry(command.to_id).or_default().push(command);
            }
        }

        let targets = self.extract_players(by_target, &mut delivery);
        let received: Vec<(PlayerData, u64, u64)> = {
            let _span = tracing::info_span!("execute_parallel", count = targets.len()).entered();
            targets
                .into_par_iter()
                .map(|(mut target, commands)| {
                    let (mut applied, mut rejected) = (0, 0);
                    for command in commands {
                        match command.check_and_execute(&mut target, &settings) {
                            Ok(()) => applied += 1,
                            Err(e) => {
                                log::debug!(
                                    "Player {} {} to {} rejected by target: {}",
                                    command.from_id,
                                    command.name(),
                                    command.to_id,
                                    e
                                );
                                rejected += 1;
                            }
                        }
                    }
                    (target, applied, rejected)
                })
                .collect()
        };
        for (target, applied, rejected) in received {
            delivery.applied += applied;
            delivery.rejected += rejected;
            self.data.players.insert(target.player_id, target);
        }

        self.metrics.commands_applied += delivery.applied;
        self.metrics.commands_rejected += delivery.rejected;
        delivery
    }

    /// Clone out the live players owning each group. Groups for unknown
    /// players are rejected.
    fn extract_players(
        &self,
        groups: BTreeMap<PlayerId, Vec<Command>>,
        delivery: &mut Delivery,
    ) -> Vec<(PlayerData, Vec<Command>)> {
        groups
            .into_iter()
            .filter_map(|(id, commands)| match self.data.players.get(&id) {
                Some(player) => Some((player.clone(), commands)),
                None => {
                    log::debug!("Dropping {} commands for unknown player {}", commands.len(), id);
                    delivery.rejected += commands.len() as u64;
                    None
                }
            })
            .collect()
    }

    /// Run the mechanism collection for every living player. Returns the
    /// produced commands in player order.
    #[instrument(skip_all, name = "mechanisms")]
    fn run_mechanisms(&mut self, snapshot: OrdMap<PlayerId, PlayerData>) -> Vec<Command> {
        let registry = self.registry.clone();
        let lists = registry.mechanisms(&self.settings.mechanism_collection_name);
        if lists.is_empty() {
            return Vec::new();
        }
        let settings = self.settings.clone();
        let global = self.data.global.clone();
        let base = self.snapshot_view(snapshot);
        let seed = self.data.state.seed;
        let turn = self.turn();

        // PHASE 1: Extract living players
        let players: Vec<PlayerData> = self.data.living_players().cloned().collect();

        // PHASE 2: Run the pipeline in parallel, each task owning one player
        let results: Vec<(PlayerData, Vec<Command>)> = {
            let _span = tracing::info_span!("mechanisms_parallel", count = players.len()).entered();
            players
                .into_par_iter()
                .map(|mut player| {
                    let id = player.player_id;
                    let view = base.recentered(id);
                    let mut rng = task_rng(seed, turn, id, Stage::Mechanism);
                    let commands =
                        process_mechanisms(lists, &mut player, &view, &settings, &global, &mut rng);
                    (player, commands)
                })
                .collect()
        };

        // PHASE 3: Write back in id order
        let mut produced = Vec::new();
        for (player, commands) in results {
            self.data.players.insert(player.player_id, player);
            produced.extend(commands);
        }
        produced
    }

    /// Drop dead players and every record that names them.
    fn remove_dead_players(&mut self) -> Vec<PlayerId> {
        let dead: Vec<PlayerId> = self
            .data
            .players
            .values()
            .filter(|p| !p.is_alive())
            .map(|p| p.player_id)
            .collect();
        if dead.is_empty() {
            return dead;
        }

        for id in &dead {
            self.data.players.remove(id);
            self.data.state.dead_player_ids.push(*id);
            log::info!("Player {} removed on turn {}", id, self.turn());
        }
        let ids: Vec<PlayerId> = self.data.players.keys().copied().collect();
        for id in ids {
            if let Some(player) = self.data.players.get_mut(&id) {
                for gone in &dead {
                    player.internal.diplomacy.forget_player(*gone);
                }
            }
        }
        rebuild_chains(&mut self.data.players);
        dead
    }

    /// The current (live) universe seen from `player_id`. `None` for dead or
    /// unknown players.
    pub fn universe_view_at_player(&self, player_id: PlayerId) -> Option<UniverseView> {
        let view = UniverseView::new(
            player_id,
            self.turn(),
            self.settings.clone(),
            self.data.players.clone(),
        );
        if view.center().is_none() {
            log::debug!("No view for dead or unknown player {}", player_id);
            return None;
        }
        Some(view)
    }

    /// Living players in id order.
    pub fn current_player_data_list(&self) -> Vec<PlayerData> {
        self.data.living_players().cloned().collect()
    }

    /// Living human-controlled player ids.
    pub fn available_human_ids(&self) -> Vec<PlayerId> {
        self.data
            .living_players()
            .filter(|p| p.player_type == PlayerType::Human)
            .map(|p| p.player_id)
            .collect()
    }
}

#[cfg(test)]
#[path = "universe_tests.rs"]
mod tests;
