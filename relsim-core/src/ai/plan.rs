use crate::command::{Command, CommandError};
use crate::config::UniverseSettings;
use crate::state::{PlayerData, PlayerId};
use crate::view::UniverseView;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// Working state of one AI invocation.
///
/// Queued commands are applied to scratch copies right away, so later
/// decisions in the same plan see their effect (fuel already sent, war
/// already declared). The view itself never changes.
pub struct PlanDataAtPlayer {
    pub view: UniverseView,
    /// Scratch copy of the planning player.
    pub player: PlayerData,
    /// Scratch copies of players touched by queued commands.
    others: BTreeMap<PlayerId, PlayerData>,
    pub commands: Vec<Command>,
    pub rng: StdRng,
}

impl PlanDataAtPlayer {
    /// `None` if the view's center isn't a living player.
    pub fn new(view: UniverseView, rng: StdRng) -> Option<Self> {
        let player = view.center()?.clone();
        Some(Self {
            view,
            player,
            others: BTreeMap::new(),
            commands: Vec::new(),
            rng,
        })
    }

    pub fn self_id(&self) -> PlayerId {
        self.player.player_id
    }

    pub fn turn(&self) -> u64 {
        self.view.turn
    }

    pub fn settings(&self) -> &UniverseSettings {
        &self.view.settings
    }

    /// Current idea of another player: its scratch copy if a queued command
    /// touched it, otherwise the snapshot.
    pub fn other(&self, id: PlayerId) -> Option<&PlayerData> {
        if id == self.self_id() {
            return Some(&self.player);
        }
        self.others.get(&id).or_else(|| self.view.get(id))
    }

    /// Validate `command` against the scratch copies and queue it.
    ///
    /// Both halves must succeed; otherwise the scratch copies are left as
    /// they were and the command is dropped.
    pub fn add_command(&mut self, command: Command) -> Result<(), CommandError> {
        let settings = self.view.settings.clone();
        let mut sender = self.player.clone();
        command.check_and_self_execute(&mut sender, &settings)?;

        if command.to_id == self.self_id() {
            command.check_and_execute(&mut sender, &settings)?;
            self.player = sender;
        } else {
            let mut target = match self.other(command.to_id) {
                Some(target) => target.clone(),
                None => {
                    return Err(CommandError::Dead(command.to_id));
                }
            };
            command.check_and_execute(&mut target, &settings)?;
            self.player = sender;
            self.others.insert(target.player_id, target);
        }

        log::trace!(
            "Player {} plans {} to {}",
            command.from_id,
            command.name(),
            command.to_id
        );
        self.commands.push(command);
        Ok(())
    }

    /// Queue `command`, logging instead of failing.
    pub fn try_add_command(&mut self, command: Command) -> bool {
        let name = command.name();
        match self.add_command(command) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Player {} dropped planned {}: {}", self.self_id(), name, e);
                false
            }
        }
    }
}
