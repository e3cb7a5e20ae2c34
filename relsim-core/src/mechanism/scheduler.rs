//! Proper-time scheduling.
//!
//! Every universe turn a player's clock advances by `sqrt(1 - v²/c²)`, the
//! proper time that passes aboard at its current speed. Each time the
//! accumulated counter reaches one whole turn, the player gets an action
//! turn and the dilated mechanisms run for it.

use super::{Mechanism, MechanismLists};
use crate::command::Command;
use crate::config::UniverseSettings;
use crate::relativity;
use crate::state::{GlobalData, PlayerData};
use crate::view::UniverseView;
use rand::rngs::StdRng;

/// Tolerance for the counter reaching a whole turn. Keeps a stationary
/// player, or one whose fractions sum to exactly one, from losing a turn to
/// rounding.
const COUNTER_EPSILON: f64 = 1e-9;

/// Advance the player's proper-time clock by one universe turn and set
/// `is_time_dilation_action_turn`. Returns the new flag.
pub fn advance_proper_time(player: &mut PlayerData, settings: &UniverseSettings) -> bool {
    let fraction = relativity::proper_time_fraction(player.speed(), settings.speed_of_light);
    let mut counter = player.time_dilation_counter + fraction;
    let action = counter + COUNTER_EPSILON >= 1.0;
    if action {
        counter = (counter - 1.0).max(0.0);
    }
    player.time_dilation_counter = counter;
    player.is_time_dilation_action_turn = action;
    action
}

fn run_list(
    list: &[Mechanism],
    player: &mut PlayerData,
    view: &UniverseView,
    settings: &UniverseSettings,
    global: &GlobalData,
    rng: &mut StdRng,
    commands: &mut Vec<Command>,
) {
    for mechanism in list {
        if !player.is_alive() {
            break;
        }
        log::trace!("Player {} runs {}", player.player_id, mechanism.name());
        commands.extend(mechanism.process(player, view, settings, global, rng));
    }
}

/// Run a collection for one player: the regular list, then the dilated list
/// if this is an action turn. Dead players are skipped, and a player that
/// dies part way through runs nothing further.
pub fn process_mechanisms(
    lists: &MechanismLists,
    player: &mut PlayerData,
    view: &UniverseView,
    settings: &UniverseSettings,
    global: &GlobalData,
    rng: &mut StdRng,
) -> Vec<Command> {
    let mut commands = Vec::new();
    if !player.is_alive() {
        return commands;
    }
    run_list(&lists.regular, player, view, settings, global, rng, &mut commands);
    if player.is_time_dilation_action_turn {
        run_list(&lists.dilated, player, view, settings, global, rng, &mut commands);
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Double3D;
    use crate::testing::{view_of, UniverseBuilder};
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn flags(player: &mut PlayerData, turns: usize) -> Vec<bool> {
        let settings = UniverseSettings::default();
        (0..turns)
            .map(|_| advance_proper_time(player, &settings))
            .collect()
    }

    #[test]
    fn test_stationary_player_always_acts() {
        let mut player = PlayerData::new(1);
        assert!(flags(&mut player, 10).into_iter().all(|f| f));
        assert!(player.time_dilation_counter.abs() < 1e-9);
    }

    #[test]
    fn test_eight_tenths_light_speed_schedule() {
        let mut player = PlayerData::new(1);
        player.time_dilation_counter = 0.0;
        player.velocity = Double3D::new(0.8, 0.0, 0.0);
        let settings = UniverseSettings::default();

        let mut counters = Vec::new();
        let mut actions = Vec::new();
        for _ in 0..4 {
            actions.push(advance_proper_time(&mut player, &settings));
            counters.push(player.time_dilation_counter);
        }

        let expected = [0.6, 0.2, 0.8, 0.4];
        for (counter, want) in counters.iter().zip(expected) {
            assert!((counter - want).abs() < 1e-9, "{} != {}", counter, want);
        }
        assert_eq!(actions, vec![false, true, false, true]);
    }

    #[test]
    fn test_dead_player_is_not_processed() {
        let mut data = UniverseBuilder::new().with_player(1).build();
        let view = view_of(&data, 1);
        let global = data.global.clone();
        let settings = data.settings.clone();
        let player = data.players.get_mut(&1).unwrap();
        player.internal.is_alive = false;
        player.velocity = Double3D::new(0.5, 0.0, 0.0);

        let mut rng = StdRng::seed_from_u64(0);
        let lists = MechanismLists::default_collection();
        process_mechanisms(&lists, player, &view, &settings, &global, &mut rng);
        assert_eq!(player.position, Double3D::ZERO);
    }

    #[test]
    fn test_dilated_list_only_on_action_turns() {
        let mut data = UniverseBuilder::new().with_player(1).build();
        let view = view_of(&data, 1);
        let global = data.global.clone();
        let settings = data.settings.clone();
        let player = data.players.get_mut(&1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let lists = MechanismLists {
            regular: vec![],
            dilated: vec![Mechanism::ScienceProgress],
        };

        player.is_time_dilation_action_turn = false;
        process_mechanisms(&lists, player, &view, &settings, &global, &mut rng);
        assert_eq!(player.internal.science.knowledge, 0.0);

        player.is_time_dilation_action_turn = true;
        process_mechanisms(&lists, player, &view, &settings, &global, &mut rng);
        assert!(player.internal.science.knowledge > 0.0);
    }

    proptest! {
        #[test]
        fn prop_action_turns_match_proper_time(speed in 0.0f64..0.89, turns in 1usize..60) {
            let mut player = PlayerData::new(1);
            player.velocity = Double3D::new(speed, 0.0, 0.0);
            let actions = flags(&mut player, turns).into_iter().filter(|f| *f).count();

            let elapsed = relativity::proper_time_fraction(speed, 1.0) * turns as f64;
            prop_assert!(player.time_dilation_counter >= 0.0);
            prop_assert!(player.time_dilation_counter < 1.0);
            prop_assert!((actions as f64 - elapsed).abs() < 1.0 + 1e-6);
        }
    }
}
