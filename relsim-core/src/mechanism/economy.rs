//! Production, consumption and taxation.
//!
//! These run on proper time: only on a player's time-dilation action turns.

use crate::command::{Command, CommandKind};
use crate::config::UniverseSettings;
use crate::state::{PlayerData, ResourceType};
use crate::view::UniverseView;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::instrument;

/// Population below which a player dies out.
pub const MIN_POPULATION: f64 = 1.0;

/// Random spread of per-turn yields around the expected value.
const YIELD_SPREAD: f64 = 0.1;

/// How far satisfaction moves toward its target each proper-time turn.
const SATISFACTION_RATE: f64 = 0.1;

fn efficiency(player: &PlayerData) -> f64 {
    0.5 + player.internal.population.satisfaction
}

#[instrument(skip_all, name = "resource_production")]
pub fn run_resource_production(
    player: &mut PlayerData,
    settings: &UniverseSettings,
    rng: &mut StdRng,
) {
    let population = player.internal.population.population;
    let efficiency = efficiency(player);
    let economy = &mut player.internal.economy;

    for resource in ResourceType::ALL {
        let decay = economy.amount(resource) * settings.resource_decay;
        let spread = rng.gen_range(1.0 - YIELD_SPREAD..=1.0 + YIELD_SPREAD);
        let produced = population * settings.base_productivity * efficiency * spread;
        economy.add(resource, produced - decay);
    }

    player.internal.physics.fuel.storage +=
        population * settings.fuel_per_population * efficiency;
}

/// Feed the population and grow or shrink it. Returns `true` if the player
/// died this turn.
#[instrument(skip_all, name = "population_growth")]
pub fn run_population_growth(player: &mut PlayerData, settings: &UniverseSettings) -> bool {
    let need = player.internal.population.population * settings.food_per_population;
    let mut remaining = need;
    for resource in ResourceType::ALL.iter().filter(|r| r.is_food()) {
        let eaten = player.internal.economy.amount(*resource).min(remaining);
        player.internal.economy.add(*resource, -eaten);
        remaining -= eaten;
    }
    let fed = if need > 0.0 {
        (need - remaining) / need
    } else {
        1.0
    };

    let tax_rate = player.internal.politics.tax_rate;
    let population = &mut player.internal.population;
    let target_satisfaction = fed * (1.0 - tax_rate);
    population.satisfaction = (population.satisfaction
        + (target_satisfaction - population.satisfaction) * SATISFACTION_RATE)
        .clamp(0.0, 1.0);

    let growth = population.population
        * population.growth_rate
        * (2.0 * fed - 1.0)
        * (0.5 + population.satisfaction);
    population.population = (population.population + growth).max(0.0);

    if population.population < MIN_POPULATION {
        log::info!(
            "Player {} died out (population {:.3})",
            player.player_id,
            population.population
        );
        player.internal.is_alive = false;
        return true;
    }
    false
}

/// Pay a share of this turn's fuel production to the direct leader.
#[instrument(skip_all, name = "taxation")]
pub fn run_taxation(
    player: &PlayerData,
    view: &UniverseView,
    settings: &UniverseSettings,
) -> Vec<Command> {
    let Some(leader_id) = player.internal.direct_leader_id else {
        return Vec::new();
    };
    if !view.is_visible(leader_id) {
        return Vec::new();
    }

    let owed = player.internal.population.population
        * settings.fuel_per_population
        * efficiency(player)
        * player.internal.politics.tax_rate;
    let amount = owed.min(player.internal.physics.fuel.storage);
    if amount <= 0.0 {
        return Vec::new();
    }

    log::trace!(
        "Player {} pays {:.3} tax to {}",
        player.player_id,
        amount,
        leader_id
    );
    vec![Command::new(
        player.player_id,
        leader_id,
        view.turn,
        CommandKind::PayTax { amount },
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{view_of, UniverseBuilder};
    use rand::SeedableRng;

    #[test]
    fn test_production_adds_resources_and_fuel() {
        let settings = UniverseSettings::default();
        let mut player = PlayerData::new(1);
        let mut rng = StdRng::seed_from_u64(7);

        run_resource_production(&mut player, &settings, &mut rng);

        // 100 population at satisfaction 0.5: 5 per resource, give or take
        for resource in ResourceType::ALL {
            let amount = player.internal.economy.amount(resource);
            assert!((4.5..=5.5).contains(&amount), "{} = {}", resource, amount);
        }
        assert!((player.internal.physics.fuel.storage - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fed_population_grows() {
        let settings = UniverseSettings::default();
        let mut player = PlayerData::new(1);
        player.internal.economy.add(ResourceType::Plant, 100.0);

        assert!(!run_population_growth(&mut player, &settings));
        assert!(player.internal.population.population > 100.0);
        // Needs 2 food, eaten from plants first
        assert_eq!(player.internal.economy.amount(ResourceType::Plant), 98.0);
    }

    #[test]
    fn test_starving_population_shrinks_and_dies() {
        let settings = UniverseSettings::default();
        let mut player = PlayerData::new(1);
        player.internal.population.population = 1.01;
        player.internal.population.growth_rate = 0.5;

        assert!(run_population_growth(&mut player, &settings));
        assert!(!player.is_alive());
    }

    #[test]
    fn test_taxation_pays_direct_leader() {
        let data = UniverseBuilder::new()
            .with_player(1)
            .with_player(2)
            .with_leader(2, 1)
            .build();
        let view = view_of(&data, 2);

        let commands = run_taxation(&data.players[&2], &view, &data.settings);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].to_id, 1);
        match commands[0].kind {
            CommandKind::PayTax { amount } => assert!((amount - 0.1).abs() < 1e-9),
            ref other => panic!("unexpected command {:?}", other),
        }

        assert!(run_taxation(&data.players[&1], &view, &data.settings).is_empty());
    }
}
