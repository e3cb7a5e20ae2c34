//! Initial universe generation.

use crate::config::GenerateSettings;
use crate::mechanism::hierarchy::rebuild_chains;
use crate::state::{
    Double3D, GlobalData, OrdMap, PlayerData, PlayerId, PlayerType, ResourceType, UniverseData,
    UniverseState,
};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Initial speed range of moving players, as fractions of the maximum.
const MIN_INITIAL_SPEED_FRACTION: f64 = 0.1;
const MAX_INITIAL_SPEED_FRACTION: f64 = 0.5;
/// Upper bound of each initial resource stock.
const MAX_INITIAL_RESOURCE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerateUniverseMethod {
    /// Uniform positions, jittered stocks and random subordination trees.
    Random,
}

impl GenerateUniverseMethod {
    pub fn name(&self) -> &'static str {
        match self {
            GenerateUniverseMethod::Random => "random",
        }
    }

    pub fn generate(&self, settings: &GenerateSettings, rng: &mut StdRng) -> UniverseData {
        match self {
            GenerateUniverseMethod::Random => generate_random(settings, rng),
        }
    }
}

fn coordinate(rng: &mut StdRng, dim: u32) -> f64 {
    rng.gen_range(0.0..dim.max(1) as f64)
}

fn random_direction(rng: &mut StdRng) -> Double3D {
    let direction = Double3D::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    )
    .normalize();
    if direction == Double3D::ZERO {
        Double3D::new(1.0, 0.0, 0.0)
    } else {
        direction
    }
}

fn random_player(id: PlayerId, settings: &GenerateSettings, rng: &mut StdRng) -> PlayerData {
    let universe = &settings.universe_settings;
    let mut player = PlayerData::new(id);
    if id <= settings.num_human_player {
        player.player_type = PlayerType::Human;
    }

    player.position = Double3D::new(
        coordinate(rng, universe.x_dim),
        coordinate(rng, universe.y_dim),
        coordinate(rng, universe.z_dim),
    );
    if rng.gen_bool(settings.moving_probability.clamp(0.0, 1.0)) {
        let fraction = rng.gen_range(MIN_INITIAL_SPEED_FRACTION..MAX_INITIAL_SPEED_FRACTION);
        player.velocity = random_direction(rng).scale(universe.max_speed() * fraction);
    }

    let internal = &mut player.internal;
    internal.population.population = settings.initial_population * rng.gen_range(0.5..1.5);
    let fuel = settings.initial_fuel * rng.gen_range(0.5..1.5);
    internal.physics.fuel.movement = fuel * internal.physics.target_movement_fraction;
    internal.physics.fuel.storage = fuel - internal.physics.fuel.movement;
    for resource in ResourceType::ALL {
        internal
            .economy
            .resources
            .insert(resource, rng.gen_range(0.0..MAX_INITIAL_RESOURCE));
    }
    player
}

#[instrument(skip_all, name = "generate_random")]
fn generate_random(settings: &GenerateSettings, rng: &mut StdRng) -> UniverseData {
    let mut players: OrdMap<PlayerId, PlayerData> = OrdMap::new();
    for id in 1..=settings.num_player {
        let mut player = random_player(id, settings, rng);
        // Leaders always have lower ids, so the trees are acyclic
        if id > 1 && rng.gen_bool(settings.subordinate_probability.clamp(0.0, 1.0)) {
            player.internal.direct_leader_id = Some(rng.gen_range(1..id));
        }
        players.insert(id, player);
    }
    rebuild_chains(&mut players);

    log::info!(
        "Generated {} players ({} human) in a {}x{}x{} universe",
        settings.num_player,
        settings.num_human_player.min(settings.num_player),
        settings.universe_settings.x_dim,
        settings.universe_settings.y_dim,
        settings.universe_settings.z_dim
    );

    UniverseData {
        settings: settings.universe_settings.clone(),
        state: UniverseState {
            turn: 0,
            seed: settings.seed,
            max_player_id: settings.num_player,
            dead_player_ids: Vec::new(),
        },
        global: GlobalData::from_players(&players),
        players,
    }
}
