use crate::state::{GlobalData, PlayerData};
use crate::view::UniverseView;
use tracing::instrument;

/// Share of the gap to the most advanced player closed per proper-time turn.
const GLOBAL_DIFFUSION: f64 = 0.01;

/// Share of the gap to the direct leader closed per proper-time turn.
const LEADER_DIFFUSION: f64 = 0.1;

#[instrument(skip_all, name = "science_progress")]
pub fn run_science_progress(player: &mut PlayerData) {
    let population = &player.internal.population;
    let gained =
        population.population * player.internal.science.research_rate * (0.5 + population.satisfaction);
    player.internal.science.knowledge += gained.max(0.0);
}

/// Knowledge leaks from the frontier and flows down the hierarchy.
#[instrument(skip_all, name = "sync_science")]
pub fn run_sync_science(player: &mut PlayerData, view: &UniverseView, global: &GlobalData) {
    let science = &mut player.internal.science;
    if global.max_knowledge > science.knowledge {
        science.knowledge += (global.max_knowledge - science.knowledge) * GLOBAL_DIFFUSION;
    }

    let leader_knowledge = player
        .internal
        .direct_leader_id
        .and_then(|id| view.get(id))
        .map(|leader| leader.internal.science.knowledge);
    let science = &mut player.internal.science;
    if let Some(knowledge) = leader_knowledge {
        if knowledge > science.knowledge {
            science.knowledge += (knowledge - science.knowledge) * LEADER_DIFFUSION;
        }
    }
}
