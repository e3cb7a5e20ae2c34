//! Command-line driver for the relativistic empire simulation.
//!
//! Generates (or loads) a universe, runs a number of pure-AI turns while
//! logging a summary of each, and optionally saves the result.

use anyhow::{Context, Result};
use clap::Parser;
use relsim_core::config::GenerateSettings;
use relsim_core::{load_universe, save_universe, Registry, Universe};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of players to generate
    #[arg(long)]
    pub players: Option<u32>,

    /// How many of the generated players are human
    #[arg(long)]
    pub humans: Option<u32>,

    /// Grid size along x
    #[arg(long)]
    pub x_dim: Option<u32>,

    /// Grid size along y
    #[arg(long)]
    pub y_dim: Option<u32>,

    /// Grid size along z
    #[arg(long)]
    pub z_dim: Option<u32>,

    /// Generation and simulation seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of turns to run
    #[arg(short, long, default_value_t = 10)]
    pub turns: u32,

    /// JSON file with generation settings; flags override its values
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Continue a saved universe instead of generating one
    #[arg(long, conflicts_with = "settings")]
    pub load: Option<PathBuf>,

    /// Save the universe here when done
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Tracy capture level (info, debug, trace); needs the `tracy` feature
    #[arg(long, default_value = "info")]
    pub trace_level: String,
}

/// Generation settings from the settings file (or defaults) with flag
/// overrides applied.
pub fn generate_settings(args: &Args) -> Result<GenerateSettings> {
    let mut settings = match &args.settings {
        Some(path) => GenerateSettings::from_json_file(path)
            .context("Failed to load generation settings")?,
        None => GenerateSettings::default(),
    };

    if let Some(players) = args.players {
        settings.num_player = players;
    }
    if let Some(humans) = args.humans {
        settings.num_human_player = humans;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    let universe = &mut settings.universe_settings;
    if let Some(x) = args.x_dim {
        universe.x_dim = x;
    }
    if let Some(y) = args.y_dim {
        universe.y_dim = y;
    }
    if let Some(z) = args.z_dim {
        universe.z_dim = z;
    }

    if settings.num_human_player > settings.num_player {
        log::warn!(
            "{} humans requested for {} players; all players will be human",
            settings.num_human_player,
            settings.num_player
        );
        settings.num_human_player = settings.num_player;
    }
    Ok(settings)
}

/// Build the starting universe: loaded if `--load` was given, generated
/// otherwise.
pub fn initial_universe(args: &Args, registry: Arc<Registry>) -> Result<Universe> {
    match &args.load {
        Some(path) => load_universe(path, registry)
            .with_context(|| format!("Failed to load universe from {}", path.display())),
        None => {
            let settings = generate_settings(args)?;
            Ok(Universe::generate(&settings, registry))
        }
    }
}

/// Run the whole session described by `args` and return the final universe.
pub fn run(args: &Args) -> Result<Universe> {
    let registry = Arc::new(Registry::default());
    let mut universe = initial_universe(args, registry)?;
    log::info!(
        "Starting at turn {} with {} living players",
        universe.turn(),
        universe.current_player_data_list().len()
    );

    for _ in 0..args.turns {
        universe.pure_ai_step();
        let data = universe.data();
        let wars: usize = data
            .living_players()
            .map(|p| p.internal.diplomacy.self_wars.len())
            .sum::<usize>()
            / 2;
        log::info!(
            "Turn {} | players: {} | population: {:.1} | max knowledge: {:.3} | wars: {}",
            data.state.turn,
            data.global.living_player_count,
            data.global.total_population,
            data.global.max_knowledge,
            wars
        );
    }

    let metrics = &universe.metrics;
    log::info!(
        "Ran {} turns in {:.1}ms ({:.3}ms/turn, {:.1}% of commands applied)",
        metrics.total_turns,
        metrics.total_time.as_secs_f64() * 1000.0,
        metrics.turn_avg_ms(),
        metrics.acceptance_rate() * 100.0
    );

    if let Some(path) = &args.save {
        save_universe(&universe, path)?;
    }
    Ok(universe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("relsim").chain(extra.iter().copied()))
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = generate_settings(&args(&[
            "--players", "6", "--humans", "2", "--x-dim", "4", "--seed", "9",
        ]))
        .unwrap();
        assert_eq!(settings.num_player, 6);
        assert_eq!(settings.num_human_player, 2);
        assert_eq!(settings.universe_settings.x_dim, 4);
        assert_eq!(
            settings.universe_settings.y_dim,
            GenerateSettings::default().universe_settings.y_dim
        );
        assert_eq!(settings.seed, 9);
    }

    #[test]
    fn test_humans_capped_at_players() {
        let settings = generate_settings(&args(&["--players", "2", "--humans", "5"])).unwrap();
        assert_eq!(settings.num_human_player, 2);
    }

    #[test]
    fn test_settings_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "num_player": 7, "universe_settings": { "z_dim": 5 } }"#,
        )
        .unwrap();

        let settings = generate_settings(&args(&[
            "--settings",
            path.to_str().unwrap(),
            "--z-dim",
            "2",
        ]))
        .unwrap();
        assert_eq!(settings.num_player, 7);
        assert_eq!(settings.universe_settings.z_dim, 2);
    }

    #[test]
    fn test_run_turns() {
        let universe = run(&args(&["--players", "3", "--turns", "2"])).unwrap();
        assert_eq!(universe.turn(), 2);
    }
}
