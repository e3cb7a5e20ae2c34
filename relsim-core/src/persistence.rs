//! JSON save and load of whole universes.

use crate::registry::Registry;
use crate::state::UniverseData;
use crate::universe::Universe;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid universe data: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn to_json(data: &UniverseData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}

pub fn from_json(text: &str) -> Result<UniverseData, LoadError> {
    Ok(serde_json::from_str(text)?)
}

/// Write the universe's data to `path`.
pub fn save_universe(universe: &Universe, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let json = to_json(universe.data()).context("Failed to serialize universe")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write save file {}", path.display()))?;
    log::info!(
        "Saved universe at turn {} to {}",
        universe.turn(),
        path.display()
    );
    Ok(())
}

/// Read a universe saved with [`save_universe`].
pub fn load_universe(path: &Path, registry: Arc<Registry>) -> Result<Universe, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let data = from_json(&text)?;
    log::info!(
        "Loaded universe '{}' at turn {} with {} players",
        data.settings.universe_name,
        data.state.turn,
        data.players.len()
    );
    Ok(Universe::new(data, registry))
}
