use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings fixed for the lifetime of a universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseSettings {
    pub universe_name: String,
    /// Registered mechanism collection run every turn.
    pub mechanism_collection_name: String,
    /// Grid units per turn.
    pub speed_of_light: f64,
    pub x_dim: u32,
    pub y_dim: u32,
    pub z_dim: u32,
    /// Hard cap on speed as a fraction of light speed.
    pub max_speed_fraction: f64,
    /// Turns during which war can't be re-declared after peace.
    pub peace_treaty_length: u32,
    /// Upper bound on iterations of any repeat-until reasoner.
    pub max_repeat_iterations: u32,
    /// Resource produced per unit of population per proper-time turn.
    pub base_productivity: f64,
    /// Fraction of every resource lost per proper-time turn.
    pub resource_decay: f64,
    /// Food eaten per unit of population per proper-time turn.
    pub food_per_population: f64,
    /// Fuel produced per unit of population per proper-time turn.
    pub fuel_per_population: f64,
}

impl Default for UniverseSettings {
    fn default() -> Self {
        Self {
            universe_name: "Test".to_string(),
            mechanism_collection_name: "default".to_string(),
            speed_of_light: 1.0,
            x_dim: 10,
            y_dim: 10,
            z_dim: 3,
            max_speed_fraction: 0.9,
            peace_treaty_length: 10,
            max_repeat_iterations: 20,
            base_productivity: 0.05,
            resource_decay: 0.01,
            food_per_population: 0.02,
            fuel_per_population: 0.01,
        }
    }
}

impl UniverseSettings {
    /// Largest speed any player may reach.
    pub fn max_speed(&self) -> f64 {
        self.speed_of_light * self.max_speed_fraction
    }
}

/// Settings consumed once, when a universe is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateSettings {
    /// Registered generation method.
    pub generate_method: String,
    pub num_player: u32,
    pub num_human_player: u32,
    pub seed: u64,
    pub initial_population: f64,
    pub initial_fuel: f64,
    /// Probability that a generated player starts as someone's subordinate.
    pub subordinate_probability: f64,
    /// Probability that a generated player starts moving.
    pub moving_probability: f64,
    pub universe_settings: UniverseSettings,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            generate_method: "random".to_string(),
            num_player: 4,
            num_human_player: 0,
            seed: 100,
            initial_population: 100.0,
            initial_fuel: 100.0,
            subordinate_probability: 0.3,
            moving_probability: 0.3,
            universe_settings: UniverseSettings::default(),
        }
    }
}

impl GenerateSettings {
    /// Load settings from a JSON file. Missing fields fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SettingsError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let settings = UniverseSettings::default();
        assert_eq!(settings.mechanism_collection_name, "default");
        assert_eq!(settings.speed_of_light, 1.0);
        assert!(settings.max_speed() < settings.speed_of_light);
    }

    #[test]
    fn test_partial_settings_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "num_player": 6, "universe_settings": {{ "x_dim": 6, "universe_name": "Small" }} }}"#
        )
        .unwrap();

        let settings = GenerateSettings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.num_player, 6);
        assert_eq!(settings.seed, GenerateSettings::default().seed);
        let universe = &settings.universe_settings;
        assert_eq!(universe.x_dim, 6);
        assert_eq!(universe.universe_name, "Small");
        assert_eq!(universe.y_dim, UniverseSettings::default().y_dim);
    }

    #[test]
    fn test_missing_settings_file_is_an_error() {
        let result = GenerateSettings::from_json_file(Path::new("/nonexistent/settings.json"));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_corrupt_settings_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ num_player: ").unwrap();
        let result = GenerateSettings::from_json_file(file.path());
        assert!(matches!(result, Err(SettingsError::Json { .. })));
    }
}
