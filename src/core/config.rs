//! Game configuration
//!
//! Supports saving and loading configurations in RON (Rusty Object Notation)
//! and JSON. Every field has a default, so a file only needs the values it
//! changes.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::AiTuning;
use crate::map::{DEFAULT_MAP_SIZE, DEFAULT_WALKS, SearchMode};

/// Where the level comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapSource {
    /// Load a CSV grid
    File {
        /// Path to the CSV file
        path: PathBuf,
    },
    /// Generate a level with random walks
    Generate {
        rows: usize,
        cols: usize,
        /// Number of random walks carving barriers
        walks: usize,
        /// Optional path to save the generated grid to
        #[serde(default)]
        write_to: Option<PathBuf>,
    },
}

impl Default for MapSource {
    fn default() -> Self {
        Self::Generate {
            rows: DEFAULT_MAP_SIZE,
            cols: DEFAULT_MAP_SIZE,
            walks: DEFAULT_WALKS,
            write_to: None,
        }
    }
}

/// Everything needed to set up and run a hunt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// World width in world units
    pub world_width: f32,
    /// World height in world units
    pub world_height: f32,
    /// Level source
    pub map: MapSource,
    /// Seed for level generation and patrol goals
    pub seed: u64,
    /// Path search strategy
    pub search_mode: SearchMode,
    /// Simulation ticks per second
    pub ticks_per_second: u32,
    /// Stop after this many ticks (`None` runs until the game quits)
    pub max_ticks: Option<u64>,
    /// Player position
    pub player_spawn: Vec2,
    /// Player footprint edge length
    pub player_size: f32,
    /// Enemy start positions
    pub enemy_spawns: Vec<Vec2>,
    /// Enemy footprint edge length
    pub enemy_size: f32,
    /// Enemy speed in world units per second
    pub enemy_speed: f32,
    /// Projectile radius
    pub projectile_radius: f32,
    /// AI distances and timings
    pub ai: AiTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 800.0,
            map: MapSource::default(),
            seed: 1,
            search_mode: SearchMode::default(),
            ticks_per_second: 60,
            max_ticks: Some(3600),
            player_spawn: Vec2::new(400.0, 400.0),
            player_size: 32.0,
            enemy_spawns: vec![Vec2::new(80.0, 80.0)],
            enemy_size: 32.0,
            enemy_speed: 100.0,
            projectile_radius: 4.0,
            ai: AiTuning::default(),
        }
    }
}

impl GameConfig {
    /// Set the world size
    #[must_use]
    pub fn with_world_size(mut self, width: f32, height: f32) -> Self {
        self.world_width = width;
        self.world_height = height;
        self
    }

    /// Set the level source
    #[must_use]
    pub fn with_map(mut self, map: MapSource) -> Self {
        self.map = map;
        self
    }

    /// Set the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the path search strategy
    #[must_use]
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Set the tick limit
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Set the player position
    #[must_use]
    pub fn with_player_spawn(mut self, spawn: Vec2) -> Self {
        self.player_spawn = spawn;
        self
    }

    /// Set the enemy start positions
    #[must_use]
    pub fn with_enemy_spawns(mut self, spawns: Vec<Vec2>) -> Self {
        self.enemy_spawns = spawns;
        self
    }

    /// Set the AI tuning
    #[must_use]
    pub fn with_ai(mut self, ai: AiTuning) -> Self {
        self.ai = ai;
        self
    }

    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.world_width, self.world_height)
    }

    /// Check the values make a playable game
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("player_size", self.player_size),
            ("enemy_size", self.enemy_size),
            ("projectile_radius", self.projectile_radius),
        ];
        if let Some((field, value)) = positive
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v <= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "{field} must be positive, got {value}"
            )));
        }

        if !self.enemy_speed.is_finite() || self.enemy_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "enemy_speed must not be negative, got {}",
                self.enemy_speed
            )));
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid(
                "ticks_per_second must be at least 1".to_string(),
            ));
        }
        if let MapSource::Generate { rows, cols, .. } = self.map
            && (rows == 0 || cols == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "generated map must have rows and columns, got {rows}x{cols}"
            )));
        }

        self.ai.validate()
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse a configuration from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Load RON or JSON depending on the file extension (RON otherwise)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::load_json(path)
        } else {
            Self::load_ron(path)
        }
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// A value that can't be played with
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.world_size(), Vec2::new(800.0, 800.0));
        assert_eq!(
            config.map,
            MapSource::Generate {
                rows: 15,
                cols: 15,
                walks: 10,
                write_to: None
            }
        );
    }

    #[test]
    fn test_config_serialization_ron() {
        let config = GameConfig::default()
            .with_seed(42)
            .with_search_mode(SearchMode::AStar)
            .with_enemy_spawns(vec![Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0)]);

        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("AStar"));

        let loaded = GameConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_serialization_json() {
        let config = GameConfig::default().with_map(MapSource::File {
            path: PathBuf::from("levels/arena.csv"),
        });

        let json_str = serde_json::to_string(&config).unwrap();
        let loaded: GameConfig = serde_json::from_str(&json_str).unwrap();

        assert_eq!(loaded.map, config.map);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = GameConfig::from_ron_str("(seed: 9, ai: (hunt_distance: 250.0))").unwrap();

        assert_eq!(config.seed, 9);
        assert!((config.ai.hunt_distance - 250.0).abs() < f32::EPSILON);
        assert!((config.ai.attack_distance - 10.0).abs() < f32::EPSILON);
        assert_eq!(config.ticks_per_second, 60);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = GameConfig::default().with_world_size(0.0, 800.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.ticks_per_second = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = GameConfig::default().with_map(MapSource::Generate {
            rows: 0,
            cols: 15,
            walks: 10,
            write_to: None,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = GameConfig::default()
            .with_ai(AiTuning::default().with_attack_distance(500.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = GameConfig::load("does/not/exist.ron");

        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_deserialize_error() {
        let result = GameConfig::from_ron_str("(seed: \"not a number\")");

        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }
}
