//! Game configuration
//!
//! Loaded from a JSON file at startup. Every field has a default, so a
//! partial file (or none at all) still yields a playable game.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Which game the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    AcornDrop,
    Stealth,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::AcornDrop => "acorn_drop",
            GameMode::Stealth => "stealth",
        }
    }
}

impl FromStr for GameMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "acorn_drop" | "acorn" | "shooter" => Ok(GameMode::AcornDrop),
            "stealth" => Ok(GameMode::Stealth),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// Per-level tuning for the acorn drop game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub hits_to_win: u32,
    pub ammo: u32,
    /// Multiplier on the leaf's base speed
    pub leaf_speed_scale: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            hits_to_win: 5,
            ammo: 10,
            leaf_speed_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub mode: GameMode,
    /// RNG seed; leaf respawns are reproducible for a given seed
    pub seed: u64,

    // === Acorn drop ===
    pub squirrel_speed: f32,
    pub acorn_speed: f32,
    pub leaf_speed_x: f32,
    pub leaf_speed_y: f32,
    /// Drive acorns and leaves through the rigid-body simulation
    pub physics_projectiles: bool,
    pub levels: Vec<LevelConfig>,

    // === Stealth ===
    pub player_speed: f32,
    pub camera_sweep_speed: f32,

    /// Texture names the renderer should have; missing ones degrade to fills
    pub textures: Vec<String>,
    /// Optional object description file for the factory
    pub objects_path: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "Nutshell".to_string(),
            mode: GameMode::AcornDrop,
            seed: 0x5eed,

            squirrel_speed: SQUIRREL_SPEED,
            acorn_speed: ACORN_SPEED,
            leaf_speed_x: LEAF_SPEED_X,
            leaf_speed_y: LEAF_SPEED_Y,
            physics_projectiles: false,
            levels: vec![
                LevelConfig::default(),
                LevelConfig {
                    hits_to_win: 8,
                    ammo: 12,
                    leaf_speed_scale: 1.3,
                },
            ],

            player_speed: PLAYER_SPEED,
            camera_sweep_speed: CAMERA_SWEEP_SPEED,

            textures: Vec::new(),
            objects_path: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str, path: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config = Self::from_json(&json, &display)?;
        log::info!("Loaded config from {}: title=\"{}\"", display, config.title);
        Ok(config)
    }

    /// Load, or fall back to defaults with a warning
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Level tuning; levels past the list reuse the last entry
    pub fn level(&self, index: usize) -> LevelConfig {
        self.levels
            .get(index)
            .or(self.levels.last())
            .cloned()
            .unwrap_or_default()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            GameConfig::from_json(r#"{ "title": "Acorns", "squirrel_speed": 250.0 }"#, "test")
                .unwrap();
        assert_eq!(config.title, "Acorns");
        assert_eq!(config.squirrel_speed, 250.0);
        assert_eq!(config.acorn_speed, ACORN_SPEED);
        assert_eq!(config.levels.len(), 2);
    }

    #[test]
    fn test_mode_parses() {
        let config = GameConfig::from_json(r#"{ "mode": "stealth" }"#, "test").unwrap();
        assert_eq!(config.mode, GameMode::Stealth);
        assert_eq!("Shooter".parse::<GameMode>().ok(), Some(GameMode::AcornDrop));
        assert_eq!("stealth".parse::<GameMode>().ok(), Some(GameMode::Stealth));
        assert!(matches!(
            "golf".parse::<GameMode>(),
            Err(ConfigError::UnknownMode(name)) if name == "golf"
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = GameConfig::from_json("{ nope", "bad.json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = GameConfig::load_or_default("/definitely/not/here.json");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_level_lookup_clamps() {
        let config = GameConfig::default();
        assert_eq!(config.level(0).hits_to_win, 5);
        assert_eq!(config.level(1).hits_to_win, 8);
        assert_eq!(config.level(7).hits_to_win, 8);

        let empty = GameConfig {
            levels: Vec::new(),
            ..Default::default()
        };
        assert_eq!(empty.level(0), LevelConfig::default());
        assert_eq!(empty.level_count(), 1);
    }
}
