//! Engine configuration, read from an optional JSON file.
//!
//! Every field has a default, so `{}` is a complete config. Command-line
//! flags override whatever the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::GAME_MILLIS;
use crate::scoring::PointSystem;
use crate::selector::{DEFAULT_BUDGET_DIVISIONS, DEFAULT_DEPTH_LIMIT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Random plies per rollout; 0 scores the grid as it stands.
    #[serde(default = "default_depth_limit")]
    pub depth_limit: usize,
    /// How many times the remaining time is split across the open cells.
    #[serde(default = "default_budget_divisions")]
    pub budget_divisions: u32,
    #[serde(default = "default_game_millis")]
    pub game_millis: u64,
    #[serde(default = "default_table_path")]
    pub table_path: PathBuf,
    #[serde(default)]
    pub point_system: PointSystem,
    /// Fixed RNG seed; drawn from entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_depth_limit() -> usize {
    DEFAULT_DEPTH_LIMIT
}

fn default_budget_divisions() -> u32 {
    DEFAULT_BUDGET_DIVISIONS
}

fn default_game_millis() -> u64 {
    GAME_MILLIS
}

fn default_table_path() -> PathBuf {
    PathBuf::from("heuristic.json")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth_limit: default_depth_limit(),
            budget_divisions: default_budget_divisions(),
            game_millis: default_game_millis(),
            table_path: default_table_path(),
            point_system: PointSystem::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn game_time(&self) -> Duration {
        Duration::from_millis(self.game_millis)
    }

    /// The configured seed, or a fresh one from the OS.
    pub fn seed_or_entropy(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
