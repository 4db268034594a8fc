//! Match Configuration
//!
//! JSON file describing the bots of a match and how to log it. Keys are
//! snake_case; the capitalized keys of older harness files are accepted
//! as aliases.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::game::config::{timeout_from_millis, validate_player_count, GameConfig};
use crate::referee::MatchError;

/// Whole match file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Game identity
    #[serde(alias = "Game")]
    pub game: GameSection,

    /// Competitors, in seat order
    #[serde(alias = "Bots")]
    pub bots: Vec<BotSpec>,

    /// Logging and timing
    #[serde(default, alias = "Settings")]
    pub settings: Settings,
}

/// Game identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSection {
    /// Used for the log directory
    #[serde(alias = "Name")]
    pub name: String,
}

/// How to launch one bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSpec {
    /// Display name
    #[serde(alias = "Name")]
    pub name: String,

    /// Executable
    #[serde(alias = "Bin")]
    pub bin: PathBuf,

    /// Command line arguments
    #[serde(default, alias = "Arguments")]
    pub arguments: Vec<String>,
}

/// Match settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Write each bot's stderr to `<runs_dir>/<game>/<bot>.err`
    #[serde(default, alias = "Log stderr")]
    pub log_stderr: bool,

    /// Write the ranking to `<runs_dir>/<game>/scores.log`, replacing the
    /// previous run's log
    #[serde(default, alias = "Log scores")]
    pub log_scores: bool,

    /// Per-turn deadline; 0 disables it
    #[serde(default)]
    pub move_timeout_ms: Option<u64>,

    /// Spawn seed
    #[serde(default)]
    pub seed: Option<u64>,

    /// Root of the log directories
    #[serde(default = "default_runs_dir")]
    pub runs_dir: PathBuf,
}

fn default_runs_dir() -> PathBuf {
    PathBuf::from("runs")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_stderr: false,
            log_scores: false,
            move_timeout_ms: None,
            seed: None,
            runs_dir: default_runs_dir(),
        }
    }
}

impl MatchConfig {
    /// Read and validate a match file.
    pub fn load(path: &Path) -> Result<Self, MatchError> {
        let text = std::fs::read_to_string(path).map_err(|source| MatchError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate match JSON.
    pub fn from_json(text: &str) -> Result<Self, MatchError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check bot count, names and game name.
    pub fn validate(&self) -> Result<(), MatchError> {
        validate_player_count(self.bots.len())?;

        if self.game.name.trim().is_empty() {
            return Err(MatchError::Invalid("game name is empty".into()));
        }
        for (i, bot) in self.bots.iter().enumerate() {
            if bot.name.trim().is_empty() {
                return Err(MatchError::Invalid(format!("bot {} has an empty name", i)));
            }
            if self.bots[..i].iter().any(|b| b.name == bot.name) {
                return Err(MatchError::Invalid(format!("bot name '{}' is used twice", bot.name)));
            }
        }
        Ok(())
    }

    /// Directory holding this game's logs.
    pub fn game_dir(&self) -> PathBuf {
        self.settings.runs_dir.join(&self.game.name)
    }

    /// Game settings from the file over the defaults. The environment and
    /// command line are layered on top by the caller.
    pub fn game_config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig {
            players: self.bots.len(),
            seed: self.settings.seed,
            move_timeout: self.settings.move_timeout_ms.map_or(defaults.move_timeout, timeout_from_millis),
            ..defaults
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
