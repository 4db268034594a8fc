//! Game Configuration
//!
//! Defaults, environment overlay and validation for a single game.

use std::time::Duration;

use thiserror::Error;

use crate::game::input::UnknownMovePolicy;
use crate::game::player::MAX_PLAYERS;

/// Fewest players a game can be started with from the command line.
pub const MIN_PLAYERS: usize = 2;

/// Per-turn deadline when nothing else sets one.
pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Player count outside the supported range
    #[error("invalid argument: player count must be between {min} and {max}, got {got}")]
    InvalidPlayerCount {
        /// Requested count
        got: usize,
        /// Lower bound
        min: usize,
        /// Upper bound
        max: usize,
    },

    /// Spawn cell off the board
    #[error("invalid argument: spawn {0} is off the board")]
    SpawnOutOfBounds(String),

    /// Two players share a spawn cell
    #[error("invalid argument: spawn {0} is used twice")]
    DuplicateSpawn(String),

    /// Environment variable present but unparsable
    #[error("invalid argument: {var}={value}: {reason}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Configuration for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of players
    pub players: usize,
    /// Spawn seed; drawn from the clock when absent
    pub seed: Option<u64>,
    /// Handling of tokens that are not moves
    pub unknown_move: UnknownMovePolicy,
    /// Per-turn deadline; `None` waits forever
    pub move_timeout: Option<Duration>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: MIN_PLAYERS,
            seed: None,
            unknown_move: UnknownMovePolicy::Stay,
            move_timeout: Some(DEFAULT_MOVE_TIMEOUT),
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `TRON_SEED`, `TRON_MOVE_TIMEOUT_MS` and
    /// `TRON_UNKNOWN_MOVE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// Same as [`GameConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Self::default().with_lookup(lookup)
    }

    /// Overlay the `TRON_*` variables on this configuration.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_lookup(|var| std::env::var(var).ok())
    }

    /// Overlay variables from `lookup`; unset ones keep their current value.
    pub fn with_lookup<F>(self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = self;

        if let Some(raw) = lookup("TRON_SEED") {
            config.seed = Some(raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv { var: "TRON_SEED", value: raw.clone(), reason: e.to_string() }
            })?);
        }

        if let Some(raw) = lookup("TRON_MOVE_TIMEOUT_MS") {
            let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv { var: "TRON_MOVE_TIMEOUT_MS", value: raw.clone(), reason: e.to_string() }
            })?;
            config.move_timeout = timeout_from_millis(ms);
        }

        if let Some(raw) = lookup("TRON_UNKNOWN_MOVE") {
            config.unknown_move = raw.parse().map_err(|reason| {
                ConfigError::InvalidEnv { var: "TRON_UNKNOWN_MOVE", value: raw.clone(), reason }
            })?;
        }

        Ok(config)
    }

    /// Check the player count against the supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_player_count(self.players)
    }
}

/// `0` disables the deadline.
pub fn timeout_from_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Reject counts outside `MIN_PLAYERS..=MAX_PLAYERS`.
pub fn validate_player_count(players: usize) -> Result<(), ConfigError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPlayerCount { got: players, min: MIN_PLAYERS, max: MAX_PLAYERS })
    }
}

// =============================================================================
// TESTS
// =============================================================================
