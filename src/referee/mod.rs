//! Match Runner
//!
//! Hosts a single game between bot executables: launches one process per
//! seat, plays the game through the gateway, then reports and logs the
//! ranking.
//!
//! - `config`: Match file (bots, logging, timing)
//! - `bots`: Child processes as a gateway transport

pub mod bots;
pub mod config;

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::core::hash::StateHash;
use crate::core::rng::DeterministicRng;
use crate::game::config::{ConfigError, GameConfig};
use crate::game::engine::{Ranking, Simulation};
use crate::protocol::gateway::{Gateway, GatewayError};

pub use bots::BotPool;
pub use config::{BotSpec, MatchConfig, Settings};

/// Match errors.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Match file unreadable
    #[error("failed to read match config {path}: {source}")]
    ReadConfig {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Match file is not valid JSON for a match
    #[error("invalid match config: {0}")]
    ParseConfig(#[from] serde_json::Error),

    /// Match file content rejected
    #[error("invalid match config: {0}")]
    Invalid(String),

    /// Game settings rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A bot could not be started
    #[error("failed to launch bot '{name}': {source}")]
    Spawn {
        /// Bot name
        name: String,
        /// Underlying error
        source: std::io::Error,
    },

    /// Log files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Game aborted
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Outcome of a match.
#[derive(Debug, Clone)]
pub struct MatchReport {
    /// Seats from winner to first eliminated
    pub ranking: Ranking,
    /// Bot names in seat order
    pub names: Vec<String>,
    /// Spawn seed used
    pub seed: u64,
    /// Digest of the final state
    pub state_hash: StateHash,
}

impl MatchReport {
    /// Bot names from winner to first eliminated.
    pub fn ranked_names(&self) -> Vec<&str> {
        self.ranking
            .iter()
            .filter_map(|id| self.names.get(id.index()).map(String::as_str))
            .collect()
    }

    /// `Ranking = a; b; c`
    pub fn summary(&self) -> String {
        format!("Ranking = {}", self.ranked_names().join("; "))
    }
}

/// Play one game between the configured bots.
///
/// `game` is the file's settings with the environment and command line
/// layered on top; the seat count always comes from the bot list.
/// `fallback_seed` is used when no layer sets a seed.
pub async fn run_match(
    config: &MatchConfig,
    game: &GameConfig,
    fallback_seed: u64,
) -> Result<MatchReport, MatchError> {
    config.validate()?;
    let game = GameConfig { players: config.bots.len(), ..game.clone() };
    let seed = game.seed.unwrap_or(fallback_seed);

    let game_dir = config.game_dir();
    if config.settings.log_stderr || config.settings.log_scores {
        tokio::fs::create_dir_all(&game_dir).await?;
    }

    info!("Refereeing for game : {}", config.game.name);
    info!("Seed: {}", seed);

    let mut rng = DeterministicRng::new(seed);
    let mut sim = Simulation::new(&game, &mut rng)?;

    let stderr_dir = config.settings.log_stderr.then_some(game_dir.as_path());
    let pool = BotPool::launch(&config.bots, stderr_dir)?;
    let names = pool.names();

    let mut gateway = Gateway::new(pool, game.move_timeout);
    let result = gateway.run(&mut sim).await;
    gateway.into_transport().shutdown().await;
    let ranking = result?;

    let report = MatchReport { ranking, names, seed, state_hash: sim.compute_hash() };
    info!("{}", report.summary());

    if config.settings.log_scores {
        tokio::fs::write(game_dir.join("scores.log"), format!("{}\n", report.ranking)).await?;
    }

    Ok(report)
}

// =============================================================================
// TESTS
// =============================================================================
