//! Game Logic Module
//!
//! All simulation code. 100% deterministic, no I/O.
//!
//! ## Module Structure
//!
//! - `board`: Occupancy grid and coordinates
//! - `player`: Player state and spawn placement
//! - `input`: Move tokens and the unknown-token policy
//! - `engine`: Turn scheduler, collisions, ranking
//! - `events`: Events recorded while resolving turns
//! - `config`: Game configuration and validation

pub mod board;
pub mod player;
pub mod input;
pub mod engine;
pub mod events;
pub mod config;

// Re-export key types
pub use board::{Board, Coord, WIDTH, HEIGHT};
pub use player::{PlayerId, PlayerState, Position, MAX_PLAYERS};
pub use input::{Direction, MoveInput, UnknownMovePolicy};
pub use engine::{Simulation, Phase, Turn, TurnOutcome, MoveResult, Ranking, Snapshot};
pub use events::{GameEvent, EliminationCause};
pub use config::{GameConfig, ConfigError};
