//! # Tron Referee
//!
//! Authoritative referee for turn-based light-cycle games between up to
//! four bots on a 30 × 20 grid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TRON REFEREE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── board.rs    - Occupancy grid                            │
//! │  ├── player.rs   - Player state, spawn placement             │
//! │  ├── input.rs    - Move tokens                               │
//! │  ├── engine.rs   - Turn scheduler, collisions, ranking       │
//! │  ├── events.rs   - Engine events                             │
//! │  └── config.rs   - Game configuration                        │
//! │                                                              │
//! │  protocol/       - Player I/O (non-deterministic)            │
//! │  ├── codec.rs    - Text frames                               │
//! │  ├── gateway.rs  - Turn loop with move deadline              │
//! │  └── stream.rs   - Framed protocol over stdin/stdout         │
//! │                                                              │
//! │  referee/        - Bot processes, match file, score log      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! `core/` and `game/` do no I/O and read no clock. Given the same seed
//! and the same move tokens, a game replays identically.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod protocol;
pub mod referee;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use game::board::{Board, Coord, WIDTH, HEIGHT};
pub use game::engine::{Simulation, Ranking, Turn};
pub use game::player::{PlayerId, PlayerState, MAX_PLAYERS};
pub use game::config::GameConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
