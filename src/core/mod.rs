//! Core deterministic primitives.
//!
//! Everything the engine needs to reproduce a game from its seed.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
