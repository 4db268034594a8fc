//! State Hashing for Verification
//!
//! Deterministic digest of a game so a seeded replay can be checked
//! against the original run.

use sha2::{Sha256, Digest};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for game state.
///
/// Wraps SHA-256. Order of updates is part of the digest.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for game state.
    pub fn for_game_state() -> Self {
        Self::new(b"TRON_REFEREE_STATE_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a game state hash.
///
/// The turn counter goes in first, then whatever `add_state` feeds.
pub fn compute_state_hash<F>(turn: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_game_state();
    hasher.update_u32(turn);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = compute_state_hash(3, |h| h.update_i32(-1));
        let b = compute_state_hash(3, |h| h.update_i32(-1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_sensitive_to_turn() {
        let a = compute_state_hash(3, |h| h.update_bool(true));
        let b = compute_state_hash(4, |h| h.update_bool(true));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_sensitive_to_order() {
        let a = compute_state_hash(0, |h| {
            h.update_u8(1);
            h.update_u8(2);
        });
        let b = compute_state_hash(0, |h| {
            h.update_u8(2);
            h.update_u8(1);
        });
        assert_ne!(a, b);
    }
}
