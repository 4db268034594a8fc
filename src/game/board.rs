//! Occupancy Grid
//!
//! Fixed-size board recording which player's trail owns each cell.
//! Bounds are the engine's concern: `occupy` and `is_occupied` expect
//! in-bounds coordinates, use [`Board::contains`] first.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::game::player::PlayerId;

/// Board width in cells.
pub const WIDTH: usize = 30;

/// Board height in cells.
pub const HEIGHT: usize = 20;

/// A cell coordinate.
///
/// Signed so a destination one step past the edge is representable
/// before it is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Column, 0 at the left edge
    pub x: i32,
    /// Row, 0 at the top edge
    pub y: i32,
}

impl Coord {
    /// Create a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Coordinate shifted by a delta.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Grid of cell owners, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Option<PlayerId>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self { cells: vec![None; WIDTH * HEIGHT] }
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Check whether a coordinate lies on the board.
    #[inline]
    pub fn contains(&self, at: Coord) -> bool {
        at.x >= 0 && (at.x as usize) < WIDTH && at.y >= 0 && (at.y as usize) < HEIGHT
    }

    #[inline]
    fn index(&self, at: Coord) -> usize {
        debug_assert!(self.contains(at), "cell {} is off the board", at);
        at.y as usize * WIDTH + at.x as usize
    }

    /// Mark a cell as owned by `player`.
    pub fn occupy(&mut self, at: Coord, player: PlayerId) {
        let idx = self.index(at);
        self.cells[idx] = Some(player);
    }

    /// Check whether any trail owns the cell.
    #[inline]
    pub fn is_occupied(&self, at: Coord) -> bool {
        self.owner(at).is_some()
    }

    /// Owner of a cell, if any.
    #[inline]
    pub fn owner(&self, at: Coord) -> Option<PlayerId> {
        self.cells[self.index(at)]
    }

    /// Free every cell owned by `player`, returning how many were freed.
    pub fn clear_all_owned_by(&mut self, player: PlayerId) -> usize {
        let mut freed = 0;
        for cell in self.cells.iter_mut().filter(|c| **c == Some(player)) {
            *cell = None;
            freed += 1;
        }
        freed
    }

    /// Number of cells owned by `player`.
    pub fn owned_count(&self, player: PlayerId) -> usize {
        self.cells.iter().filter(|c| **c == Some(player)).count()
    }

    /// Hash every cell in row-major order.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for cell in &self.cells {
            match cell {
                Some(id) => hasher.update_u8(id.0 + 1),
                None => hasher.update_u8(0),
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
