//! Move Input
//!
//! Parsing of move tokens and the policy for tokens that are not moves.

use std::str::FromStr;

use serde::{Serialize, Deserialize};

/// One of the four unit moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// x + 1
    Right,
    /// x - 1
    Left,
    /// y - 1
    Up,
    /// y + 1
    Down,
}

impl Direction {
    /// All directions, in token order.
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Left, Direction::Up, Direction::Down];

    /// Parse a wire token. Matching is exact and case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "RIGHT" => Some(Direction::Right),
            "LEFT" => Some(Direction::Left),
            "UP" => Some(Direction::Up),
            "DOWN" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Wire token for this direction.
    pub fn token(self) -> &'static str {
        match self {
            Direction::Right => "RIGHT",
            Direction::Left => "LEFT",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }

    /// Unit delta `(dx, dy)`. Rows grow downwards.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

/// A token read from a player, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveInput {
    /// A recognized move
    Step(Direction),
    /// Anything else, kept verbatim for diagnostics
    Unknown(String),
}

impl MoveInput {
    /// Classify a raw token.
    pub fn parse(token: &str) -> Self {
        match Direction::from_token(token) {
            Some(dir) => MoveInput::Step(dir),
            None => MoveInput::Unknown(token.to_string()),
        }
    }
}

/// What happens when a player sends a token that is not a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownMovePolicy {
    /// Keep the player where it is; the turn passes without a collision check
    #[default]
    Stay,
    /// Eliminate the player for a protocol violation
    Eliminate,
}

impl FromStr for UnknownMovePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stay" => Ok(UnknownMovePolicy::Stay),
            "eliminate" => Ok(UnknownMovePolicy::Eliminate),
            other => Err(format!("unknown move policy '{}' (expected stay or eliminate)", other)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
