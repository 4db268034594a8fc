//! Game Events
//!
//! Events recorded by the engine while resolving turns. The gateway drains
//! them after every turn and turns them into diagnostics.

use serde::{Serialize, Deserialize};

use crate::game::board::Coord;
use crate::game::player::PlayerId;

/// Why a player left the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    /// Moved off the board
    OutOfBounds,
    /// Moved onto an occupied cell
    Collision,
    /// Sent a token that is not a move (strict policy only)
    ProtocolViolation,
    /// No move within the per-turn deadline
    Timeout,
    /// Player's channel closed
    Disconnected,
}

impl std::fmt::Display for EliminationCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EliminationCause::OutOfBounds => "out of bounds",
            EliminationCause::Collision => "collision",
            EliminationCause::ProtocolViolation => "protocol violation",
            EliminationCause::Timeout => "timeout",
            EliminationCause::Disconnected => "disconnected",
        };
        f.write_str(text)
    }
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player placed on its spawn cell
    Spawned {
        player: PlayerId,
        at: Coord,
    },

    /// Player moved one cell
    Moved {
        turn: u32,
        player: PlayerId,
        token: String,
        to: Coord,
    },

    /// Player sent an unrecognized token and stayed put
    Stayed {
        turn: u32,
        player: PlayerId,
        token: String,
    },

    /// Player was eliminated
    Eliminated {
        turn: u32,
        player: PlayerId,
        cause: EliminationCause,
        order: usize,
        cells_freed: usize,
        remaining: usize,
    },

    /// Game ended
    GameOver {
        turn: u32,
        ranking: Vec<PlayerId>,
    },
}

impl GameEvent {
    /// Player involved, if any.
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::Spawned { player, .. }
            | GameEvent::Moved { player, .. }
            | GameEvent::Stayed { player, .. }
            | GameEvent::Eliminated { player, .. } => Some(*player),
            GameEvent::GameOver { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_player() {
        let ev = GameEvent::Stayed { turn: 1, player: PlayerId(2), token: "X".into() };
        assert_eq!(ev.player(), Some(PlayerId(2)));

        let over = GameEvent::GameOver { turn: 9, ranking: vec![PlayerId(1), PlayerId(0)] };
        assert_eq!(over.player(), None);
    }

    #[test]
    fn test_cause_display() {
        assert_eq!(EliminationCause::OutOfBounds.to_string(), "out of bounds");
        assert_eq!(EliminationCause::Timeout.to_string(), "timeout");
    }
}
