//! Wire Format
//!
//! Line-oriented text frames exchanged with players.
//!
//! ```text
//! 0                     current player is dead, nothing follows
//! 1+N                   number of lines that follow
//! N current             player count and the seat being asked
//! x0 y0 x y             one line per seat, -1 -1 -1 -1 when dead
//! ...
//! -1                    game over
//! 1 0 2                 ranking, winner first
//! ```

use std::fmt::Write as _;

use crate::game::engine::{Ranking, Snapshot};
use crate::game::player::{PlayerState, Position};

/// Line sent for a dead seat.
pub const DEAD_PLAYER_LINE: &str = "-1 -1 -1 -1";

/// Frame code for a dead seat's turn.
pub const SKIP_CODE: i32 = 0;

/// Frame code announcing the ranking.
pub const GAME_OVER_CODE: i32 = -1;

/// Frame for a dead seat's slot.
pub fn encode_skip() -> String {
    format!("{}\n", SKIP_CODE)
}

/// The lines a player consumes: `N current` then one line per seat.
pub fn encode_player_lines(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "{} {}", snapshot.player_count(), snapshot.current);
    for player in &snapshot.players {
        let _ = writeln!(out, "{}", player_line(player));
    }
    out
}

/// Full frame for a living seat: line count, then the player lines.
pub fn encode_turn(snapshot: &Snapshot) -> String {
    let mut out = format!("{}\n", 1 + snapshot.player_count());
    out.push_str(&encode_player_lines(snapshot));
    out
}

/// End of game marker followed by the ranking line.
pub fn encode_ranking(ranking: &Ranking) -> String {
    format!("{}\n{}\n", GAME_OVER_CODE, ranking)
}

fn player_line(player: &PlayerState) -> String {
    match player.position {
        Position::Active(at) => format!("{} {} {} {}", player.spawn.x, player.spawn.y, at.x, at.y),
        Position::Eliminated => DEAD_PLAYER_LINE.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
