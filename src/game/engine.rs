//! Authoritative Simulation
//!
//! Turn scheduler, move resolution and ranking. Fully deterministic:
//! the same spawns and the same token sequence always give the same game.
//!
//! ## Turn order
//!
//! Seats are visited round-robin. A dead seat still consumes its slot
//! ([`Turn::Skip`]) but never receives a move request. The game is over
//! as soon as exactly one player is left.

use serde::{Serialize, Deserialize};

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::rng::DeterministicRng;
use crate::game::board::{Board, Coord};
use crate::game::config::{ConfigError, GameConfig};
use crate::game::events::{EliminationCause, GameEvent};
use crate::game::input::{MoveInput, UnknownMovePolicy};
use crate::game::player::{spawn_positions, PlayerId, PlayerState, Position, MAX_PLAYERS};

// =============================================================================
// RANKING
// =============================================================================

/// Final standings, winner first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking(Vec<PlayerId>);

impl Ranking {
    /// Players from winner to first eliminated.
    pub fn as_slice(&self) -> &[PlayerId] {
        &self.0
    }

    /// Iterate in ranked order.
    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.0.iter().copied()
    }

    /// Number of ranked players.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a finished game.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Ranking {
    /// Space separated indices, e.g. `1 0 2`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

// =============================================================================
// PHASE / TURN
// =============================================================================

/// Engine state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting on this seat
    AwaitingMove(PlayerId),
    /// Terminal
    GameOver(Ranking),
}

/// What the current slot requires from the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn<'a> {
    /// Seat is dead; call [`Simulation::skip_turn`]
    Skip(PlayerId),
    /// Seat is alive; request one move
    Move(PlayerId),
    /// Game finished
    Over(&'a Ranking),
}

/// How a move was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// Trail grew onto this cell
    Moved(Coord),
    /// Unrecognized token, player kept its cell
    Stayed,
    /// Player left the game
    Eliminated(EliminationCause),
}

/// Result of resolving one alive turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Seat that moved
    pub player: PlayerId,
    /// What happened
    pub result: MoveResult,
    /// Whether this move ended the game
    pub game_over: bool,
}

/// Read-only view of the players for one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Seat being asked to move
    pub current: PlayerId,
    /// Every seat, in order
    pub players: Vec<PlayerState>,
}

impl Snapshot {
    /// Number of seats.
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

// =============================================================================
// SIMULATION
// =============================================================================

/// Complete state of a game.
#[derive(Clone, Debug)]
pub struct Simulation {
    board: Board,
    players: Vec<PlayerState>,
    phase: Phase,
    /// Seats in the order they died
    eliminated: Vec<PlayerId>,
    unknown_move: UnknownMovePolicy,
    /// Slots processed so far, skipped ones included
    turn: u32,
    pending_events: Vec<GameEvent>,
}

impl Simulation {
    /// Start a game with random distinct spawns.
    pub fn new(config: &GameConfig, rng: &mut DeterministicRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawns = spawn_positions(config.players, rng);
        Self::from_spawns(&spawns, config.unknown_move)
    }

    /// Start a game from explicit spawn cells.
    ///
    /// Accepts one to [`MAX_PLAYERS`] spawns. A single player wins at once.
    pub fn from_spawns(spawns: &[Coord], unknown_move: UnknownMovePolicy) -> Result<Self, ConfigError> {
        if spawns.is_empty() || spawns.len() > MAX_PLAYERS {
            return Err(ConfigError::InvalidPlayerCount { got: spawns.len(), min: 1, max: MAX_PLAYERS });
        }

        let mut board = Board::new();
        let mut players = Vec::with_capacity(spawns.len());
        let mut pending_events = Vec::new();

        for (i, &spawn) in spawns.iter().enumerate() {
            if !board.contains(spawn) {
                return Err(ConfigError::SpawnOutOfBounds(spawn.to_string()));
            }
            if board.is_occupied(spawn) {
                return Err(ConfigError::DuplicateSpawn(spawn.to_string()));
            }

            let id = PlayerId(i as u8);
            board.occupy(spawn, id);
            players.push(PlayerState::new(id, spawn));
            pending_events.push(GameEvent::Spawned { player: id, at: spawn });
        }

        let mut sim = Self {
            board,
            players,
            phase: Phase::AwaitingMove(PlayerId(0)),
            eliminated: Vec::new(),
            unknown_move,
            turn: 0,
            pending_events,
        };

        if sim.players.len() == 1 {
            sim.finish();
        }

        Ok(sim)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// What the current slot needs.
    pub fn turn(&self) -> Turn<'_> {
        match &self.phase {
            Phase::GameOver(ranking) => Turn::Over(ranking),
            Phase::AwaitingMove(id) if self.players[id.index()].alive() => Turn::Move(*id),
            Phase::AwaitingMove(id) => Turn::Skip(*id),
        }
    }

    /// Final ranking, once the game is over.
    pub fn ranking(&self) -> Option<&Ranking> {
        match &self.phase {
            Phase::GameOver(ranking) => Some(ranking),
            Phase::AwaitingMove(_) => None,
        }
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    /// All seats.
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Occupancy grid.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seats in the order they were eliminated.
    pub fn elimination_order(&self) -> &[PlayerId] {
        &self.eliminated
    }

    /// Number of players still riding.
    pub fn alive_count(&self) -> usize {
        self.players.len() - self.eliminated.len()
    }

    /// Slots processed so far.
    pub fn turn_number(&self) -> u32 {
        self.turn
    }

    /// Players as seen by the seat about to move.
    pub fn snapshot(&self) -> Option<Snapshot> {
        match self.phase {
            Phase::AwaitingMove(current) => Some(Snapshot { current, players: self.players.clone() }),
            Phase::GameOver(_) => None,
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Consume the slot of a dead seat. Does nothing on any other turn.
    pub fn skip_turn(&mut self) {
        if let Turn::Skip(_) = self.turn() {
            self.advance();
        }
    }

    /// Resolve a raw token for the seat about to move.
    pub fn apply_token(&mut self, token: &str) -> Option<TurnOutcome> {
        self.apply_move(MoveInput::parse(token))
    }

    /// Resolve a move for the seat about to move.
    ///
    /// Returns `None` when no living seat is waiting.
    pub fn apply_move(&mut self, input: MoveInput) -> Option<TurnOutcome> {
        let Turn::Move(player) = self.turn() else {
            return None;
        };
        let from = self.players[player.index()].position.coord()?;

        let dir = match input {
            MoveInput::Step(dir) => dir,
            MoveInput::Unknown(token) => {
                return Some(match self.unknown_move {
                    UnknownMovePolicy::Stay => {
                        self.pending_events.push(GameEvent::Stayed { turn: self.turn, player, token });
                        self.advance();
                        TurnOutcome { player, result: MoveResult::Stayed, game_over: false }
                    }
                    UnknownMovePolicy::Eliminate => {
                        self.resolve_elimination(player, EliminationCause::ProtocolViolation)
                    }
                });
            }
        };

        let (dx, dy) = dir.delta();
        let to = from.offset(dx, dy);

        if !self.board.contains(to) {
            return Some(self.resolve_elimination(player, EliminationCause::OutOfBounds));
        }
        if self.board.is_occupied(to) {
            return Some(self.resolve_elimination(player, EliminationCause::Collision));
        }

        self.board.occupy(to, player);
        self.players[player.index()].position = Position::Active(to);
        self.pending_events.push(GameEvent::Moved {
            turn: self.turn,
            player,
            token: dir.token().to_string(),
            to,
        });
        self.advance();

        Some(TurnOutcome { player, result: MoveResult::Moved(to), game_over: false })
    }

    /// Eliminate the seat about to move without a move (timeout, disconnect).
    pub fn forfeit(&mut self, cause: EliminationCause) -> Option<TurnOutcome> {
        let Turn::Move(player) = self.turn() else {
            return None;
        };
        Some(self.resolve_elimination(player, cause))
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.turn, |hasher| {
            for player in &self.players {
                player.hash_into(hasher);
            }
            self.board.hash_into(hasher);
            for id in &self.eliminated {
                hasher.update_u8(id.0);
            }
            hasher.update_bool(self.is_over());
        })
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn resolve_elimination(&mut self, player: PlayerId, cause: EliminationCause) -> TurnOutcome {
        let order = self.eliminated.len();
        self.players[player.index()].eliminate(order);
        let cells_freed = self.board.clear_all_owned_by(player);
        self.eliminated.push(player);

        self.pending_events.push(GameEvent::Eliminated {
            turn: self.turn,
            player,
            cause,
            order,
            cells_freed,
            remaining: self.alive_count(),
        });

        let game_over = self.eliminated.len() == self.players.len() - 1;
        if game_over {
            self.turn += 1;
            self.finish();
        } else {
            self.advance();
        }

        TurnOutcome { player, result: MoveResult::Eliminated(cause), game_over }
    }

    fn advance(&mut self) {
        if let Phase::AwaitingMove(current) = self.phase {
            let next = (current.index() + 1) % self.players.len();
            self.phase = Phase::AwaitingMove(PlayerId(next as u8));
            self.turn += 1;
        }
    }

    /// Survivor first, then the dead from last to first eliminated.
    fn finish(&mut self) {
        let mut order = Vec::with_capacity(self.players.len());
        order.extend(self.players.iter().filter(|p| p.alive()).map(|p| p.id));
        order.extend(self.eliminated.iter().rev().copied());

        self.pending_events.push(GameEvent::GameOver { turn: self.turn, ranking: order.clone() });
        self.phase = Phase::GameOver(Ranking(order));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{WIDTH, HEIGHT};
    use crate::game::input::Direction;

    fn sim(spawns: &[(i32, i32)]) -> Simulation {
        let spawns: Vec<Coord> = spawns.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Simulation::from_spawns(&spawns, UnknownMovePolicy::Stay).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let s = sim(&[(0, 0), (5, 5)]);
        assert_eq!(s.phase(), &Phase::AwaitingMove(PlayerId(0)));
        assert_eq!(s.turn(), Turn::Move(PlayerId(0)));
        assert_eq!(s.board().owner(Coord::new(0, 0)), Some(PlayerId(0)));
        assert_eq!(s.board().owner(Coord::new(5, 5)), Some(PlayerId(1)));
        assert_eq!(s.alive_count(), 2);
    }

    #[test]
    fn test_new_uses_config() {
        let config = GameConfig { players: 3, seed: Some(1), ..GameConfig::default() };
        let s = Simulation::new(&config, &mut DeterministicRng::new(1)).unwrap();
        assert_eq!(s.players().len(), 3);

        let bad = GameConfig { players: 5, ..GameConfig::default() };
        assert!(Simulation::new(&bad, &mut DeterministicRng::new(1)).is_err());
    }

    #[test]
    fn test_rejects_bad_spawns() {
        let dup = [Coord::new(1, 1), Coord::new(1, 1)];
        assert!(matches!(
            Simulation::from_spawns(&dup, UnknownMovePolicy::Stay),
            Err(ConfigError::DuplicateSpawn(_))
        ));

        let off = [Coord::new(0, 0), Coord::new(WIDTH as i32, 0)];
        assert!(matches!(
            Simulation::from_spawns(&off, UnknownMovePolicy::Stay),
            Err(ConfigError::SpawnOutOfBounds(_))
        ));

        assert!(Simulation::from_spawns(&[], UnknownMovePolicy::Stay).is_err());
        let five: Vec<Coord> = (0..5).map(|x| Coord::new(x, 0)).collect();
        assert!(Simulation::from_spawns(&five, UnknownMovePolicy::Stay).is_err());
    }

    #[test]
    fn test_single_player_wins_immediately() {
        let s = sim(&[(3, 3)]);
        assert!(s.is_over());
        assert_eq!(s.ranking().unwrap().as_slice(), &[PlayerId(0)]);
        assert_eq!(s.turn(), Turn::Over(s.ranking().unwrap()));
    }

    #[test]
    fn test_move_grows_trail() {
        let mut s = sim(&[(5, 5), (20, 10)]);
        let out = s.apply_token("RIGHT").unwrap();

        assert_eq!(out.result, MoveResult::Moved(Coord::new(6, 5)));
        assert_eq!(s.players()[0].position, Position::Active(Coord::new(6, 5)));
        // Spawn cell stays part of the trail
        assert_eq!(s.board().owner(Coord::new(5, 5)), Some(PlayerId(0)));
        assert_eq!(s.board().owner(Coord::new(6, 5)), Some(PlayerId(0)));
        assert_eq!(s.turn(), Turn::Move(PlayerId(1)));
    }

    #[test]
    fn test_all_directions() {
        let mut s = sim(&[(5, 5), (20, 10)]);
        for (token, expected) in [("UP", (5, 4)), ("DOWN", (20, 11)), ("LEFT", (4, 4)), ("RIGHT", (21, 11))] {
            let out = s.apply_token(token).unwrap();
            assert_eq!(out.result, MoveResult::Moved(Coord::new(expected.0, expected.1)));
        }
    }

    #[test]
    fn test_out_of_bounds_each_edge() {
        let cases = [
            ((0, 5), "LEFT"),
            ((WIDTH as i32 - 1, 5), "RIGHT"),
            ((5, 0), "UP"),
            ((5, HEIGHT as i32 - 1), "DOWN"),
        ];
        for (spawn, token) in cases {
            let mut s = sim(&[spawn, (15, 10)]);
            let out = s.apply_token(token).unwrap();
            assert_eq!(out.result, MoveResult::Eliminated(EliminationCause::OutOfBounds));
            assert!(out.game_over);
        }
    }

    #[test]
    fn test_two_player_left_edge_scenario() {
        let mut s = sim(&[(0, 7), (12, 3)]);
        let out = s.apply_token("LEFT").unwrap();

        assert_eq!(out.player, PlayerId(0));
        assert!(out.game_over);
        assert_eq!(s.ranking().unwrap().to_string(), "1 0");
        assert_eq!(s.players()[0].position, Position::Eliminated);
    }

    #[test]
    fn test_three_player_ranking_reverse_elimination() {
        let mut s = sim(&[(0, 0), (10, 10), (WIDTH as i32 - 1, HEIGHT as i32 - 1)]);

        s.apply_token("DOWN").unwrap(); // p0 -> (0,1)
        s.apply_token("RIGHT").unwrap(); // p1 -> (11,10)
        let out = s.apply_token("RIGHT").unwrap(); // p2 off the right edge
        assert_eq!(out.result, MoveResult::Eliminated(EliminationCause::OutOfBounds));
        assert!(!out.game_over);

        let out = s.apply_token("LEFT").unwrap(); // p0 off the left edge
        assert!(out.game_over);

        assert_eq!(s.elimination_order(), &[PlayerId(2), PlayerId(0)]);
        assert_eq!(s.ranking().unwrap().to_string(), "1 0 2");
        assert_eq!(s.players()[2].death_order, Some(0));
        assert_eq!(s.players()[0].death_order, Some(1));
    }

    #[test]
    fn test_self_collision() {
        let mut s = sim(&[(5, 5), (20, 10), (25, 15)]);
        s.apply_token("RIGHT").unwrap(); // p0 -> (6,5)
        s.apply_token("UP").unwrap();
        s.apply_token("UP").unwrap();

        // Back onto its own spawn
        let out = s.apply_token("LEFT").unwrap();
        assert_eq!(out.result, MoveResult::Eliminated(EliminationCause::Collision));
        assert_eq!(s.board().owned_count(PlayerId(0)), 0);
    }

    #[test]
    fn test_collision_with_other_trail() {
        let mut s = sim(&[(5, 5), (6, 5), (25, 15)]);
        let out = s.apply_token("RIGHT").unwrap();
        assert_eq!(out.result, MoveResult::Eliminated(EliminationCause::Collision));
        // Victim's cells freed, other trail untouched
        assert!(!s.board().is_occupied(Coord::new(5, 5)));
        assert_eq!(s.board().owner(Coord::new(6, 5)), Some(PlayerId(1)));
    }

    #[test]
    fn test_cleared_trail_is_passable() {
        let mut s = sim(&[(0, 5), (1, 6), (20, 15)]);

        // p0 dies off the edge, freeing (0,5)
        s.apply_token("LEFT").unwrap();
        assert!(!s.board().is_occupied(Coord::new(0, 5)));

        s.apply_token("LEFT").unwrap(); // p1 -> (0,6)
        s.apply_token("UP").unwrap(); // p2 -> (20,14)
        assert_eq!(s.turn(), Turn::Skip(PlayerId(0)));
        s.skip_turn();

        let out = s.apply_token("UP").unwrap(); // p1 onto the freed cell
        assert_eq!(out.result, MoveResult::Moved(Coord::new(0, 5)));
    }

    #[test]
    fn test_dead_seat_is_skipped() {
        let mut s = sim(&[(0, 0), (10, 10), (20, 10)]);
        s.apply_token("UP").unwrap(); // p0 dies
        s.apply_token("DOWN").unwrap();
        s.apply_token("DOWN").unwrap();

        assert_eq!(s.turn(), Turn::Skip(PlayerId(0)));
        assert!(s.apply_token("DOWN").is_none());
        assert!(s.forfeit(EliminationCause::Timeout).is_none());

        let before = s.turn_number();
        s.skip_turn();
        assert_eq!(s.turn_number(), before + 1);
        assert_eq!(s.turn(), Turn::Move(PlayerId(1)));

        // Skip on a living seat is a no-op
        s.skip_turn();
        assert_eq!(s.turn(), Turn::Move(PlayerId(1)));
    }

    #[test]
    fn test_unknown_token_stays() {
        let mut s = sim(&[(5, 5), (10, 10)]);
        let out = s.apply_token("JUMP").unwrap();

        assert_eq!(out.result, MoveResult::Stayed);
        assert_eq!(s.players()[0].position, Position::Active(Coord::new(5, 5)));
        assert_eq!(s.turn(), Turn::Move(PlayerId(1)));
        assert_eq!(s.board().owned_count(PlayerId(0)), 1);
    }

    #[test]
    fn test_unknown_token_eliminates_under_strict_policy() {
        let spawns = [Coord::new(5, 5), Coord::new(10, 10)];
        let mut s = Simulation::from_spawns(&spawns, UnknownMovePolicy::Eliminate).unwrap();
        let out = s.apply_token("left").unwrap();

        assert_eq!(out.result, MoveResult::Eliminated(EliminationCause::ProtocolViolation));
        assert_eq!(s.ranking().unwrap().to_string(), "1 0");
    }

    #[test]
    fn test_forfeit() {
        let mut s = sim(&[(5, 5), (10, 10), (15, 15)]);
        let out = s.forfeit(EliminationCause::Timeout).unwrap();
        assert_eq!(out.result, MoveResult::Eliminated(EliminationCause::Timeout));
        assert_eq!(s.turn(), Turn::Move(PlayerId(1)));
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let mut s = sim(&[(0, 0), (10, 10)]);
        s.apply_token("LEFT").unwrap();
        assert!(s.apply_token("RIGHT").is_none());
        assert!(s.snapshot().is_none());
        s.skip_turn();
        assert!(s.is_over());
    }

    #[test]
    fn test_snapshot() {
        let mut s = sim(&[(3, 4), (10, 11)]);
        s.apply_token("DOWN").unwrap();
        let snap = s.snapshot().unwrap();

        assert_eq!(snap.current, PlayerId(1));
        assert_eq!(snap.player_count(), 2);
        assert_eq!(snap.players[0].spawn, Coord::new(3, 4));
        assert_eq!(snap.players[0].position, Position::Active(Coord::new(3, 5)));
    }

    #[test]
    fn test_events() {
        let mut s = sim(&[(0, 0), (10, 10)]);
        let spawned = s.take_events();
        assert_eq!(spawned.len(), 2);
        assert!(matches!(spawned[0], GameEvent::Spawned { player: PlayerId(0), .. }));

        s.apply_token("NOPE").unwrap();
        s.apply_token("UP").unwrap();
        s.apply_token("UP").unwrap();

        let events = s.take_events();
        assert!(matches!(events[0], GameEvent::Stayed { .. }));
        assert!(matches!(events[1], GameEvent::Moved { player: PlayerId(1), .. }));
        assert!(matches!(
            events[2],
            GameEvent::Eliminated { player: PlayerId(0), cause: EliminationCause::OutOfBounds, order: 0, cells_freed: 1, remaining: 1, .. }
        ));
        assert!(matches!(&events[3], GameEvent::GameOver { ranking, .. } if ranking == &vec![PlayerId(1), PlayerId(0)]));
        assert!(s.take_events().is_empty());
    }

    #[test]
    fn test_hash_reproducible() {
        let run = || {
            let config = GameConfig { players: 4, ..GameConfig::default() };
            let mut s = Simulation::new(&config, &mut DeterministicRng::new(2024)).unwrap();
            for dir in Direction::ALL.iter().cycle().take(12) {
                match s.turn() {
                    Turn::Move(_) => {
                        s.apply_token(dir.token());
                    }
                    Turn::Skip(_) => s.skip_turn(),
                    Turn::Over(_) => break,
                }
            }
            s.compute_hash()
        };
        assert_eq!(run(), run());

        let a = sim(&[(0, 0), (1, 1)]).compute_hash();
        let b = sim(&[(0, 0), (1, 2)]).compute_hash();
        assert_ne!(a, b);
    }
}
