//! Protocol Gateway
//!
//! Drives a [`Simulation`] against a [`Transport`]: emits one frame per
//! turn slot, waits for one move per living seat and reports the ranking.
//! The wait is bounded by an optional per-turn deadline; a seat that
//! misses it is eliminated for timeout.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::game::engine::{Ranking, Simulation, Snapshot, Turn};
use crate::game::events::{EliminationCause, GameEvent};
use crate::game::player::PlayerId;

/// Gateway errors. These abort the game.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Reading or writing a channel failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended while a move was required
    #[error("input closed while waiting for a move from player {0}")]
    InputClosed(PlayerId),
}

/// Answer to a move request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveReply {
    /// Raw token, classified by the engine
    Token(String),
    /// The player's channel is gone; the seat forfeits
    Disconnected,
}

/// Channel between the gateway and the players.
///
/// `recv_move` must be cancel-safe: it is raced against the turn deadline.
/// When it loses, `discard_pending` is called before the next seat is asked.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Announce that a dead seat's slot was consumed.
    async fn send_skip(&mut self, player: PlayerId) -> Result<(), GatewayError>;

    /// Send the turn frame to the seat about to move.
    async fn send_turn(&mut self, snapshot: &Snapshot) -> Result<(), GatewayError>;

    /// Wait for that seat's move.
    async fn recv_move(&mut self, player: PlayerId) -> Result<MoveReply, GatewayError>;

    /// Publish the final ranking.
    async fn send_ranking(&mut self, ranking: &Ranking) -> Result<(), GatewayError>;

    /// `player` missed its deadline; its reply, if one ever comes, must not
    /// be read as another seat's move. Nothing to do when every seat has its
    /// own channel.
    async fn discard_pending(&mut self, _player: PlayerId) {}
}

/// Turn loop over a transport.
pub struct Gateway<T> {
    transport: T,
    move_timeout: Option<Duration>,
}

impl<T: Transport> Gateway<T> {
    /// Create a gateway. `None` waits for moves forever.
    pub fn new(transport: T, move_timeout: Option<Duration>) -> Self {
        Self { transport, move_timeout }
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Play the game to the end and return the ranking.
    pub async fn run(&mut self, sim: &mut Simulation) -> Result<Ranking, GatewayError> {
        log_events(sim.take_events());

        loop {
            match sim.turn() {
                Turn::Over(ranking) => {
                    let ranking = ranking.clone();
                    self.transport.send_ranking(&ranking).await?;
                    info!("Ranking : {}", ranking);
                    info!("Final state hash: {}", hex::encode(sim.compute_hash()));
                    return Ok(ranking);
                }
                Turn::Skip(player) => {
                    info!("Current player : {} (eliminated, skipping)", player);
                    self.transport.send_skip(player).await?;
                    sim.skip_turn();
                }
                Turn::Move(player) => {
                    info!("Current player : {}", player);
                    self.play_turn(sim, player).await?;
                }
            }

            log_events(sim.take_events());
        }
    }

    async fn play_turn(&mut self, sim: &mut Simulation, player: PlayerId) -> Result<(), GatewayError> {
        let Some(snapshot) = sim.snapshot() else {
            return Ok(());
        };
        self.transport.send_turn(&snapshot).await?;

        let reply = match self.move_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.transport.recv_move(player)).await {
                Ok(reply) => reply?,
                Err(_) => {
                    warn!("Player {} sent no move within {:?}", player, limit);
                    self.transport.discard_pending(player).await;
                    sim.forfeit(EliminationCause::Timeout);
                    return Ok(());
                }
            },
            None => self.transport.recv_move(player).await?,
        };

        match reply {
            MoveReply::Token(token) => {
                sim.apply_token(&token);
            }
            MoveReply::Disconnected => {
                warn!("Player {} disconnected", player);
                sim.forfeit(EliminationCause::Disconnected);
            }
        }

        Ok(())
    }
}

/// Diagnostics for engine events.
fn log_events(events: Vec<GameEvent>) {
    for event in events {
        match event {
            GameEvent::Spawned { player, at } => {
                info!("Initial position for player {} : {} {}", player, at.x, at.y);
            }
            GameEvent::Moved { player, token, to, .. } => {
                info!("Player {} moving : {} -> {}", player, token, to);
            }
            GameEvent::Stayed { player, token, .. } => {
                warn!("Player {} sent unknown move {:?}, staying in place", player, token);
            }
            GameEvent::Eliminated { turn, player, cause, cells_freed, remaining, .. } => {
                info!(
                    turn,
                    cells_freed,
                    "Player {} dies ({}) ! {} players still alive.",
                    player, cause, remaining
                );
            }
            GameEvent::GameOver { turn, .. } => {
                info!(turn, "Only one player alive, end of the game");
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::game::board::Coord;
    use crate::game::input::UnknownMovePolicy;
    use crate::protocol::codec;

    /// Scripted transport that records every exchange.
    #[derive(Default)]
    struct Scripted {
        replies: VecDeque<MoveReply>,
        log: Vec<String>,
        asked: Vec<PlayerId>,
        discarded: Vec<PlayerId>,
    }

    impl Scripted {
        fn with_tokens(tokens: &[&str]) -> Self {
            Self {
                replies: tokens.iter().map(|t| MoveReply::Token(t.to_string())).collect(),
                ..Self::default()
            }
        }
    }

    impl Transport for Scripted {
        async fn send_skip(&mut self, player: PlayerId) -> Result<(), GatewayError> {
            self.log.push(format!("skip {}", player));
            Ok(())
        }

        async fn send_turn(&mut self, snapshot: &Snapshot) -> Result<(), GatewayError> {
            self.log.push(codec::encode_turn(snapshot));
            Ok(())
        }

        async fn recv_move(&mut self, player: PlayerId) -> Result<MoveReply, GatewayError> {
            self.asked.push(player);
            match self.replies.pop_front() {
                Some(reply) => Ok(reply),
                None => std::future::pending().await,
            }
        }

        async fn send_ranking(&mut self, ranking: &Ranking) -> Result<(), GatewayError> {
            self.log.push(format!("ranking {}", ranking));
            Ok(())
        }

        async fn discard_pending(&mut self, player: PlayerId) {
            self.discarded.push(player);
        }
    }

    fn sim(spawns: &[(i32, i32)]) -> Simulation {
        let spawns: Vec<Coord> = spawns.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Simulation::from_spawns(&spawns, UnknownMovePolicy::Stay).unwrap()
    }

    #[tokio::test]
    async fn test_dead_players_are_never_asked() {
        let mut s = sim(&[(0, 0), (10, 10), (20, 10)]);
        // p0 dies, p1 and p2 move, p0 skipped, p1 moves, p2 dies
        let transport = Scripted::with_tokens(&["UP", "DOWN", "DOWN", "DOWN", "NOPE", "RIGHT", "UP"]);
        let mut gateway = Gateway::new(transport, None);

        let ranking = gateway.run(&mut s).await.unwrap();
        let t = gateway.into_transport();

        assert!(!t.asked[1..].contains(&PlayerId(0)));
        assert_eq!(t.asked[..4], [PlayerId(0), PlayerId(1), PlayerId(2), PlayerId(1)]);
        assert!(t.log.contains(&"skip 0".to_string()));
        assert_eq!(t.log.last().unwrap(), &format!("ranking {}", ranking));
    }

    #[tokio::test]
    async fn test_timeout_eliminates() {
        let mut s = sim(&[(5, 5), (10, 10)]);
        let mut gateway = Gateway::new(Scripted::default(), Some(Duration::from_millis(20)));

        let ranking = gateway.run(&mut s).await.unwrap();
        assert_eq!(ranking.to_string(), "1 0");
        assert_eq!(gateway.transport().asked, vec![PlayerId(0)]);
        assert_eq!(gateway.transport().discarded, vec![PlayerId(0)]);
    }

    #[tokio::test]
    async fn test_disconnect_forfeits() {
        let mut s = sim(&[(5, 5), (10, 10), (15, 15)]);
        let transport = Scripted {
            replies: VecDeque::from(vec![
                MoveReply::Token("UP".into()),
                MoveReply::Disconnected,
                MoveReply::Token("UP".into()),
                MoveReply::Disconnected,
            ]),
            ..Scripted::default()
        };
        let mut gateway = Gateway::new(transport, None);

        let ranking = gateway.run(&mut s).await.unwrap();
        assert_eq!(ranking.to_string(), "2 0 1");
        assert!(gateway.transport().discarded.is_empty());
    }
}
