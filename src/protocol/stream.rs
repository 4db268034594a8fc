//! Stream Transport
//!
//! Full framed protocol over a byte stream pair: frames out, whitespace
//! separated tokens in. Used with stdin/stdout when an outer harness
//! multiplexes the players.
//!
//! All seats share one input, so a token cannot say who sent it. The
//! harness relays exactly one reply per turn frame, in order. A reply that
//! misses its deadline is dropped when it shows up, whether it is already
//! queued or still on its way.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::game::engine::{Ranking, Snapshot};
use crate::game::player::PlayerId;
use crate::protocol::codec;
use crate::protocol::gateway::{GatewayError, MoveReply, Transport};

/// Tokens buffered ahead of the engine.
const TOKEN_BUFFER: usize = 64;

/// Forward every whitespace-separated token of `reader` to a channel.
///
/// The channel closes at end of input. Reading happens on its own task so
/// a pending receive can be dropped without losing data.
pub fn spawn_token_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(TOKEN_BUFFER);
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    for token in line.split_whitespace() {
                        if tx.send(token.to_string()).await.is_err() {
                            return;
                        }
                    }
                }
                Ok(None) => return,
                Err(e) => {
                    warn!("Input read failed: {}", e);
                    return;
                }
            }
        }
    });
    rx
}

/// Framed protocol over a reader/writer pair.
pub struct StreamTransport<W> {
    tokens: mpsc::Receiver<String>,
    writer: W,
    /// Replies still owed by timed-out seats
    stale: usize,
}

impl<W: AsyncWrite + Unpin> StreamTransport<W> {
    /// Start reading tokens from `reader`; frames go to `writer`.
    pub fn new<R>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self { tokens: spawn_token_reader(reader), writer, stale: 0 }
    }

    /// Give the writer back.
    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_frame(&mut self, frame: &str) -> Result<(), GatewayError> {
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin> Transport for StreamTransport<W> {
    async fn send_skip(&mut self, _player: PlayerId) -> Result<(), GatewayError> {
        self.write_frame(&codec::encode_skip()).await
    }

    async fn send_turn(&mut self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        self.write_frame(&codec::encode_turn(snapshot)).await
    }

    async fn recv_move(&mut self, player: PlayerId) -> Result<MoveReply, GatewayError> {
        loop {
            let token = self.tokens.recv().await.ok_or(GatewayError::InputClosed(player))?;
            if self.stale == 0 {
                return Ok(MoveReply::Token(token));
            }
            self.stale -= 1;
            warn!("Dropping late move {:?} (player {} was waiting)", token, player);
        }
    }

    async fn send_ranking(&mut self, ranking: &Ranking) -> Result<(), GatewayError> {
        self.write_frame(&codec::encode_ranking(ranking)).await
    }

    async fn discard_pending(&mut self, player: PlayerId) {
        // Nobody else has been asked yet, so anything queued is this seat's
        let mut dropped = 0;
        while let Ok(token) = self.tokens.try_recv() {
            warn!("Dropping late move {:?} from player {}", token, player);
            dropped += 1;
        }
        if dropped == 0 {
            self.stale += 1;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
