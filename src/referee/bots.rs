//! Bot Processes
//!
//! One child process per seat. A bot sees only its own turn frames
//! (player count line onward) and answers each with one line.

use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::game::engine::{Ranking, Snapshot};
use crate::game::player::PlayerId;
use crate::protocol::codec;
use crate::protocol::gateway::{GatewayError, MoveReply, Transport};
use crate::referee::config::BotSpec;
use crate::referee::MatchError;

/// Reply lines buffered per bot.
const REPLY_BUFFER: usize = 16;

/// Forward every line of `reader` to a channel, closing it at end of input.
fn spawn_line_reader<R>(name: String, reader: R) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(REPLY_BUFFER);
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    debug!("Bot {} closed its output", name);
                    return;
                }
                Err(e) => {
                    warn!("Reading from bot {} failed: {}", name, e);
                    return;
                }
            }
        }
    });
    rx
}

/// A running bot.
pub struct BotProcess {
    /// Display name
    pub name: String,
    child: Child,
    stdin: ChildStdin,
    replies: mpsc::Receiver<String>,
    connected: bool,
}

impl BotProcess {
    /// Launch a bot. Its stderr goes to `stderr_dir/<name>.err` when given.
    pub fn launch(spec: &BotSpec, stderr_dir: Option<&Path>) -> Result<Self, MatchError> {
        let spawn_err = |source: std::io::Error| MatchError::Spawn { name: spec.name.clone(), source };

        let stderr = match stderr_dir {
            Some(dir) => {
                let file = std::fs::File::create(dir.join(format!("{}.err", spec.name))).map_err(spawn_err)?;
                Stdio::from(file)
            }
            None => Stdio::null(),
        };

        info!("Creating bot {}. Command line : {} {}", spec.name, spec.bin.display(), spec.arguments.join(" "));

        let mut child = Command::new(&spec.bin)
            .args(&spec.arguments)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_err(std::io::Error::other("stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_err(std::io::Error::other("stdout not captured")))?;

        Ok(Self {
            name: spec.name.clone(),
            child,
            stdin,
            replies: spawn_line_reader(spec.name.clone(), stdout),
            connected: true,
        })
    }

    async fn send(&mut self, frame: &str) {
        if !self.connected {
            return;
        }
        let result = async {
            self.stdin.write_all(frame.as_bytes()).await?;
            self.stdin.flush().await
        }
        .await;

        if let Err(e) = result {
            warn!("Writing to bot {} failed: {}", self.name, e);
            self.connected = false;
        }
    }

    async fn recv(&mut self) -> MoveReply {
        if !self.connected {
            return MoveReply::Disconnected;
        }
        match self.replies.recv().await {
            Some(line) => MoveReply::Token(line.split_whitespace().next().unwrap_or_default().to_string()),
            None => {
                self.connected = false;
                MoveReply::Disconnected
            }
        }
    }

    async fn stop(&mut self) {
        if let Err(e) = self.child.kill().await {
            debug!("Bot {} already exited: {}", self.name, e);
        }
    }
}

/// All bots of a match, indexed by seat.
pub struct BotPool {
    bots: Vec<BotProcess>,
}

impl BotPool {
    /// Launch every bot in seat order. Already started bots are killed on error.
    pub fn launch(specs: &[BotSpec], stderr_dir: Option<&Path>) -> Result<Self, MatchError> {
        let bots = specs
            .iter()
            .map(|spec| BotProcess::launch(spec, stderr_dir))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bots })
    }

    /// Bot names in seat order.
    pub fn names(&self) -> Vec<String> {
        self.bots.iter().map(|b| b.name.clone()).collect()
    }

    /// Kill every bot.
    pub async fn shutdown(&mut self) {
        for bot in &mut self.bots {
            bot.stop().await;
        }
    }

    fn bot_mut(&mut self, player: PlayerId) -> Result<&mut BotProcess, GatewayError> {
        self.bots.get_mut(player.index()).ok_or_else(|| {
            GatewayError::Io(std::io::Error::other(format!("no bot seated at {}", player)))
        })
    }
}

impl Transport for BotPool {
    async fn send_skip(&mut self, _player: PlayerId) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn send_turn(&mut self, snapshot: &Snapshot) -> Result<(), GatewayError> {
        let frame = codec::encode_player_lines(snapshot);
        self.bot_mut(snapshot.current)?.send(&frame).await;
        Ok(())
    }

    async fn recv_move(&mut self, player: PlayerId) -> Result<MoveReply, GatewayError> {
        Ok(self.bot_mut(player)?.recv().await)
    }

    async fn send_ranking(&mut self, _ranking: &Ranking) -> Result<(), GatewayError> {
        Ok(())
    }
}
