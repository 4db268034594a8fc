//! Tron Referee
//!
//! `tron-referee <N>` speaks the framed protocol on stdin/stdout for an
//! outer harness. `tron-referee match <FILE>` hosts the bots itself.
//! Diagnostics always go to stderr.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tron_referee::{
    VERSION, WIDTH, HEIGHT,
    core::rng::DeterministicRng,
    game::{config::timeout_from_millis, GameConfig, Simulation, UnknownMovePolicy},
    protocol::{Gateway, StreamTransport},
    referee::{run_match, MatchConfig},
};

#[derive(Debug, Parser)]
#[command(name = "tron-referee", version, about = "Referee for grid light-cycle bot games")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Number of players (2 to 4)
    players: Option<usize>,

    #[command(flatten)]
    options: GameOptions,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Launch the bots listed in a match file and referee one game
    Match {
        /// Match configuration (JSON)
        config: PathBuf,

        #[command(flatten)]
        options: GameOptions,
    },
}

#[derive(Debug, Clone, clap::Args)]
struct GameOptions {
    /// Spawn seed (default: TRON_SEED, else the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Per-turn move deadline in milliseconds (default 1000), 0 to wait forever
    #[arg(long, value_name = "MS")]
    move_timeout_ms: Option<u64>,

    /// What to do with tokens that are not moves: stay or eliminate
    #[arg(long, value_name = "POLICY")]
    unknown_move: Option<UnknownMovePolicy>,
}

impl GameOptions {
    /// Command line values over the environment.
    fn apply(&self, mut config: GameConfig) -> GameConfig {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(ms) = self.move_timeout_ms {
            config.move_timeout = timeout_from_millis(ms);
        }
        if let Some(policy) = self.unknown_move {
            config.unknown_move = policy;
        }
        config
    }
}

fn main() -> Result<()> {
    // Stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    let result = runtime.block_on(async move {
        match cli.command {
            Some(Command::Match { config, options }) => play_match(config, options).await,
            None => {
                let players = cli.players.context("missing player count (see --help)")?;
                let env_config = GameConfig::from_env().context("reading TRON_* environment")?;
                let config = GameConfig { players, ..cli.options.apply(env_config) };
                play_stdio(config).await
            }
        }
    });

    // A blocked stdin read must not hold the process open
    runtime.shutdown_background();
    result
}

/// Engine mode: one game on stdin/stdout.
async fn play_stdio(config: GameConfig) -> Result<()> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(clock_seed);

    info!("Tron referee v{}", VERSION);
    info!("Board: {}x{}, players: {}, seed: {}", WIDTH, HEIGHT, config.players, seed);

    let mut rng = DeterministicRng::new(seed);
    let mut sim = Simulation::new(&config, &mut rng)?;

    let transport = StreamTransport::new(tokio::io::stdin(), tokio::io::stdout());
    let mut gateway = Gateway::new(transport, config.move_timeout);
    gateway.run(&mut sim).await.context("game aborted")?;
    Ok(())
}

/// Match mode: launch the bots and referee one game.
///
/// Settings layer as file, then environment, then command line.
async fn play_match(path: PathBuf, options: GameOptions) -> Result<()> {
    info!("Tron referee v{}", VERSION);
    info!("Reading parameter file : {}", path.display());

    let config = MatchConfig::load(&path)?;
    let game = config.game_config().with_env().context("reading TRON_* environment")?;
    let game = options.apply(game);

    let report = run_match(&config, &game, clock_seed()).await?;
    info!("Seed: {}, final state hash: {}", report.seed, hex::encode(report.state_hash));

    println!("{}", report.summary());
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
