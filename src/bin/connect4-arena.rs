//! Lets the agent play many games against a random opponent, in parallel.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use connect4_minimax::{FirstMover, GameConfig, GameController, GameState};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

/// Smoke-test the agent against a seeded random opponent.
#[derive(Debug, Parser)]
#[command(name = "connect4-arena", about = "Play the agent against a random opponent")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value_t = 32)]
    games: usize,

    /// Seed of the first game; game `i` uses `seed + i`
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path to TOML configuration file
    #[arg(long, default_value = "connect4.toml")]
    config: PathBuf,

    /// Override the search depth
    #[arg(long)]
    depth: Option<usize>,

    /// Override the agent's time budget in seconds
    #[arg(long)]
    time_budget: Option<f64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    agent_wins: usize,
    opponent_wins: usize,
    draws: usize,
}

impl Tally {
    fn record(mut self, state: GameState) -> Self {
        match state {
            GameState::AgentWon => self.agent_wins += 1,
            GameState::PlayerWon => self.opponent_wins += 1,
            _ => self.draws += 1,
        }
        self
    }
}

/// Plays one game to the end. Even seeds let the random opponent open.
fn play_one<const W: usize, const H: usize>(config: &GameConfig, seed: u64) -> Result<GameState> {
    let mut game = GameController::<W, H>::from_config(config)?;
    game.reset_game(if seed % 2 == 0 {
        FirstMover::Player
    } else {
        FirstMover::Agent
    });
    let mut rng = StdRng::seed_from_u64(seed);

    loop {
        match game.state() {
            GameState::PlayerTurn => {
                let columns = game.board().valid_columns().collect::<Vec<_>>();
                let col = *columns.choose(&mut rng).context("no legal move left")?;
                game.apply_player_move(col)?;
            }
            GameState::AgentTurn => {
                game.compute_agent_move()?;
            }
            terminal => {
                log::info!("game {seed}: {terminal:?} after {} coins", game.round());
                return Ok(terminal);
            }
        }
    }
}

fn run<const W: usize, const H: usize>(config: &GameConfig, games: usize, seed: u64) -> Result<Tally> {
    let results = (0..games as u64)
        .into_par_iter()
        .map(|i| play_one::<W, H>(config, seed.wrapping_add(i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(results.into_iter().fold(Tally::default(), Tally::record))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = GameConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }
    if let Some(secs) = cli.time_budget {
        config.search.time_budget_secs = secs;
    }
    config.validate()?;

    let tally = match (config.board.rows, config.board.cols) {
        (6, 7) => run::<7, 6>(&config, cli.games, cli.seed)?,
        (4, 5) => run::<5, 4>(&config, cli.games, cli.seed)?,
        (5, 6) => run::<6, 5>(&config, cli.games, cli.seed)?,
        (7, 8) => run::<8, 7>(&config, cli.games, cli.seed)?,
        (7, 9) => run::<9, 7>(&config, cli.games, cli.seed)?,
        (7, 10) => run::<10, 7>(&config, cli.games, cli.seed)?,
        (rows, cols) => bail!("unsupported board size {rows}x{cols}"),
    };

    println!(
        "{} games: agent won {}, random opponent won {}, draws {}",
        cli.games, tally.agent_wins, tally.opponent_wins, tally.draws
    );
    Ok(())
}
