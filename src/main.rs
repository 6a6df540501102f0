//! Interactive Connect Four in the terminal.

#![deny(
    clippy::all,
    clippy::nursery,
    clippy::must_use_candidate,
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::all)]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use connect4_minimax::{
    AGENT_PIECE, FirstMover, GameConfig, GameController, GameState, PLAYER_PIECE,
};

/// Board sizes (rows x cols) the binary is built for.
const SUPPORTED_SIZES: &str = "6x7, 4x5, 5x6, 7x8, 7x9, 7x10";

/// Play Connect Four against the computer.
#[derive(Debug, Parser)]
#[command(name = "connect4-minimax", about = "Play Connect Four against the computer")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "connect4.toml")]
    config: PathBuf,

    /// Who opens the game: player or agent
    #[arg(long)]
    first_mover: Option<FirstMover>,

    /// Override the search depth
    #[arg(long)]
    depth: Option<usize>,

    /// Override the agent's time budget in seconds
    #[arg(long)]
    time_budget: Option<f64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Zero-based column.
    Column(usize),
    Reset,
    Quit,
}

/// Parses a line of user input. Columns are entered one-based.
fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "q" | "quit" => Some(Command::Quit),
        "r" | "reset" => Some(Command::Reset),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|col| col.checked_sub(1))
            .map(Command::Column),
    }
}

fn read_line(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<Option<String>> {
    io::stdout().flush()?;
    lines.next().transpose().context("reading from stdin")
}

fn play<const W: usize, const H: usize>(config: &GameConfig) -> Result<()> {
    let mut game = GameController::<W, H>::from_config(config)?;
    let mut lines = io::stdin().lock().lines();

    println!("Let's play Connect Four against the computer.");
    println!(
        "You play {}, the computer plays {}.",
        PLAYER_PIECE.symbol(),
        AGENT_PIECE.symbol()
    );

    loop {
        match game.state() {
            GameState::AgentTurn => {
                let reply = game.compute_agent_move()?;
                println!("Computer chose column {}", reply.column + 1);
            }
            GameState::PlayerTurn => {
                println!("----------------");
                print!("{}", game.board());
                print!("Choose your move (column, r = reset, q = quit): ");
                let Some(line) = read_line(&mut lines)? else {
                    return Ok(());
                };

                match parse_command(&line) {
                    Some(Command::Column(col)) => {
                        if let Err(err) = game.apply_player_move(col) {
                            println!("Invalid move: {err}");
                        }
                    }
                    Some(Command::Reset) => game.reset_game(game.first_mover()),
                    Some(Command::Quit) => return Ok(()),
                    None => println!("Please enter a column between 1 and {W}."),
                }
            }
            terminal => {
                println!("----------------");
                print!("{}", game.board());
                match terminal {
                    GameState::PlayerWon => println!("You won!"),
                    GameState::AgentWon => println!("Computer won!"),
                    _ => println!("Gameover: draw"),
                }

                print!("Play again? [y/N] ");
                match read_line(&mut lines)? {
                    Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                        game.reset_game(game.first_mover());
                    }
                    _ => return Ok(()),
                }
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = GameConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(first_mover) = cli.first_mover {
        config.first_mover = first_mover;
    }
    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }
    if let Some(secs) = cli.time_budget {
        config.search.time_budget_secs = secs;
    }
    config.validate()?;

    match (config.board.rows, config.board.cols) {
        (6, 7) => play::<7, 6>(&config),
        (4, 5) => play::<5, 4>(&config),
        (5, 6) => play::<6, 5>(&config),
        (7, 8) => play::<8, 7>(&config),
        (7, 9) => play::<9, 7>(&config),
        (7, 10) => play::<10, 7>(&config),
        (rows, cols) => {
            bail!("unsupported board size {rows}x{cols} (supported: {SUPPORTED_SIZES})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("1\n"), Some(Command::Column(0)));
        assert_eq!(parse_command(" 7 "), Some(Command::Column(6)));
        assert_eq!(parse_command("0"), None);
        assert_eq!(parse_command("abc"), None);
        assert_eq!(parse_command("r"), Some(Command::Reset));
        assert_eq!(parse_command("q"), Some(Command::Quit));
    }

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::parse_from([
            "connect4-minimax",
            "--first-mover",
            "player",
            "--depth",
            "4",
        ]);
        assert_eq!(cli.first_mover, Some(FirstMover::Player));
        assert_eq!(cli.depth, Some(4));
        assert_eq!(cli.time_budget, None);
    }
}
