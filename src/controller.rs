//! Turn sequencing between the human player and the agent.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ai_player::{Decision, choose_column};
use crate::config::GameConfig;
use crate::error::{ConfigError, InvalidMove};
use crate::game::{Gameboard, Player};
use crate::minmax::{SearchEngine, SearchSettings};

/// Coin of the human player.
pub const PLAYER_PIECE: Player = Player::Player1;
/// Coin of the agent.
pub const AGENT_PIECE: Player = Player::Player2;

/// Which side opens a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstMover {
    Player,
    #[default]
    Agent,
}

impl FromStr for FirstMover {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "player" | "human" => Ok(Self::Player),
            "agent" | "ai" | "computer" => Ok(Self::Agent),
            other => Err(format!(
                "unknown first mover '{other}' (expected 'player' or 'agent')"
            )),
        }
    }
}

impl fmt::Display for FirstMover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Agent => f.write_str("agent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    PlayerTurn,
    AgentTurn,
    PlayerWon,
    AgentWon,
    Draw,
}

impl GameState {
    const fn opening(first_mover: FirstMover) -> Self {
        match first_mover {
            FirstMover::Player => Self::PlayerTurn,
            FirstMover::Agent => Self::AgentTurn,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PlayerWon | Self::AgentWon | Self::Draw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMoveOutcome {
    Continue,
    PlayerWon,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMoveOutcome {
    Continue,
    AgentWon,
    Draw,
}

/// The agent's move, for the caller to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentMove {
    pub column: usize,
    pub outcome: AgentMoveOutcome,
    pub decision: Decision,
}

/// Game with all its state: board, turn, and the agent's search session.
#[derive(Debug, Clone)]
pub struct GameController<const W: usize = 7, const H: usize = 6> {
    board: Gameboard<W, H>,
    state: GameState,
    first_mover: FirstMover,
    engine: SearchEngine<W, H>,
    round: usize,
}

impl<const W: usize, const H: usize> GameController<W, H> {
    #[must_use]
    pub fn new(first_mover: FirstMover, settings: SearchSettings) -> Self {
        Self {
            board: Gameboard::new(),
            state: GameState::opening(first_mover),
            first_mover,
            engine: SearchEngine::new(AGENT_PIECE, settings),
            round: 0,
        }
    }

    /// Builds a controller from a validated configuration. The configured
    /// board size must match `W`×`H`.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.board.rows != H || config.board.cols != W {
            return Err(ConfigError::Validation(format!(
                "board is configured as {}x{} but the game was built for {H}x{W}",
                config.board.rows, config.board.cols
            )));
        }
        let settings = SearchSettings {
            depth: config.search.depth,
            time_budget: config.search.time_budget()?,
            memo_capacity: config.search.memo_capacity,
        };
        Ok(Self::new(config.first_mover, settings))
    }

    #[must_use]
    pub const fn board(&self) -> &Gameboard<W, H> {
        &self.board
    }

    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub const fn first_mover(&self) -> FirstMover {
        self.first_mover
    }

    /// Number of coins played since the last reset.
    #[must_use]
    pub const fn round(&self) -> usize {
        self.round
    }

    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.engine.memo().len()
    }

    /// Contents of the cell at `row` (0 is the bottom row) and `col`.
    ///
    /// Cells outside the board read as empty. Renderers that need to tell
    /// them apart check against [`Gameboard::width`] and
    /// [`Gameboard::height`].
    #[must_use]
    pub fn query_cell(&self, row: usize, col: usize) -> Option<Player> {
        self.board.cell(row, col)
    }

    /// Rejects moves once the game is over or when it is the other side's
    /// turn.
    const fn expect_turn(&self, turn: GameState) -> Result<(), InvalidMove> {
        if self.state.is_terminal() {
            Err(InvalidMove::GameOver)
        } else if !matches!(
            (self.state, turn),
            (GameState::PlayerTurn, GameState::PlayerTurn)
                | (GameState::AgentTurn, GameState::AgentTurn)
        ) {
            Err(InvalidMove::OutOfTurn)
        } else {
            Ok(())
        }
    }

    /// Drops the human player's coin into `column`.
    ///
    /// The board only changes on `Ok`.
    pub fn apply_player_move(&mut self, column: usize) -> Result<PlayerMoveOutcome, InvalidMove> {
        self.expect_turn(GameState::PlayerTurn)?;
        self.board.insert_player_chip(column, PLAYER_PIECE)?;
        self.round += 1;

        let outcome = if self.board.winning_move(PLAYER_PIECE) {
            self.state = GameState::PlayerWon;
            log::info!("player wins after {} coins", self.round);
            PlayerMoveOutcome::PlayerWon
        } else if self.board.is_full() {
            self.state = GameState::Draw;
            log::info!("draw");
            PlayerMoveOutcome::Draw
        } else {
            self.state = GameState::AgentTurn;
            PlayerMoveOutcome::Continue
        };
        Ok(outcome)
    }

    /// Lets the agent pick and play its column.
    pub fn compute_agent_move(&mut self) -> Result<AgentMove, InvalidMove> {
        self.expect_turn(GameState::AgentTurn)?;
        let (column, decision) =
            choose_column(&mut self.engine, &self.board).ok_or(InvalidMove::GameOver)?;
        self.board.insert_player_chip(column, AGENT_PIECE)?;
        self.round += 1;

        let outcome = if self.board.winning_move(AGENT_PIECE) {
            self.state = GameState::AgentWon;
            log::info!("agent wins after {} coins", self.round);
            AgentMoveOutcome::AgentWon
        } else if self.board.is_full() {
            self.state = GameState::Draw;
            log::info!("draw");
            AgentMoveOutcome::Draw
        } else {
            self.state = GameState::PlayerTurn;
            AgentMoveOutcome::Continue
        };
        Ok(AgentMove {
            column,
            outcome,
            decision,
        })
    }

    /// Starts a new game: empty board, empty memo.
    pub fn reset_game(&mut self, first_mover: FirstMover) {
        self.board = Gameboard::new();
        self.engine.clear_memo();
        self.first_mover = first_mover;
        self.state = GameState::opening(first_mover);
        self.round = 0;
        log::info!("new game, {first_mover} moves first");
    }
}

impl<const W: usize, const H: usize> Default for GameController<W, H> {
    fn default() -> Self {
        Self::new(FirstMover::default(), SearchSettings::default())
    }
}

#[cfg(test)]
impl<const W: usize, const H: usize> GameController<W, H> {
    fn with_board(board: Gameboard<W, H>, state: GameState) -> Self {
        let mut game = Self::new(FirstMover::Player, fast_settings());
        game.board = board;
        game.state = state;
        game
    }
}

#[cfg(test)]
fn fast_settings() -> SearchSettings {
    SearchSettings {
        depth: 4,
        time_budget: Duration::from_secs(60),
        memo_capacity: 100_000,
    }
}
