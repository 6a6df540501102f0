//! _Connect Four_ against the computer.
//!
//! [`GameController`] is the entry point for front ends: it applies the human
//! player's moves, lets the agent answer, and reports wins and draws. The agent
//! plays an immediate win if there is one, blocks an immediate threat
//! otherwise, and falls back to a time-bounded minimax search with alpha-beta
//! pruning and a transposition memo ([`minmax`]).

#![deny(missing_debug_implementations)]

pub mod ai_player;
pub mod config;
pub mod controller;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod minmax;

pub use ai_player::{Decision, choose_column};
pub use config::GameConfig;
pub use controller::{
    AGENT_PIECE, AgentMove, AgentMoveOutcome, FirstMover, GameController, GameState, PLAYER_PIECE,
    PlayerMoveOutcome,
};
pub use error::{ConfigError, InvalidMove};
pub use game::{Gameboard, Player};
pub use minmax::{SearchEngine, SearchResult, SearchSettings};
