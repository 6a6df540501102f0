use crate::game::{Gameboard, Player};
use crate::minmax::SearchEngine;

/// Why the agent picked a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The column wins on the spot.
    Win,
    /// The opponent would win in this column next turn.
    Block,
    /// Chosen by the minimax search, with its score.
    Search { score: i32 },
}

/// Returns the lowest column where dropping a coin of `player` wins at once.
#[must_use]
pub fn immediate_win<const W: usize, const H: usize>(
    board: &Gameboard<W, H>,
    player: Player,
) -> Option<usize> {
    board.valid_columns().find(|&col| {
        let mut scratch = board.clone();
        scratch.insert_player_chip(col, player).is_ok() && scratch.winning_move(player)
    })
}

/// Picks the agent's column: win if possible, otherwise block an immediate
/// threat, otherwise search.
///
/// Returns `None` only if the board has no legal move.
#[must_use]
pub fn choose_column<const W: usize, const H: usize>(
    engine: &mut SearchEngine<W, H>,
    board: &Gameboard<W, H>,
) -> Option<(usize, Decision)> {
    let agent = engine.agent();

    if let Some(col) = immediate_win(board, agent) {
        log::debug!("agent wins in column {col}");
        return Some((col, Decision::Win));
    }
    if let Some(col) = immediate_win(board, agent.opponent()) {
        log::debug!("agent blocks column {col}");
        return Some((col, Decision::Block));
    }

    let result = engine.best_move(board);
    result
        .column
        .filter(|&col| board.is_valid_column(col))
        .map(|col| (col, Decision::Search { score: result.score }))
}
