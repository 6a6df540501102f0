//! Hand-tuned heuristic for a position, seen from one side.
//!
//! The score is the sum of a center-column bias and a per-window term over
//! every window on the board. The penalty for an open opponent three is larger
//! than the reward for an own open three, which makes the agent prefer blocking
//! over building.

use crate::game::{Gameboard, Player, Window};

/// Bias per own coin in the center column.
pub const CENTER_WEIGHT: i32 = 6;
/// Bias per own coin in the columns next to the center, indexed by distance
/// from the center.
const NEAR_CENTER_WEIGHTS: [(usize, i32); 2] = [(1, 4), (2, 2)];

pub const FOUR_SCORE: i32 = 1000;
pub const OPEN_THREE_SCORE: i32 = 50;
pub const OPEN_TWO_SCORE: i32 = 10;
pub const OPPONENT_OPEN_THREE_PENALTY: i32 = 80;

/// Scores a single window for `player`.
#[must_use]
pub fn evaluate_window(window: &Window, player: Player) -> i32 {
    let own = window.iter().filter(|&&c| c == Some(player)).count();
    let opp = window
        .iter()
        .filter(|&&c| c == Some(player.opponent()))
        .count();
    let empty = window.iter().filter(|c| c.is_none()).count();

    let mut score = match (own, empty) {
        (4, _) => FOUR_SCORE,
        (3, 1) => OPEN_THREE_SCORE,
        (2, 2) => OPEN_TWO_SCORE,
        _ => 0,
    };
    if opp == 3 && empty == 1 {
        score -= OPPONENT_OPEN_THREE_PENALTY;
    }
    score
}

/// Heuristic value of the whole board for `player`.
#[must_use]
pub fn score_position<const W: usize, const H: usize>(
    board: &Gameboard<W, H>,
    player: Player,
) -> i32 {
    let coins_in_column = |col: usize| {
        (0..H)
            .filter(|&row| board.cell(row, col) == Some(player))
            .count() as i32
    };

    let center = W / 2;
    let mut score = coins_in_column(center) * CENTER_WEIGHT;
    for (distance, weight) in NEAR_CENTER_WEIGHTS {
        // left side can fall off the board, right side can run past it
        if let Some(left) = center.checked_sub(distance) {
            score += coins_in_column(left) * weight;
        }
        if center + distance < W {
            score += coins_in_column(center + distance) * weight;
        }
    }

    score
        + board
            .windows()
            .map(|window| evaluate_window(&window, player))
            .sum::<i32>()
}

/// One-ply lookahead used for move ordering: the heuristic value for `player`
/// after dropping its coin into `column`.
///
/// A full column leaves the scratch board unchanged.
#[must_use]
pub fn move_score<const W: usize, const H: usize>(
    board: &Gameboard<W, H>,
    column: usize,
    player: Player,
) -> i32 {
    let mut scratch = board.clone();
    if let Some(row) = scratch.next_open_row(column) {
        scratch.drop_piece(row, column, player);
    }
    score_position(&scratch, player)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: Player = Player::Player2;
    const YOU: Player = Player::Player1;

    #[test]
    fn window_patterns() {
        assert_eq!(evaluate_window(&[Some(ME); 4], ME), 1000);
        assert_eq!(
            evaluate_window(&[Some(ME), Some(ME), None, Some(ME)], ME),
            50
        );
        assert_eq!(evaluate_window(&[None, Some(ME), Some(ME), None], ME), 10);
        assert_eq!(
            evaluate_window(&[Some(YOU), None, Some(YOU), Some(YOU)], ME),
            -80
        );
    }

    #[test]
    fn window_patterns_that_score_nothing() {
        assert_eq!(evaluate_window(&[None; 4], ME), 0);
        // blocked three
        assert_eq!(
            evaluate_window(&[Some(ME), Some(ME), Some(ME), Some(YOU)], ME),
            0
        );
        // blocked two
        assert_eq!(
            evaluate_window(&[Some(ME), Some(ME), Some(YOU), None], ME),
            0
        );
        // opponent four is not penalized by the window term
        assert_eq!(evaluate_window(&[Some(YOU); 4], ME), 0);
        // opponent open two
        assert_eq!(evaluate_window(&[Some(YOU), Some(YOU), None, None], ME), 0);
    }

    #[test]
    fn center_bias() {
        let empty = Gameboard::<7, 6>::new();
        assert_eq!(score_position(&empty, ME), 0);

        let weights: Vec<i32> = (0..7).map(|col| move_score(&empty, col, ME)).collect();
        assert_eq!(weights, vec![0, 2, 4, 6, 4, 2, 0]);

        // center 2, neighbors 1 and 3, outer neighbor 0; offset +2 is off the board
        let small = Gameboard::<4, 4>::new();
        let weights: Vec<i32> = (0..4).map(|col| move_score(&small, col, ME)).collect();
        assert_eq!(weights, vec![2, 4, 6, 4]);
    }

    #[test]
    fn score_position_sums_center_and_windows() {
        let board = Gameboard::<7, 6>::from_picture(&["OOO...."]);
        // center: col 1 -> 2, col 2 -> 4; windows: OOO_ -> 50, OO__ -> 10
        assert_eq!(score_position(&board, ME), 66);
        // opponent view: one open three of ME
        assert_eq!(score_position(&board, YOU), -80);
    }

    #[test]
    fn move_score_on_full_column() {
        let board = Gameboard::<4, 4>::from_picture(&["X...", "O...", "X...", "O..."]);
        assert_eq!(move_score(&board, 0, ME), score_position(&board, ME));
    }
}
