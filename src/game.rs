//! Game board: gravity drops, legal columns and four-in-a-row detection.

use core::fmt;

use crate::error::InvalidMove;

/// Number of coins in a row to win the game.
pub const SERIES_LEN: usize = 4;

/// Scan directions as `(row step, column step)`: `-`, `|`, `/` and `\`.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

/// One contiguous run of [`SERIES_LEN`] cells.
pub type Window = [Option<Player>; SERIES_LEN];

#[derive(Copy, Clone, PartialOrd, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Player1 => 'X',
            Self::Player2 => 'O',
        }
    }
}

/// Gameboard.
#[derive(Debug, PartialOrd, PartialEq, Clone, Eq, Hash)]
pub struct Gameboard<const W: usize = 7, const H: usize = 6>(
    /*
     * Board: rows --> col --> field
     * Technical indices correspond to the logical indices:
     * (row=0,col=0) <==> bottom left of game board
     */
    [[Option<Player>; W]; H],
);

impl<const W: usize, const H: usize> Default for Gameboard<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> Gameboard<W, H> {
    #[must_use]
    pub const fn new() -> Self {
        assert!(W >= SERIES_LEN);
        assert!(H >= SERIES_LEN);

        let board = [[None; W]; H];
        Self(board)
    }

    #[must_use]
    pub const fn board(&self) -> &[[Option<Player>; W]; H] {
        &self.0
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        W
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        H
    }

    /// Returns the piece at the given cell, `None` if the cell is empty or
    /// outside the board.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Player> {
        self.0.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// A column accepts another coin iff its topmost cell is empty.
    #[must_use]
    pub fn is_valid_column(&self, column_index: usize) -> bool {
        column_index < W && self.0[H - 1][column_index].is_none()
    }

    /// Returns the index to the next free slot in the selected column.
    ///
    /// Returns `None` if there are no more free slots or the column does not
    /// exist.
    #[must_use]
    pub fn next_open_row(&self, column_index: usize) -> Option<usize> {
        if column_index >= W {
            return None;
        }
        (0..H).find(|&row_index| self.0[row_index][column_index].is_none())
    }

    /// Emits the column indices where moves are legal, in ascending order.
    pub fn valid_columns(&self) -> impl Iterator<Item = usize> {
        (0..W).filter(|&col| self.is_valid_column(col))
    }

    /// Returns whether there are no legal moves left.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.valid_columns().next().is_none()
    }

    /// Places `player` at `(row, col)` without any checks.
    ///
    /// The caller must have validated the column and obtained `row` from
    /// [`Self::next_open_row`]; otherwise the gravity invariant breaks.
    ///
    /// # Panics
    /// Panics if `row` or `col` is outside the board.
    pub fn drop_piece(&mut self, row: usize, col: usize, player: Player) {
        debug_assert!(self.0[row][col].is_none());
        debug_assert!(row == 0 || self.0[row - 1][col].is_some());
        self.0[row][col] = Some(player);
    }

    /// Checked drop. Returns the row the coin landed in.
    pub fn insert_player_chip(
        &mut self,
        column_index: usize,
        player: Player,
    ) -> Result<usize, InvalidMove> {
        if column_index >= W {
            return Err(InvalidMove::ColumnOutOfRange {
                column: column_index,
                width: W,
            });
        }

        let row_index = self
            .next_open_row(column_index)
            .ok_or(InvalidMove::ColumnFull {
                column: column_index,
            })?;
        self.drop_piece(row_index, column_index, player);
        Ok(row_index)
    }

    /// Window of [`SERIES_LEN`] cells starting at `(row, col)` in the given
    /// direction, if it fits on the board.
    fn window_at(&self, row: usize, col: usize, (d_row, d_col): (isize, isize)) -> Option<Window> {
        let span = SERIES_LEN as isize - 1;
        let last_row = row as isize + d_row * span;
        let last_col = col as isize + d_col * span;
        if !(0..H as isize).contains(&last_row) || !(0..W as isize).contains(&last_col) {
            return None;
        }

        Some(core::array::from_fn(|i| {
            let r = (row as isize + d_row * i as isize) as usize;
            let c = (col as isize + d_col * i as isize) as usize;
            self.0[r][c]
        }))
    }

    /// Emits every window on the board: horizontal, vertical and both
    /// diagonals.
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        DIRECTIONS.into_iter().flat_map(move |direction| {
            (0..H)
                .flat_map(|row| (0..W).map(move |col| (row, col)))
                .filter_map(move |(row, col)| self.window_at(row, col, direction))
        })
    }

    /// Check if `player` has four in a row anywhere on the board.
    #[must_use]
    pub fn winning_move(&self, player: Player) -> bool {
        self.windows()
            .any(|window| window.iter().all(|&cell| cell == Some(player)))
    }

    /// The game is over when a side has won or the board is full.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.winning_move(Player::Player1) || self.winning_move(Player::Player2) || self.is_full()
    }
}

impl<const W: usize, const H: usize> fmt::Display for Gameboard<W, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print rows reverted to that it appears naturally.
        for row in self.0.iter().rev() {
            write!(f, "|")?;
            for cell in row {
                write!(f, "{}|", cell.map_or(' ', Player::symbol))?;
            }
            writeln!(f)?;
        }
        for col_id in 1..=W {
            write!(f, " {}", col_id % 10)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
impl<const W: usize, const H: usize> Gameboard<W, H> {
    /// Builds a board from a picture, top row first. `X` is
    /// [`Player::Player1`], `O` is [`Player::Player2`], anything else is
    /// empty. Missing rows at the top are empty.
    pub(crate) fn from_picture(rows: &[&str]) -> Self {
        assert!(rows.len() <= H);
        let mut board = Self::new();
        for (i, line) in rows.iter().enumerate() {
            let row = rows.len() - 1 - i;
            for (col, ch) in line.chars().take(W).enumerate() {
                board.0[row][col] = match ch {
                    'X' => Some(Player::Player1),
                    'O' => Some(Player::Player2),
                    _ => None,
                };
            }
        }
        board
    }
}
