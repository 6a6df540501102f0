//! Depth-limited minimax with alpha-beta pruning, move ordering, a time budget
//! and a transposition memo.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::evaluation::{move_score, score_position};
use crate::game::{Gameboard, Player};

/// Score of a forced win for the agent. Heuristic sums stay far below it.
pub const SCORE_INFINITY: i32 = i32::MAX;

/// Whose turn it is inside the search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToMove {
    /// The agent, i.e., the maximizing side.
    Agent,
    /// The agent's opponent, i.e., the minimizing side.
    Opponent,
}

impl ToMove {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Agent => Self::Opponent,
            Self::Opponent => Self::Agent,
        }
    }
}

/// Outcome of one search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Best column; `None` for leaves.
    pub column: Option<usize>,
    /// Score from the agent's perspective.
    pub score: i32,
    /// The time budget ran out somewhere below this node, so the result
    /// covers only part of the tree.
    pub cut_off: bool,
}

impl SearchResult {
    const fn leaf(score: i32) -> Self {
        Self {
            column: None,
            score,
            cut_off: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey<const W: usize, const H: usize> {
    pub board: Gameboard<W, H>,
    pub depth: usize,
    pub to_move: ToMove,
}

/// Cache of finished search results, owned by one game session.
#[derive(Debug, Clone)]
pub struct TranspositionMemo<const W: usize, const H: usize> {
    entries: HashMap<SearchKey<W, H>, SearchResult>,
    capacity: usize,
    capacity_warned: bool,
}

impl<const W: usize, const H: usize> TranspositionMemo<W, H> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            capacity_warned: false,
        }
    }

    #[must_use]
    pub fn get(&self, key: &SearchKey<W, H>) -> Option<SearchResult> {
        self.entries.get(key).copied()
    }

    /// Stores `result`. When the memo is at capacity new keys are dropped;
    /// there is no eviction.
    pub fn insert(&mut self, key: SearchKey<W, H>, result: SearchResult) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            if !self.capacity_warned {
                log::warn!(
                    "transposition memo reached its capacity of {} entries",
                    self.capacity
                );
                self.capacity_warned = true;
            }
            return;
        }
        self.entries.insert(key, result);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.capacity_warned = false;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tunables of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    pub depth: usize,
    pub time_budget: Duration,
    pub memo_capacity: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            depth: 6,
            time_budget: Duration::from_millis(800),
            memo_capacity: 1_000_000,
        }
    }
}

/// Counters of the most recent root search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: usize,
    pub memo_hits: usize,
    pub timed_out: bool,
}

#[derive(Debug, Clone)]
pub struct SearchEngine<const W: usize, const H: usize> {
    agent: Player,
    settings: SearchSettings,
    memo: TranspositionMemo<W, H>,
    stats: SearchStats,
    /// Treats the budget as spent once more nodes than this were visited.
    #[cfg(test)]
    node_limit: Option<usize>,
}

impl<const W: usize, const H: usize> SearchEngine<W, H> {
    #[must_use]
    pub fn new(agent: Player, settings: SearchSettings) -> Self {
        Self {
            agent,
            settings,
            memo: TranspositionMemo::with_capacity(settings.memo_capacity),
            stats: SearchStats::default(),
            #[cfg(test)]
            node_limit: None,
        }
    }

    #[must_use]
    pub const fn agent(&self) -> Player {
        self.agent
    }

    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    #[must_use]
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    #[must_use]
    pub const fn memo(&self) -> &TranspositionMemo<W, H> {
        &self.memo
    }

    pub fn clear_memo(&mut self) {
        self.memo.clear();
    }

    /// Root search for the agent on `board` with the configured depth and
    /// time budget.
    ///
    /// The result carries a column whenever `board` has a legal move, even
    /// if the budget ran out before the first candidate was searched.
    pub fn best_move(&mut self, board: &Gameboard<W, H>) -> SearchResult {
        self.stats = SearchStats::default();
        let start = Instant::now();
        let mut result = self.search(
            board,
            self.settings.depth,
            -SCORE_INFINITY,
            SCORE_INFINITY,
            ToMove::Agent,
            start,
        );
        if result.column.is_none() && !board.is_terminal() {
            result.column = self.ordered_candidates(board, ToMove::Agent).first().copied();
        }
        log::debug!(
            "search finished: column={:?} score={} nodes={} memo_hits={} memo_len={} elapsed={:?} timed_out={}",
            result.column,
            result.score,
            self.stats.nodes,
            self.stats.memo_hits,
            self.memo.len(),
            start.elapsed(),
            self.stats.timed_out,
        );
        result
    }

    /// Candidate columns with their one-ply scores, best for the mover first.
    ///
    /// The agent's candidates are sorted by descending score, the opponent's
    /// by ascending score of the opponent's own heuristic. The sort is stable,
    /// so equal scores keep ascending column order.
    #[must_use]
    pub fn ordered_candidates(&self, board: &Gameboard<W, H>, to_move: ToMove) -> Vec<usize> {
        let piece = self.piece(to_move);
        let mut candidates = board
            .valid_columns()
            .map(|col| (col, move_score(board, col, piece)))
            .collect::<Vec<_>>();
        match to_move {
            ToMove::Agent => candidates.sort_by(|a, b| b.1.cmp(&a.1)),
            ToMove::Opponent => candidates.sort_by_key(|&(_, score)| score),
        }
        candidates.into_iter().map(|(col, _)| col).collect()
    }

    const fn piece(&self, to_move: ToMove) -> Player {
        match to_move {
            ToMove::Agent => self.agent,
            ToMove::Opponent => self.agent.opponent(),
        }
    }

    /// Value of a leaf: win/loss sentinels, 0 for a draw, heuristic otherwise.
    fn leaf_score(&self, board: &Gameboard<W, H>) -> i32 {
        if board.winning_move(self.agent) {
            SCORE_INFINITY
        } else if board.winning_move(self.agent.opponent()) {
            -SCORE_INFINITY
        } else if board.is_full() {
            0
        } else {
            score_position(board, self.agent)
        }
    }

    fn out_of_time(&self, start: Instant) -> bool {
        #[cfg(test)]
        let node_limit_hit = self
            .node_limit
            .is_some_and(|limit| self.stats.nodes > limit);
        #[cfg(not(test))]
        let node_limit_hit = false;

        node_limit_hit || start.elapsed() > self.settings.time_budget
    }

    /// Minimax step. `start` is the instant of the root call and is passed on
    /// unchanged.
    pub fn search(
        &mut self,
        board: &Gameboard<W, H>,
        depth: usize,
        mut alpha: i32,
        mut beta: i32,
        to_move: ToMove,
        start: Instant,
    ) -> SearchResult {
        self.stats.nodes += 1;

        if self.out_of_time(start) {
            self.stats.timed_out = true;
            return SearchResult {
                column: None,
                score: score_position(board, self.agent),
                cut_off: true,
            };
        }

        let key = SearchKey {
            board: board.clone(),
            depth,
            to_move,
        };
        if let Some(cached) = self.memo.get(&key) {
            self.stats.memo_hits += 1;
            return cached;
        }

        if depth == 0 || board.is_terminal() {
            return SearchResult::leaf(self.leaf_score(board));
        }

        let candidates = self.ordered_candidates(board, to_move);
        let piece = self.piece(to_move);

        // not terminal, so there is at least one candidate
        let mut best_column = candidates[0];
        let mut best_score = match to_move {
            ToMove::Agent => -SCORE_INFINITY,
            ToMove::Opponent => SCORE_INFINITY,
        };
        let mut cut_off = false;

        for col in candidates {
            let Some(row) = board.next_open_row(col) else {
                continue;
            };
            let mut child = board.clone();
            child.drop_piece(row, col, piece);

            let reply = self.search(&child, depth - 1, alpha, beta, to_move.other(), start);
            if reply.cut_off {
                cut_off = true;
                break;
            }

            match to_move {
                ToMove::Agent => {
                    if reply.score > best_score {
                        best_score = reply.score;
                        best_column = col;
                    }
                    alpha = alpha.max(best_score);
                }
                ToMove::Opponent => {
                    if reply.score < best_score {
                        best_score = reply.score;
                        best_column = col;
                    }
                    beta = beta.min(best_score);
                }
            }

            if alpha >= beta {
                break;
            }
        }

        let result = SearchResult {
            column: Some(best_column),
            score: best_score,
            cut_off,
        };
        if !cut_off {
            self.memo.insert(key, result);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: Player = Player::Player2;

    fn engine(depth: usize, time_budget: Duration) -> SearchEngine<7, 6> {
        SearchEngine::new(
            AGENT,
            SearchSettings {
                depth,
                time_budget,
                memo_capacity: 1_000_000,
            },
        )
    }

    fn root(engine: &mut SearchEngine<7, 6>, board: &Gameboard<7, 6>, depth: usize) -> SearchResult {
        engine.search(
            board,
            depth,
            -SCORE_INFINITY,
            SCORE_INFINITY,
            ToMove::Agent,
            Instant::now(),
        )
    }

    #[test]
    fn depth_zero_is_a_single_leaf() {
        let board = Gameboard::<7, 6>::from_picture(&["..XOO.."]);
        let mut engine = engine(6, Duration::from_secs(60));
        let result = root(&mut engine, &board, 0);
        assert_eq!(result, SearchResult::leaf(score_position(&board, AGENT)));
        assert_eq!(engine.stats().nodes, 1);
        assert!(engine.memo().is_empty());
    }

    #[test]
    fn terminal_positions_are_leaves() {
        let mut engine = engine(6, Duration::from_secs(60));

        let won = Gameboard::<7, 6>::from_picture(&["XXX....", "OOOO..."]);
        assert_eq!(root(&mut engine, &won, 6).score, SCORE_INFINITY);
        assert_eq!(engine.stats().nodes, 1);

        let lost = Gameboard::<7, 6>::from_picture(&["OOO....", "XXXX..."]);
        assert_eq!(root(&mut engine, &lost, 6).score, -SCORE_INFINITY);
        assert_eq!(engine.stats().nodes, 2);
        assert!(engine.memo().is_empty());
    }

    #[test]
    fn draw_scores_zero() {
        let mut board = Gameboard::<7, 6>::new();
        for row in 0..6 {
            for col in 0..7 {
                let player = if (col + usize::from(row >= 3)) % 2 == 0 {
                    Player::Player1
                } else {
                    Player::Player2
                };
                board.drop_piece(row, col, player);
            }
        }
        assert!(!board.winning_move(Player::Player1));
        assert!(!board.winning_move(Player::Player2));

        let mut engine = engine(6, Duration::from_secs(60));
        let result = root(&mut engine, &board, 6);
        assert_eq!(result.score, 0);
        assert_eq!(result.column, None);
    }

    #[test]
    fn ordering_is_stable() {
        let board = Gameboard::<7, 6>::new();
        let engine = engine(6, Duration::from_secs(60));
        assert_eq!(
            engine.ordered_candidates(&board, ToMove::Agent),
            vec![3, 2, 4, 1, 5, 0, 6]
        );
        assert_eq!(
            engine.ordered_candidates(&board, ToMove::Opponent),
            vec![0, 6, 1, 5, 2, 4, 3]
        );
    }

    #[test]
    fn depth_one_picks_best_heuristic() {
        let board = Gameboard::<7, 6>::new();
        let mut engine = engine(1, Duration::from_secs(60));
        let result = engine.best_move(&board);
        assert_eq!(result.column, Some(3));
        assert_eq!(result.score, 6);
        assert!(!result.cut_off);
        // root + 7 leaves
        assert_eq!(engine.stats().nodes, 8);
    }

    #[test]
    fn lost_position_keeps_first_candidate() {
        // Opponent threatens columns 0 and 4, the agent cannot stop both.
        let board = Gameboard::<7, 6>::from_picture(&[".OOO...", ".XXX..."]);
        let mut engine = engine(2, Duration::from_secs(60));
        let first = engine.ordered_candidates(&board, ToMove::Agent)[0];

        let result = engine.best_move(&board);
        assert_eq!(result.score, -SCORE_INFINITY);
        assert_eq!(result.column, Some(first));
    }

    #[test]
    fn memo_is_filled_and_hit() {
        let board = Gameboard::<7, 6>::from_picture(&["...X..."]);
        let mut engine = engine(3, Duration::from_secs(60));

        let first = engine.best_move(&board);
        assert!(!engine.memo().is_empty());

        let second = engine.best_move(&board);
        assert_eq!(first, second);
        assert_eq!(engine.stats().nodes, 1);
        assert_eq!(engine.stats().memo_hits, 1);

        engine.clear_memo();
        assert!(engine.memo().is_empty());
    }

    #[test]
    fn side_to_move_is_part_of_the_key() {
        let board = Gameboard::<7, 6>::from_picture(&["...X..."]);
        let mut engine = engine(2, Duration::from_secs(60));
        let start = Instant::now();
        engine.search(&board, 2, -SCORE_INFINITY, SCORE_INFINITY, ToMove::Agent, start);
        let key = SearchKey {
            board: board.clone(),
            depth: 2,
            to_move: ToMove::Opponent,
        };
        assert!(engine.memo().get(&key).is_none());
        assert!(
            engine
                .memo()
                .get(&SearchKey {
                    to_move: ToMove::Agent,
                    ..key
                })
                .is_some()
        );
    }

    #[test]
    fn memo_capacity_is_respected() {
        let mut memo = TranspositionMemo::<7, 6>::with_capacity(1);
        let key = |depth| SearchKey {
            board: Gameboard::new(),
            depth,
            to_move: ToMove::Agent,
        };
        memo.insert(key(1), SearchResult::leaf(1));
        memo.insert(key(2), SearchResult::leaf(2));
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.get(&key(2)), None);

        // existing keys may still be updated
        memo.insert(key(1), SearchResult::leaf(5));
        assert_eq!(memo.get(&key(1)), Some(SearchResult::leaf(5)));
    }

    #[test]
    fn exhausted_budget_cuts_off_immediately() {
        let board = Gameboard::<7, 6>::new();
        let mut engine = engine(6, Duration::ZERO);
        let start = Instant::now() - Duration::from_millis(10);
        let result = engine.search(&board, 6, -SCORE_INFINITY, SCORE_INFINITY, ToMove::Agent, start);
        assert!(result.cut_off);
        assert_eq!(result.column, None);
        assert_eq!(result.score, score_position(&board, AGENT));
        assert!(engine.stats().timed_out);
        assert!(engine.memo().is_empty());
    }

    #[test]
    fn tiny_budget_still_yields_a_column() {
        let board = Gameboard::<7, 6>::from_picture(&["...X..."]);
        let mut engine = engine(6, Duration::from_nanos(1));
        let first = engine.ordered_candidates(&board, ToMove::Agent)[0];

        let result = engine.best_move(&board);
        assert!(result.cut_off);
        assert_eq!(result.column, Some(first));
        assert!(engine.stats().timed_out);
    }

    #[test]
    fn cut_off_inside_first_child_keeps_first_candidate() {
        let board = Gameboard::<7, 6>::new();
        let mut engine = engine(8, Duration::from_secs(600));
        // root and its first child run, the first grandchild is cut off
        engine.node_limit = Some(2);

        let result = engine.best_move(&board);
        assert!(result.cut_off);
        assert_eq!(result.column, Some(3));
        assert_eq!(engine.stats().nodes, 3);
        // nothing on the cut-off path is memoized
        assert!(engine.memo().is_empty());
    }

    #[test]
    fn cut_off_at_second_child_stops_the_root() {
        let board = Gameboard::<7, 6>::new();
        let mut engine = engine(2, Duration::from_secs(600));
        // root, first child and its 7 leaves finish; the second child is cut off
        engine.node_limit = Some(9);

        let result = engine.best_move(&board);
        assert!(result.cut_off);
        assert!(engine.stats().timed_out);
        assert_eq!(engine.stats().nodes, 10);
        assert_eq!(result.column, Some(3));

        let root_key = SearchKey {
            board: board.clone(),
            depth: 2,
            to_move: ToMove::Agent,
        };
        assert!(engine.memo().get(&root_key).is_none());
        // the finished first child is kept
        let mut first_child = board.clone();
        first_child.drop_piece(0, 3, AGENT);
        let child_key = SearchKey {
            board: first_child,
            depth: 1,
            to_move: ToMove::Opponent,
        };
        assert!(engine.memo().get(&child_key).is_some_and(|r| !r.cut_off));
        assert_eq!(engine.memo().len(), 1);
    }

    #[test]
    fn empty_board_within_budget() {
        let board = Gameboard::<7, 6>::new();
        let budget = Duration::from_millis(800);
        let mut engine = engine(6, budget);

        let start = Instant::now();
        let result = engine.best_move(&board);
        let elapsed = start.elapsed();

        let column = result.column.expect("root always has a column");
        assert!(column < 7);
        assert!(
            elapsed < budget + Duration::from_millis(250),
            "search took {elapsed:?}"
        );
    }

    #[test]
    fn search_is_deterministic() {
        let board = Gameboard::<7, 6>::from_picture(&["..XO..."]);
        let a = engine(4, Duration::from_secs(600)).best_move(&board);
        let b = engine(4, Duration::from_secs(600)).best_move(&board);
        assert!(!a.cut_off);
        assert_eq!(a, b);
    }
}
