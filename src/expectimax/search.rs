use log::{debug, trace};

use crate::engine::{Board, Move};
use crate::heuristic::{Evaluator, Utility};
use crate::Policy;

use super::{warm_engine_and_heuristics, BranchEval, ChanceWeighting, ExpectimaxConfig, SearchStats};

const SPAWNS: [(u64, f64); 2] = [(1, 0.9), (2, 0.1)]; // (exponent, probability): a 2 or a 4

/// Single-threaded Expectimax search.
///
/// Every node works on its own copy of the board; the only state mutated
/// during a search is the candidate counter.
pub struct Expectimax {
    cfg: ExpectimaxConfig,
    evaluator: Box<dyn Evaluator>,
    stats: SearchStats,
    states_visited: u64,
}

impl Expectimax {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self {
        let evaluator = cfg.evaluator.build();
        Self::with_evaluator(cfg, evaluator)
    }

    /// Use a custom evaluator; `cfg.evaluator` is ignored.
    pub fn with_evaluator(cfg: ExpectimaxConfig, evaluator: Box<dyn Evaluator>) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, evaluator, stats: SearchStats::default(), states_visited: 0 }
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Compute the best move using expectimax, or `None` when no move is legal.
    ///
    /// Moves are tried in `Move::ALL` order and a later move replaces the
    /// current best on an equal score, so the last of several tied moves wins.
    ///
    /// Example
    /// ```
    /// use auto_2048::engine::Board;
    /// use auto_2048::expectimax::Expectimax;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// let mut ex = Expectimax::new();
    /// assert!(ex.best_move(&b).is_some());
    /// ```
    pub fn best_move(&mut self, board: &Board) -> Option<Move> {
        let mut state_count = 0u64;
        let (best, utility) = self.maximize(*board, 0, &mut state_count);
        self.record(state_count);
        debug!("expectimax chose {:?} (utility {:.2}, {} states)", best, utility.total, state_count);
        best
    }

    /// Compute the chance-node utility for each direction.
    ///
    /// Returns a fixed array in order: `[Up, Down, Left, Right]` and marks
    /// illegal moves as `legal=false` with `Utility::NEG_INFINITY`.
    pub fn branch_evals(&mut self, board: &Board) -> [BranchEval; 4] {
        let mut state_count = 0u64;
        let out = Move::ALL.map(|dir| {
            let mut m_board = *board;
            if m_board.apply_move(dir) {
                state_count += 1;
                let utility = self.chance(m_board, 1, &mut state_count);
                BranchEval { dir, utility, legal: true }
            } else {
                BranchEval { dir, utility: Utility::NEG_INFINITY, legal: false }
            }
        });
        self.record(state_count);
        out
    }

    /// Utility at the root (max node), equal to the best branch utility.
    pub fn state_value(&mut self, board: &Board) -> Utility {
        let mut state_count = 0u64;
        let (_, utility) = self.maximize(*board, 0, &mut state_count);
        self.record(state_count);
        utility
    }

    /// Statistics collected from the last call to [`Self::best_move`],
    /// [`Self::branch_evals`] or [`Self::state_value`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    /// Reset per-call stats to zero. The lifetime `states_visited` total is kept.
    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }

    fn record(&mut self, state_count: u64) {
        self.stats.nodes = state_count;
        self.stats.peak_nodes = self.stats.peak_nodes.max(state_count);
        self.states_visited += state_count;
    }

    fn maximize(&self, board: Board, depth: u32, state_count: &mut u64) -> (Option<Move>, Utility) {
        let mut best_utility = Utility::NEG_INFINITY;
        let mut best_move = None;
        for direction in board.available_moves() {
            let mut m_board = board;
            m_board.apply_move(direction);
            trace!("testing {} at depth {}:\n{}", direction, depth, m_board);
            let utility = self.chance(m_board, depth + 1, state_count);
            if utility.total >= best_utility.total {
                best_utility = utility;
                best_move = Some(direction);
            }
            *state_count += 1;
        }
        (best_move, best_utility)
    }

    fn chance(&self, board: Board, depth: u32, state_count: &mut u64) -> Utility {
        let num_empty_tiles = board.count_empty();
        if (num_empty_tiles >= self.cfg.shallow_min_empty && depth >= self.cfg.shallow_depth)
            || depth >= self.cfg.max_depth
        {
            return self.evaluator.evaluate(&board, num_empty_tiles);
        }
        if num_empty_tiles == 0 {
            // Nothing to spawn: continue with the player's turn, unless the game is over.
            if board.is_game_over() {
                return self.evaluator.evaluate(&board, 0);
            }
            return self.maximize(board, depth + 1, state_count).1;
        }

        let mut utility = Utility::default();
        let mut hypotheses = 0u32;
        for idx in (0..16).filter(|&idx| board.exponent(idx) == 0) {
            for (exponent, prob) in SPAWNS {
                let t_board = board.with_exponent(idx, exponent);
                let (_, t_utility) = self.maximize(t_board, depth + 1, state_count);
                match self.cfg.chance_weighting {
                    ChanceWeighting::Uniform => utility += t_utility,
                    ChanceWeighting::Weighted => utility += t_utility * (prob / num_empty_tiles as f64),
                }
                hypotheses += 1;
            }
        }
        match self.cfg.chance_weighting {
            ChanceWeighting::Uniform => utility / hypotheses as f64,
            ChanceWeighting::Weighted => utility,
        }
    }
}

impl Default for Expectimax { fn default() -> Self { Self::new() } }

impl Policy for Expectimax {
    fn get_move(&mut self, board: &Board) -> Option<Move> { self.best_move(board) }

    fn states_visited(&self) -> u64 { self.states_visited }
}
