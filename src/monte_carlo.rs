//! Monte Carlo rollout policy.
//!
//! Each trial copies the live board, plays a uniformly random first move and
//! then random legal moves for a few plies (no tile spawns), scoring the
//! final position with the evaluator. The first move with the best average
//! score wins, provided that average beats `score_floor`.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Board, Move};
use crate::heuristic::{self, Evaluator, EvaluatorKind};
use crate::Policy;

/// Knobs for [`MonteCarlo`].
///
/// - `trials`: rollouts per decision.
/// - `rollout_depth`: extra random plies after the first move.
/// - `score_floor`: an average must be strictly above this to be chosen;
///   with the default 0.0 a board whose every average is non-positive yields no move.
/// - `seed`: fixed RNG seed for reproducible decisions (entropy when `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub evaluator: EvaluatorKind,
    pub trials: usize,
    pub rollout_depth: u32,
    pub score_floor: f64,
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self { evaluator: EvaluatorKind::Snake, trials: 1000, rollout_depth: 3, score_floor: 0.0, seed: None }
    }
}

pub struct MonteCarlo {
    cfg: MonteCarloConfig,
    evaluator: Box<dyn Evaluator>,
    rng: StdRng,
    states_visited: u64,
}

impl MonteCarlo {
    pub fn new() -> Self { Self::with_config(MonteCarloConfig::default()) }

    pub fn with_config(cfg: MonteCarloConfig) -> Self {
        let evaluator = cfg.evaluator.build();
        Self::with_evaluator(cfg, evaluator)
    }

    /// Use a custom evaluator; `cfg.evaluator` is ignored.
    pub fn with_evaluator(cfg: MonteCarloConfig, evaluator: Box<dyn Evaluator>) -> Self {
        engine::new();
        heuristic::warm();
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { cfg, evaluator, rng, states_visited: 0 }
    }

    #[inline]
    pub fn config(&self) -> &MonteCarloConfig { &self.cfg }

    /// Average rollout score per first move, indexed like [`Move::ALL`].
    /// Moves that drew no trial (or are illegal) are `None`.
    pub fn move_scores(&mut self, board: &Board) -> [Option<f64>; 4] {
        let moves = board.available_moves();
        let mut runs_sum = [0.0f64; 4];
        let mut runs_ttl = [0u32; 4];
        for _ in 0..self.cfg.trials {
            let Some(&first) = moves.choose(&mut self.rng) else { break };
            let value = self.rollout(*board, first);
            runs_sum[first.index()] += value;
            runs_ttl[first.index()] += 1;
        }
        Move::ALL.map(|dir| {
            let ttl = runs_ttl[dir.index()];
            (ttl != 0).then(|| runs_sum[dir.index()] / ttl as f64)
        })
    }

    /// Best first move by average rollout score, or `None` when no legal move
    /// exists or no average clears `score_floor`.
    pub fn best_move(&mut self, board: &Board) -> Option<Move> {
        let scores = self.move_scores(board);
        let mut best_score = self.cfg.score_floor;
        let mut best_move = None;
        for dir in Move::ALL {
            if let Some(score) = scores[dir.index()] {
                if score > best_score {
                    best_score = score;
                    best_move = Some(dir);
                }
            }
        }
        debug!("monte carlo chose {:?} (scores {:?})", best_move, scores);
        best_move
    }

    fn rollout(&mut self, mut board: Board, first: Move) -> f64 {
        let mut dir = first;
        let mut depth = 0;
        loop {
            board.apply_move(dir);
            self.states_visited += 1;
            let n_empty = board.count_empty();
            if n_empty == 0 || depth >= self.cfg.rollout_depth {
                return self.evaluator.evaluate(&board, n_empty).total;
            }
            match board.available_moves().choose(&mut self.rng) {
                Some(&next) => {
                    dir = next;
                    depth += 1;
                }
                None => return self.evaluator.evaluate(&board, n_empty).total,
            }
        }
    }
}

impl Default for MonteCarlo { fn default() -> Self { Self::new() } }

impl Policy for MonteCarlo {
    fn get_move(&mut self, board: &Board) -> Option<Move> { self.best_move(board) }

    fn states_visited(&self) -> u64 { self.states_visited }
}
