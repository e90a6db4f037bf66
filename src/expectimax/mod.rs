//! Depth-adaptive Expectimax search policy for 2048.
//!
//! The search alternates two node kinds over copies of the board:
//! - max nodes try every legal move and keep the best chance-node utility;
//! - chance nodes place every possible spawn (a 2 or a 4 in each empty cell)
//!   and average the max-node utilities of the results.
//!
//! Depth adapts to how open the board is: a chance node with at least
//! `shallow_min_empty` free cells stops at `shallow_depth`, any chance node
//! stops at `max_depth`. Leaves are scored with the configured evaluator.
//!
//! Notes
//! - Expectimax is deterministic; randomness only occurs when the driver
//!   inserts the real spawn with `Board::insert_random_tile`.
//! - There is no transposition table; repeated states are searched again.
//!
//! Quick start
//! ```
//! use auto_2048::engine::{Board, Move};
//! use auto_2048::expectimax::Expectimax;
//! use auto_2048::Policy;
//!
//! // Only DOWN changes this board.
//! let b = Board::from_grid(&[[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]]).unwrap();
//! let mut ex = Expectimax::new();
//! assert_eq!(ex.get_move(&b), Some(Move::Down));
//! assert!(ex.states_visited() > 0);
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Move};
use crate::heuristic::{self, EvaluatorKind, Utility};

mod search;

pub use search::Expectimax;

/// How a chance node combines the utilities of its spawn hypotheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChanceWeighting {
    /// Plain mean over all `2 * n_empty` hypotheses; the 0.9/0.1 spawn odds are ignored.
    #[default]
    Uniform,
    /// Probability-weighted expectation: 0.9 for a 2, 0.1 for a 4, split evenly across cells.
    Weighted,
}

/// Configurable knobs for Expectimax. Defaults reproduce the standard policy.
///
/// - `evaluator`: leaf scoring function.
/// - `shallow_depth` / `shallow_min_empty`: cut off at `shallow_depth` once a
///   chance node has at least `shallow_min_empty` empty cells.
/// - `max_depth`: unconditional cutoff depth for chance nodes.
/// - `chance_weighting`: see [`ChanceWeighting`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectimaxConfig {
    pub evaluator: EvaluatorKind,
    pub shallow_depth: u32,
    pub shallow_min_empty: usize,
    pub max_depth: u32,
    pub chance_weighting: ChanceWeighting,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorKind::Snake,
            shallow_depth: 3,
            shallow_min_empty: 6,
            max_depth: 5,
            chance_weighting: ChanceWeighting::Uniform,
        }
    }
}

/// Per-branch utility at the root.
///
/// - `utility` is the chance-node utility after taking `dir` from the current board.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub utility: Utility,
    pub legal: bool,
}

/// Basic search stats.
///
/// `nodes` counts the candidate moves examined by the last search call and
/// `peak_nodes` the largest such count since construction or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

/// Common helper for constructors to ensure tables are initialized.
fn warm_engine_and_heuristics() {
    // Safe to call multiple times.
    engine::new();
    heuristic::warm();
}
