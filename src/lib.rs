//! auto-2048: a 2048 board engine + search policies that play it
//!
//! This crate provides:
//! - A compact `Board` type (`engine` module): slide/merge moves, legality and empty-cell queries, tile insertion
//! - Board evaluators (`heuristic` module): the default snake evaluator and a sum-of-squares alternative
//! - A depth-adaptive Expectimax policy (`expectimax` module)
//! - A Monte Carlo rollout policy (`monte_carlo` module)
//! - A game loop and batch reports for drivers (`game`, `report` modules)
//!
//! Quick start:
//! ```
//! use auto_2048::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let before = b;
//! let changed = b.apply_move(Move::Left);
//! assert_eq!(changed, before != b);
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use auto_2048::engine::Board;
//! use auto_2048::expectimax::Expectimax;
//! use auto_2048::Policy;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // 1) Initialize the policy
//! let mut policy = Expectimax::new();
//! let mut rng = StdRng::seed_from_u64(123);
//!
//! // 2) Start board with two random tiles (deterministic via seeded RNG)
//! let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let mut moves = 0u32;
//!
//! // 3) Loop a couple of moves to demonstrate flow (keep doctests fast)
//! while !b.is_game_over() && moves < 4 {
//!     if let Some(dir) = policy.get_move(&b) {
//!         b.apply_move(dir);
//!         b.insert_random_tile(&mut rng);
//!         moves += 1;
//!     } else {
//!         break;
//!     }
//! }
//!
//! // 4) Inspect final state
//! assert!(moves > 0 && b.max_tile() >= 2);
//! ```
//!
pub mod config;
pub mod engine;
pub mod error;
pub mod expectimax;
pub mod game;
pub mod heuristic;
pub mod monte_carlo;
pub mod report;

use crate::engine::{Board, Move};
use crate::error::{EngineError, Result};

/// A move-choosing policy. Drivers only need these calls plus the board's
/// own `apply_move` / `insert_random_tile`.
pub trait Policy {
    /// Next move for `board`, or `None` when the policy has nothing to play.
    fn get_move(&mut self, board: &Board) -> Option<Move>;

    /// Candidate states examined since construction. Never decreases.
    fn states_visited(&self) -> u64;

    /// Like [`Policy::get_move`], but says why no move came back.
    fn next_move(&mut self, board: &Board) -> Result<Move> {
        if board.is_game_over() {
            return Err(EngineError::NoLegalMove);
        }
        self.get_move(board).ok_or(EngineError::NoDecision)
    }
}
