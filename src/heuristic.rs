//! Board evaluators used as leaf scores by both search policies.
//!
//! The default [`SnakeEvaluator`] sums five weighted terms: a serpentine
//! position score, the largest tile, a log-scaled empty-cell bonus, a
//! monotonicity term and a (negative) smoothness term. Monotonicity and
//! smoothness only look along a single row or column at a time, so they are
//! read from a per-line table built once, like the engine's shift tables.
//!
//! [`SquaresEvaluator`] is the older sum-of-squares scoring, kept as a
//! pluggable alternative and selected through [`EvaluatorKind`].

use std::ops::{AddAssign, Div, Mul};
use std::sync::OnceLock;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::engine::{self as GameEngine, Board};

const SNAKE_WEIGHTS: [[f64; 4]; 4] = [
    [15.0, 14.0, 13.0, 12.0],
    [8.0, 9.0, 10.0, 11.0],
    [7.0, 6.0, 5.0, 4.0],
    [0.0, 1.0, 2.0, 3.0],
];
const MAX_WEIGHT: f64 = 1.0;
const EMPTY_WEIGHT: f64 = 100.0;
const MONOTONICITY_WEIGHT: f64 = 10.0;
const SMOOTHNESS_WEIGHT: f64 = 10.0;

const SQUARES_EMPTY_WEIGHT: f64 = 100_000.0;
const SQUARES_SMOOTHNESS_POWER: i32 = 3;

/// Heuristic score of a board: `total` drives move comparison, the other
/// terms are the weighted contributions kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Utility {
    pub total: f64,
    pub empty: f64,
    pub monotonicity: f64,
    pub smoothness: f64,
}

impl Utility {
    /// Starting bound for a maximizer: worse than any real evaluation.
    pub const NEG_INFINITY: Utility = Utility { total: f64::NEG_INFINITY, empty: 0.0, monotonicity: 0.0, smoothness: 0.0 };
}

impl AddAssign for Utility {
    fn add_assign(&mut self, rhs: Utility) {
        self.total += rhs.total;
        self.empty += rhs.empty;
        self.monotonicity += rhs.monotonicity;
        self.smoothness += rhs.smoothness;
    }
}

impl Div<f64> for Utility {
    type Output = Utility;

    fn div(self, rhs: f64) -> Utility {
        Utility {
            total: self.total / rhs,
            empty: self.empty / rhs,
            monotonicity: self.monotonicity / rhs,
            smoothness: self.smoothness / rhs,
        }
    }
}

impl Mul<f64> for Utility {
    type Output = Utility;

    fn mul(self, rhs: f64) -> Utility {
        Utility {
            total: self.total * rhs,
            empty: self.empty * rhs,
            monotonicity: self.monotonicity * rhs,
            smoothness: self.smoothness * rhs,
        }
    }
}

/// Maps a board (plus its empty-cell count) to a [`Utility`].
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board, n_empty: usize) -> Utility;
}

/// Selects one of the built-in evaluators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorKind {
    #[default]
    Snake,
    Squares,
}

impl EvaluatorKind {
    pub fn build(self) -> Box<dyn Evaluator> {
        match self {
            EvaluatorKind::Snake => Box::new(SnakeEvaluator),
            EvaluatorKind::Squares => Box::new(SquaresEvaluator),
        }
    }
}

/// Every weighted term of the snake evaluation, before summing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnakeTerms {
    pub snake: f64,
    pub max: f64,
    pub empty: f64,
    pub monotonicity: f64,
    pub smoothness: f64,
}

impl SnakeTerms {
    pub fn total(&self) -> f64 { self.snake + self.max + self.empty + self.monotonicity + self.smoothness }
}

/// The default multi-term evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeEvaluator;

impl SnakeEvaluator {
    /// Compute each weighted term separately.
    pub fn terms(&self, board: &Board, n_empty: usize) -> SnakeTerms {
        let grid = board.to_grid();
        let mut snake = 0.0;
        for (values, weights) in grid.iter().zip(SNAKE_WEIGHTS.iter()) {
            for (&value, &weight) in values.iter().zip(weights.iter()) {
                snake += value as f64 * weight;
            }
        }

        // ln(0) is never taken: a full board earns no empty-cell bonus.
        let empty = if n_empty > 0 { (n_empty as f64).ln() * EMPTY_WEIGHT } else { 0.0 };

        let (monotonicity, smoothness) = line_sums(board);

        SnakeTerms {
            snake,
            max: board.max_tile() as f64 * MAX_WEIGHT,
            empty,
            monotonicity: monotonicity * MONOTONICITY_WEIGHT,
            smoothness: -(smoothness * SMOOTHNESS_WEIGHT),
        }
    }
}

impl Evaluator for SnakeEvaluator {
    fn evaluate(&self, board: &Board, n_empty: usize) -> Utility {
        let terms = self.terms(board, n_empty);
        Utility {
            total: terms.total(),
            empty: terms.empty,
            monotonicity: terms.monotonicity,
            smoothness: terms.smoothness,
        }
    }
}

/// Sum of squared tiles, a linear empty-cell bonus and a cubed (negative)
/// square-root smoothness. `monotonicity` is always 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaresEvaluator;

impl Evaluator for SquaresEvaluator {
    fn evaluate(&self, board: &Board, n_empty: usize) -> Utility {
        let grid = board.to_grid();
        let mut squares = 0.0;
        let mut roots = [[0.0f64; 4]; 4];
        for (r, values) in grid.iter().enumerate() {
            for (c, &value) in values.iter().enumerate() {
                let v = value as f64;
                squares += v * v;
                roots[r][c] = v.sqrt();
            }
        }

        let mut smoothness = 0.0;
        for i in 0..4 {
            for j in 0..3 {
                smoothness -= (roots[i][j] - roots[i][j + 1]).abs();
                smoothness -= (roots[j][i] - roots[j + 1][i]).abs();
            }
        }

        let empty = n_empty as f64 * SQUARES_EMPTY_WEIGHT;
        let smooth = smoothness.powi(SQUARES_SMOOTHNESS_POWER);
        Utility { total: squares + empty + smooth, empty, monotonicity: 0.0, smoothness: smooth }
    }
}

#[derive(Clone, Copy, Default)]
struct LineTerms {
    monotonicity: f64,
    smoothness: f64,
}

static LINE_TERMS: OnceLock<Box<[LineTerms]>> = OnceLock::new();

/// Build the per-line table eagerly. Safe to call multiple times.
pub(crate) fn warm() {
    let _ = line_terms();
}

fn line_terms() -> &'static [LineTerms] {
    LINE_TERMS
        .get_or_init(|| {
            let mut v = vec![LineTerms::default(); 0x1_0000];
            for (i, slot) in v.iter_mut().enumerate() {
                let tiles = GameEngine::line_to_vec(i as u64);
                *slot = LineTerms { monotonicity: calc_monotonicity(&tiles), smoothness: calc_smoothness(&tiles) };
            }
            v.into_boxed_slice()
        })
        .as_ref()
}

/// Unweighted monotonicity and smoothness summed over all rows and columns.
fn line_sums(board: &Board) -> (f64, f64) {
    let table = line_terms();
    let transpose_board = GameEngine::transpose(board.raw());
    (0..4).fold((0.0, 0.0), |(mono, smooth), line_idx| {
        let row = table[GameEngine::extract_line(board.raw(), line_idx) as usize];
        let col = table[GameEngine::extract_line(transpose_board, line_idx) as usize];
        (mono + row.monotonicity + col.monotonicity, smooth + row.smoothness + col.smoothness)
    })
}

// Exponents are log2 of the tile values; empty cells count as 0.
fn calc_monotonicity(line: &[u64]) -> f64 {
    line.windows(2).map(|pair| (pair[0] as f64 - pair[1] as f64).abs()).sum()
}

// Each tile is compared with the nearest occupied cell after it, skipping gaps.
fn calc_smoothness(line: &[u64]) -> f64 {
    let mut smoothness = 0.0;
    for (i, &tile) in line.iter().enumerate() {
        if tile == 0 {
            continue;
        }
        if let Some(&next) = line[i + 1..].iter().find(|&&t| t != 0) {
            smoothness += (tile as f64 - next as f64).abs();
        }
    }
    smoothness
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_row(values: [u32; 4]) -> Board {
        Board::from_grid(&[values, [0; 4], [0; 4], [0; 4]]).unwrap()
    }

    fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

    #[test]
    fn empty_board_scores_only_empty_cells() {
        let terms = SnakeEvaluator.terms(&Board::EMPTY, 16);
        assert!(close(terms.empty, 16f64.ln() * 100.0));
        assert_eq!(terms.max, 0.0);
        assert_eq!(terms.snake, 0.0);
        let u = SnakeEvaluator.evaluate(&Board::EMPTY, 16);
        assert!(close(u.empty, 16f64.ln() * 100.0));
        assert!(close(u.total, u.empty));
        assert_eq!(u.monotonicity, 0.0);
        assert_eq!(u.smoothness, 0.0);
    }

    #[test]
    fn full_board_has_no_empty_bonus() {
        let grid = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];
        let b = Board::from_grid(&grid).unwrap();
        let u = SnakeEvaluator.evaluate(&b, 0);
        assert_eq!(u.empty, 0.0);
        assert!(u.total.is_finite());
    }

    #[test]
    fn snake_terms_for_ascending_top_row() {
        let b = top_row([2, 4, 8, 16]);
        let terms = SnakeEvaluator.terms(&b, 12);
        assert!(close(terms.snake, 2.0 * 15.0 + 4.0 * 14.0 + 8.0 * 13.0 + 16.0 * 12.0));
        assert!(close(terms.max, 16.0));
        // rows: 1 + 1 + 1; columns: 1, 2, 3, 4 against empty cells
        assert!(close(terms.monotonicity, 13.0 * 10.0));
        assert!(close(terms.smoothness, -30.0));
        let u = SnakeEvaluator.evaluate(&b, 12);
        assert!(close(u.total, 382.0 + 16.0 + 12f64.ln() * 100.0 + 130.0 - 30.0));
    }

    #[test]
    fn smoothness_skips_gaps() {
        assert!(close(calc_smoothness(&[1, 0, 0, 3]), 2.0));
        assert!(close(calc_smoothness(&[1, 2, 0, 1]), 2.0));
        assert!(close(calc_smoothness(&[0, 0, 0, 5]), 0.0));
        assert!(close(calc_smoothness(&[4, 4, 4, 4]), 0.0));
    }

    #[test]
    fn monotonicity_uses_adjacent_pairs() {
        assert!(close(calc_monotonicity(&[1, 2, 3, 4]), 3.0));
        assert!(close(calc_monotonicity(&[3, 1, 3, 1]), 6.0));
        assert!(close(calc_monotonicity(&[2, 0, 0, 0]), 2.0));
    }

    #[test]
    fn squares_variant() {
        let b = top_row([4, 0, 0, 0]);
        let u = SquaresEvaluator.evaluate(&b, 15);
        assert!(close(u.empty, 1_500_000.0));
        assert!(close(u.smoothness, -64.0));
        assert_eq!(u.monotonicity, 0.0);
        assert!(close(u.total, 16.0 + 1_500_000.0 - 64.0));
    }

    #[test]
    fn kinds_build_matching_evaluators() {
        let b = top_row([2, 2, 0, 0]);
        assert_eq!(EvaluatorKind::Snake.build().evaluate(&b, 14), SnakeEvaluator.evaluate(&b, 14));
        assert_eq!(EvaluatorKind::Squares.build().evaluate(&b, 14), SquaresEvaluator.evaluate(&b, 14));
        assert_eq!(EvaluatorKind::default(), EvaluatorKind::Snake);
    }

    #[test]
    fn utility_averaging() {
        let mut acc = Utility::default();
        acc += Utility { total: 2.0, empty: 4.0, monotonicity: 6.0, smoothness: -8.0 };
        acc += Utility { total: 4.0, empty: 0.0, monotonicity: 2.0, smoothness: 0.0 };
        assert_eq!(acc / 2.0, Utility { total: 3.0, empty: 2.0, monotonicity: 4.0, smoothness: -4.0 });
    }
}
