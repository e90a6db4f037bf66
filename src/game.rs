//! Play a whole game with any [`Policy`], recording per-game measures.

use std::time::Instant;

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Cell, Move};
use crate::Policy;

/// First tile whose arrival time is recorded; later milestones double it.
const FIRST_MILESTONE: u32 = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct GameOptions {
    /// Stop after this many moves.
    pub move_limit: Option<u64>,
}

/// One player move followed by the computer's spawn.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent {
    pub dir: Move,
    pub after_move: Board,
    pub after_spawn: Board,
    pub spawned: Option<Cell>,
}

/// Measures of a finished game. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub max_tile: u32,
    pub score: u64,
    pub total_moves: u64,
    pub states_visited: u64,
    pub total_time: f64,
    pub avg_move_time: f64,
    pub fastest_move: f64,
    pub longest_move: f64,
    /// (tile, seconds since start) for 8, 16, 32, ... as each first appears.
    pub time_to_reach: Vec<(u32, f64)>,
}

/// Start from two random tiles and play until no legal move remains, the
/// policy abstains, or `options.move_limit` is reached.
///
/// ```
/// use auto_2048::game::{play, GameOptions};
/// use auto_2048::monte_carlo::{MonteCarlo, MonteCarloConfig};
/// use rand::{SeedableRng, rngs::StdRng};
/// let mut policy = MonteCarlo::with_config(MonteCarloConfig { trials: 50, seed: Some(1), ..Default::default() });
/// let mut rng = StdRng::seed_from_u64(1);
/// let record = play(&mut policy, &mut rng, &GameOptions { move_limit: Some(5) }, |_| {});
/// assert!(record.total_moves <= 5);
/// ```
pub fn play<P, R, F>(policy: &mut P, rng: &mut R, options: &GameOptions, on_step: F) -> GameRecord
where
    P: Policy + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&StepEvent),
{
    play_from(starting_board(rng), policy, rng, options, on_step)
}

/// Empty board with two random tiles.
pub fn starting_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    let mut board = Board::EMPTY;
    board.insert_random_tile(rng);
    board.insert_random_tile(rng);
    board
}

/// Same as [`play`], from a caller-supplied position.
pub fn play_from<P, R, F>(mut board: Board, policy: &mut P, rng: &mut R, options: &GameOptions, mut on_step: F) -> GameRecord
where
    P: Policy + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&StepEvent),
{
    let start = Instant::now();

    let mut total_moves = 0u64;
    let mut total_moves_time = 0.0;
    let mut fastest_move: Option<f64> = None;
    let mut longest_move = 0.0f64;
    let mut time_to_reach = Vec::new();
    let mut milestone = FIRST_MILESTONE;

    while !board.is_game_over() {
        if options.move_limit.is_some_and(|limit| total_moves >= limit) {
            break;
        }
        let move_start = Instant::now();
        let dir = match policy.next_move(&board) {
            Ok(dir) => dir,
            Err(e) => {
                warn!("stopping after {} moves: {}", total_moves, e);
                break;
            }
        };
        let move_time = move_start.elapsed().as_secs_f64();
        total_moves_time += move_time;
        total_moves += 1;
        fastest_move = Some(fastest_move.map_or(move_time, |f| f.min(move_time)));
        longest_move = longest_move.max(move_time);

        board.apply_move(dir);
        let after_move = board;
        let spawned = board.insert_random_tile(rng);
        on_step(&StepEvent { dir, after_move, after_spawn: board, spawned });

        while board.max_tile() >= milestone {
            time_to_reach.push((milestone, start.elapsed().as_secs_f64()));
            milestone *= 2;
        }
    }

    let record = GameRecord {
        max_tile: board.max_tile(),
        score: board.score(),
        total_moves,
        states_visited: policy.states_visited(),
        total_time: start.elapsed().as_secs_f64(),
        avg_move_time: if total_moves > 0 { total_moves_time / total_moves as f64 } else { 0.0 },
        fastest_move: fastest_move.unwrap_or(0.0),
        longest_move,
        time_to_reach,
    };
    info!("game finished: max tile {}, {} moves, {} states", record.max_tile, record.total_moves, record.states_visited);
    record
}
