use auto_2048::engine::{self as GameEngine, Board, Move};
use auto_2048::expectimax::{Expectimax, ExpectimaxConfig};
use auto_2048::monte_carlo::{MonteCarlo, MonteCarloConfig};
use auto_2048::Policy;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn warm() { GameEngine::new(); }

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(7777);
    let mut boards = Vec::new();
    let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    boards.push(b);
    for i in 0..32 {
        if b.apply_move(Move::ALL[i % 4]) {
            b.insert_random_tile(&mut rng);
        }
        boards.push(b);
    }
    boards
}

fn bench_expectimax(c: &mut Criterion) {
    warm();
    let boards = corpus();
    let mut ex = Expectimax::with_config(ExpectimaxConfig { max_depth: 3, ..Default::default() });

    c.bench_function("expectimax/branch_evals", |bch| {
        bch.iter(|| {
            let mut acc = 0.0;
            for bd in &boards {
                for be in ex.branch_evals(bd) {
                    if be.legal { acc += be.utility.total; }
                }
            }
            black_box(acc)
        })
    });

    c.bench_function("expectimax/best_move", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards {
                acc ^= ex.best_move(bd).map(|mv| mv.index()).unwrap_or(4);
            }
            black_box(acc)
        })
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    warm();
    let boards = corpus();
    let mut mc = MonteCarlo::with_config(MonteCarloConfig { trials: 200, seed: Some(5), ..Default::default() });
    c.bench_function("monte_carlo/best_move_200", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards {
                acc ^= mc.best_move(bd).map(|mv| mv.index()).unwrap_or(4);
            }
            black_box(acc)
        })
    });
}

fn bench_e2e(c: &mut Criterion) {
    warm();
    let mut ex = Expectimax::with_config(ExpectimaxConfig { max_depth: 3, ..Default::default() });
    c.bench_function("e2e/32_moves", |bch| {
        bch.iter(|| {
            let mut rng = StdRng::seed_from_u64(13);
            let mut b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
            let mut steps = 0;
            while steps < 32 && !b.is_game_over() {
                let Some(dir) = ex.get_move(&b) else { break };
                b.apply_move(dir);
                b.insert_random_tile(&mut rng);
                steps += 1;
            }
            black_box((b.raw(), steps))
        })
    });
}

criterion_group!(search, bench_expectimax, bench_monte_carlo, bench_e2e);
criterion_main!(search);
