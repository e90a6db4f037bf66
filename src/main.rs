use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use auto_2048::config::{AgentConfig, PolicyKind};
use auto_2048::engine as GameEngine;
use auto_2048::game::{self, GameOptions};
use auto_2048::heuristic::EvaluatorKind;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

#[derive(Debug, Parser)]
#[command(name = "auto-2048", about = "Play one game of 2048 and print every turn")]
struct Args {
    /// Decision policy
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Board evaluator used by the policy
    #[arg(long, value_enum)]
    evaluator: Option<EvaluatorKind>,

    /// JSON agent config; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for tile spawns (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between turns, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Stop after this many moves
    #[arg(long)]
    max_moves: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    GameEngine::new();

    let mut cfg = match &args.config {
        Some(path) => AgentConfig::from_json_file(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if let Some(policy) = args.policy {
        cfg.policy = policy;
    }
    if let Some(kind) = args.evaluator {
        cfg = cfg.with_evaluator(kind);
    }

    let mut policy = cfg.build_policy();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let delay = Duration::from_millis(args.delay_ms);

    let board = game::starting_board(&mut rng);
    println!("{}", board);
    let options = GameOptions { move_limit: args.max_moves };
    let record = game::play_from(board, policy.as_mut(), &mut rng, &options, |ev| {
        println!("Player's Turn: {}", ev.dir);
        println!("{}", ev.after_move);
        println!("Computer's Turn");
        println!("{}", ev.after_spawn);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    });

    println!("GAME OVER (max tile): {}", record.max_tile);
    println!(
        "Moves made: {}, States considered: {}, Score: {}, Total time: {:.3}s",
        record.total_moves, record.states_visited, record.score, record.total_time
    );
    Ok(())
}
