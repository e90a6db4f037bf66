use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use auto_2048::config::{AgentConfig, PolicyKind};
use auto_2048::engine as GameEngine;
use auto_2048::game::{self, GameOptions, GameRecord};
use auto_2048::heuristic::EvaluatorKind;
use auto_2048::report::{self, BatchSummary};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "batch", about = "Play many games in parallel and write per-game and average logs")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Worker threads (defaults to RAYON_NUM_THREADS or the number of cores)
    #[arg(long)]
    jobs: Option<usize>,

    /// Directory for the log files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Suffix for output files: output{tag}.log, average{tag}.log
    #[arg(long, default_value = "")]
    tag: String,

    /// Decision policy
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,

    /// Board evaluator used by the policy
    #[arg(long, value_enum)]
    evaluator: Option<EvaluatorKind>,

    /// JSON agent config; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base seed; game i uses seed + i for its spawns
    #[arg(long)]
    seed: Option<u64>,

    /// Per-game: stop after this many moves
    #[arg(long)]
    move_limit: Option<u64>,

    /// Also write the summary as JSON to average{tag}.json
    #[arg(long)]
    json: bool,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
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

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global().context("configuring thread pool")?;
    }

    fs::create_dir_all(&args.out_dir).with_context(|| format!("creating {}", args.out_dir.display()))?;
    let game_log = args.out_dir.join(format!("output{}.log", args.tag));
    let average_log = args.out_dir.join(format!("average{}.log", args.tag));
    fs::File::create(&game_log).with_context(|| format!("truncating {}", game_log.display()))?;

    info!(
        "playing {} games with {:?} on {} threads",
        args.games,
        cfg.policy,
        rayon::current_num_threads()
    );

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} {elapsed_precise} [{bar:40}] {pos}/{len} games | {msg}")?
                .progress_chars("=> "),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let options = GameOptions { move_limit: args.move_limit };
    let records: Vec<GameRecord> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let mut policy = cfg.build_policy();
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_entropy(),
            };
            let record = game::play(policy.as_mut(), &mut rng, &options, |_| {});
            pb.inc(1);
            pb.set_message(format!("last max tile: {}", record.max_tile));
            record
        })
        .collect();
    pb.finish_and_clear();

    for record in &records {
        report::append_game_log(&game_log, record).with_context(|| format!("writing {}", game_log.display()))?;
    }

    let Some(summary) = BatchSummary::from_records(&records) else {
        info!("no games played; nothing to summarize");
        return Ok(());
    };
    report::write_summary_file(&average_log, &summary).with_context(|| format!("writing {}", average_log.display()))?;
    if args.json {
        let json_path = args.out_dir.join(format!("average{}.json", args.tag));
        report::write_summary_json(&json_path, &summary).with_context(|| format!("writing {}", json_path.display()))?;
    }

    println!(
        "Games: {} | most common max tile: {} | avg moves: {:.1} | avg time: {:.3}s",
        summary.games, summary.most_common_max_tile, summary.avg_total_moves, summary.avg_total_time
    );
    Ok(())
}
