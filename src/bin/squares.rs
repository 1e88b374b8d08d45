//! `squares` — train, play and inspect Poker Squares heuristic tables.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use poker_squares::selector::MonteCarloPlayer;
use poker_squares::{EngineConfig, HeuristicTable, PokerSquares, TrainerConfig};

#[derive(Parser)]
#[command(name = "squares")]
#[command(about = "Poker Squares Monte Carlo engine: self-play training and play")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn a heuristic table by random self-play for a fixed wall-clock time
    Train {
        /// Training time in minutes (fractions allowed)
        #[arg(value_parser = parse_minutes)]
        minutes: Duration,
        /// Where to write the table (overrides config `table_path`)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// RNG seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,
        /// Games played in parallel per batch
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
        /// JSON engine config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Play games with the Monte Carlo player and report scores
    Play {
        /// Number of games
        #[arg(short, long, default_value_t = 1)]
        games: u32,
        /// Heuristic table to load (overrides config `table_path`)
        #[arg(short, long)]
        table: Option<PathBuf>,
        /// Rollout depth (overrides config)
        #[arg(long)]
        depth: Option<usize>,
        /// RNG seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,
        /// JSON engine config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print a heuristic table as `encoding,score` CSV, sorted by encoding
    Export {
        /// Heuristic table to read
        table: PathBuf,
    },
}

fn parse_minutes(s: &str) -> Result<Duration, String> {
    let minutes: f64 = s.parse().map_err(|e| format!("not a number: {e}"))?;
    if !(minutes.is_finite() && minutes > 0.0) {
        return Err(format!("training time must be a positive number of minutes, got {s}"));
    }
    Duration::try_from_secs_f64(minutes * 60.0)
        .map_err(|e| format!("training time of {s} minutes is out of range: {e}"))
}

fn main() -> Result<(), Box<dyn Error>> {
    poker_squares::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            minutes,
            output,
            seed,
            jobs,
            config,
        } => run_train(minutes, output, seed, jobs, config.as_deref()),
        Commands::Play {
            games,
            table,
            depth,
            seed,
            config,
        } => run_play(games, table, depth, seed, config.as_deref()),
        Commands::Export { table } => run_export(&table),
    }
}

fn run_train(
    duration: Duration,
    output: Option<PathBuf>,
    seed: Option<u64>,
    jobs: usize,
    config: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let mut config = EngineConfig::load_or_default(config)?;
    if seed.is_some() {
        config.seed = seed;
    }

    let trainer = TrainerConfig {
        duration,
        seed: config.seed_or_entropy(),
        jobs,
        output: output.unwrap_or(config.table_path),
        point_system: config.point_system,
    };
    let report = poker_squares::train(trainer)?;

    println!("games: {}", report.games);
    println!("encodings: {}", report.encodings);
    println!("max score: {}", report.max_score);
    Ok(())
}

fn run_play(
    games: u32,
    table: Option<PathBuf>,
    depth: Option<usize>,
    seed: Option<u64>,
    config: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let mut config = EngineConfig::load_or_default(config)?;
    if let Some(path) = table {
        config.table_path = path;
    }
    if let Some(depth) = depth {
        config.depth_limit = depth;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let table = Arc::new(HeuristicTable::load(&config.table_path)?);
    let seed = config.seed_or_entropy();
    let driver = PokerSquares::new(config.point_system.clone(), config.game_time());
    let mut player = MonteCarloPlayer::with_table(
        table,
        config.point_system.clone(),
        config.depth_limit,
        seed,
    )
    .with_budget_divisions(config.budget_divisions);
    driver.seat(&mut player);

    let mut deal_rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(1));
    let mut scores = Vec::with_capacity(games as usize);
    for game in 1..=games {
        let record = driver.play(&mut player, &mut deal_rng)?;
        log::info!("game {game}: {}", record.score);
        println!("{}", record.grid);
        println!("score: {}", record.score);
        scores.push(record.score);
    }

    if let (Some(min), Some(max)) = (scores.iter().min(), scores.iter().max()) {
        let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
        println!("games: {}  mean: {mean:.2}  min: {min}  max: {max}", scores.len());
    }
    Ok(())
}

fn run_export(path: &Path) -> Result<(), Box<dyn Error>> {
    let table = HeuristicTable::load(path)?;
    for (encoding, score) in table.to_sorted() {
        println!("{encoding},{score}");
    }
    Ok(())
}
