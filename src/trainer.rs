//! Poker Squares Engine — Self-play Trainer
//!
//! Builds the heuristic table: play complete games with a uniformly random
//! placement policy, remember the encoding of every line after every
//! placement, and once the final score is known fold it into the running
//! mean of each remembered encoding.
//!
//! ## Batches
//!
//! Games are played `jobs` at a time on the rayon pool. Game `g` draws its
//! deal and its placements from RNGs derived from `seed` and `g` only, so a
//! batch is reproducible regardless of scheduling. Results are folded into
//! the [`TrainingTable`] on the calling thread in game order; the table has a
//! single writer. The wall-clock deadline is checked between batches, never
//! inside a game.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::card::Card;
use crate::encoding::{encode, LineEncoding};
use crate::game::{GameError, Player, PokerSquares};
use crate::grid::{Cell, Grid, NUM_CELLS, NUM_LINES};
use crate::scoring::PointSystem;
use crate::table::{TableError, TrainingTable};

const PROGRESS_EVERY: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("self-play game failed: {0}")]
    Game(#[from] GameError),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Wall-clock training budget.
    pub duration: Duration,
    pub seed: u64,
    /// Games per batch; 1 plays strictly one game at a time.
    pub jobs: usize,
    pub output: PathBuf,
    pub point_system: PointSystem,
}

impl TrainerConfig {
    pub fn new(duration: Duration, output: impl Into<PathBuf>) -> Self {
        TrainerConfig {
            duration,
            seed: 0,
            jobs: 1,
            output: output.into(),
            point_system: PointSystem::default(),
        }
    }
}

/// What a finished training run learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingReport {
    pub encodings: usize,
    pub max_score: i32,
    pub games: u64,
}

/// One self-play game: final score plus every encoding seen along the way.
#[derive(Debug, Clone)]
pub struct GameSample {
    pub score: i32,
    pub encodings: Vec<LineEncoding>,
}

// ── Recording Player ────────────────────────────────────────────────

/// Random placement policy that keeps its own copy of the grid and records
/// the encoding of all ten lines after each placement.
pub struct RecordingPlayer {
    rng: Xoshiro256PlusPlus,
    order: Vec<Cell>,
    grid: Grid,
    plays: usize,
    encodings: Vec<LineEncoding>,
}

impl RecordingPlayer {
    pub fn new(rng: Xoshiro256PlusPlus) -> Self {
        RecordingPlayer {
            rng,
            order: Vec::with_capacity(NUM_CELLS),
            grid: Grid::new(),
            plays: 0,
            encodings: Vec::with_capacity(NUM_CELLS * NUM_LINES),
        }
    }

    pub fn encodings(&self) -> &[LineEncoding] {
        &self.encodings
    }

    pub fn take_encodings(&mut self) -> Vec<LineEncoding> {
        std::mem::take(&mut self.encodings)
    }
}

impl Player for RecordingPlayer {
    fn name(&self) -> &str {
        "RecordingPlayer"
    }

    fn init(&mut self) {
        self.order.clear();
        self.order.extend(Cell::all());
        self.order.shuffle(&mut self.rng);
        self.grid.clear();
        self.plays = 0;
        self.encodings.clear();
    }

    fn get_play(&mut self, card: Card, _remaining: Duration) -> Cell {
        let cell = self.order.pop().unwrap_or(Cell::ORIGIN);
        self.grid.set(cell, Some(card));
        self.plays += 1;
        let plays = self.plays;
        self.encodings
            .extend(self.grid.lines().map(|line| encode(&line, plays)));
        cell
    }
}

/// Deal and placement RNGs for game number `game`.
fn game_rngs(seed: u64, game: u64) -> (Xoshiro256PlusPlus, Xoshiro256PlusPlus) {
    let deal = Xoshiro256PlusPlus::seed_from_u64(seed ^ game.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let mut place = deal.clone();
    place.jump();
    (deal, place)
}

/// Play game number `game` of a run seeded with `seed`.
pub fn play_game(seed: u64, game: u64, system: &PointSystem) -> Result<GameSample, GameError> {
    let (mut deal_rng, place_rng) = game_rngs(seed, game);
    let driver = PokerSquares::new(system.clone(), Duration::MAX);
    let mut player = RecordingPlayer::new(place_rng);
    driver.seat(&mut player);
    let record = driver.play(&mut player, &mut deal_rng)?;
    Ok(GameSample {
        score: record.score,
        encodings: player.take_encodings(),
    })
}

// ── Trainer ─────────────────────────────────────────────────────────

pub struct Trainer {
    config: TrainerConfig,
    table: TrainingTable,
    games: u64,
    max_score: Option<i32>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer {
            config,
            table: TrainingTable::new(),
            games: 0,
            max_score: None,
        }
    }

    pub fn table(&self) -> &TrainingTable {
        &self.table
    }

    pub fn games(&self) -> u64 {
        self.games
    }

    pub fn report(&self) -> TrainingReport {
        TrainingReport {
            encodings: self.table.len(),
            max_score: self.max_score.unwrap_or(0),
            games: self.games,
        }
    }

    /// Play the next `jobs` games and fold them into the table.
    pub fn run_batch(&mut self) -> Result<(), GameError> {
        let jobs = self.config.jobs.max(1) as u64;
        let first = self.games;
        let seed = self.config.seed;
        let system = &self.config.point_system;

        let samples = (first..first + jobs)
            .into_par_iter()
            .map(|game| play_game(seed, game, system))
            .collect::<Result<Vec<_>, _>>()?;

        for sample in samples {
            self.absorb(&sample);
        }
        Ok(())
    }

    fn absorb(&mut self, sample: &GameSample) {
        let score = sample.score as f64;
        for &key in &sample.encodings {
            self.table.observe(key, score);
        }
        self.max_score = Some(self.max_score.map_or(sample.score, |m| m.max(sample.score)));
        self.games += 1;
    }

    /// Train until the configured duration runs out, then save the
    /// flattened table to the output path.
    pub fn run(mut self) -> Result<TrainingReport, TrainError> {
        let start = Instant::now();
        let deadline = deadline_after(start, self.config.duration);
        let mut next_progress = start + PROGRESS_EVERY;
        log::info!(
            "Training for {:?} ({} jobs, seed {}, {})",
            self.config.duration,
            self.config.jobs.max(1),
            self.config.seed,
            self.config.point_system
        );

        while deadline.map_or(true, |d| Instant::now() < d) {
            self.run_batch()?;

            let now = Instant::now();
            if now >= next_progress {
                let left = match deadline {
                    Some(d) => format!("{:.0}s left", d.saturating_duration_since(now).as_secs_f64()),
                    None => "no deadline".to_string(),
                };
                log::info!(
                    "{} games, {} encodings, max score {}, {left}",
                    self.games,
                    self.table.len(),
                    self.max_score.unwrap_or(0),
                );
                next_progress = now + PROGRESS_EVERY;
            }
        }

        self.table.flatten().save(&self.config.output)?;
        let report = self.report();
        log::info!(
            "Training done: {} games, {} encodings, max score {}",
            report.games,
            report.encodings,
            report.max_score
        );
        Ok(report)
    }
}

/// `start + duration`, or `None` when that lies past what `Instant` can
/// represent; such a run only stops when the process does.
fn deadline_after(start: Instant, duration: Duration) -> Option<Instant> {
    start.checked_add(duration)
}

/// Train with `config` and persist the table.
pub fn train(config: TrainerConfig) -> Result<TrainingReport, TrainError> {
    Trainer::new(config).run()
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::HeuristicTable;

    fn config(jobs: usize, dir: &tempfile::TempDir) -> TrainerConfig {
        TrainerConfig {
            duration: Duration::ZERO,
            seed: 7,
            jobs,
            output: dir.path().join("table.json"),
            point_system: PointSystem::British,
        }
    }

    #[test]
    fn test_game_records_every_line_after_every_play() {
        let sample = play_game(1, 0, &PointSystem::British).unwrap();
        assert_eq!(sample.encodings.len(), NUM_CELLS * NUM_LINES);
        assert!(sample.encodings.iter().take(NUM_LINES).all(|e| e.plays() == 1));
        assert!(sample.encodings.iter().skip(24 * NUM_LINES).all(|e| e.plays() == 25));
    }

    #[test]
    fn test_games_are_reproducible() {
        let a = play_game(3, 11, &PointSystem::American).unwrap();
        let b = play_game(3, 11, &PointSystem::American).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.encodings, b.encodings);
    }

    #[test]
    fn test_batch_means_match_scores() {
        let dir = tempfile::tempdir().unwrap();
        let mut trainer = Trainer::new(config(4, &dir));
        trainer.run_batch().unwrap();
        assert_eq!(trainer.games(), 4);

        // Every game sees the empty-board-after-one-play encodings for the
        // eight lines the first card misses, so that key averages all four.
        let samples: Vec<_> = (0..4)
            .map(|g| play_game(7, g, &PointSystem::British).unwrap())
            .collect();
        let mean = samples.iter().map(|s| s.score as f64).sum::<f64>() / 4.0;
        let empty = encode(&[None; 5], 1);
        let stat = trainer.table().get(empty).unwrap();
        assert_eq!(stat.count, 4 * 8);
        assert!((stat.mean - mean).abs() < 1e-9, "mean {} vs {}", stat.mean, mean);

        let best = samples.iter().map(|s| s.score).max().unwrap();
        assert_eq!(trainer.report().max_score, best);
    }

    #[test]
    fn test_jobs_do_not_change_results() {
        let dir = tempfile::tempdir().unwrap();
        let mut wide = Trainer::new(config(4, &dir));
        wide.run_batch().unwrap();
        let mut narrow = Trainer::new(config(1, &dir));
        for _ in 0..4 {
            narrow.run_batch().unwrap();
        }
        assert_eq!(wide.report(), narrow.report());
        let a = wide.table().flatten();
        let b = narrow.table().flatten();
        for (key, score) in a.iter() {
            let other = b.get(key).unwrap();
            assert!((score - other).abs() < 1e-9);
        }
    }

    #[test]
    fn test_huge_duration_has_no_deadline() {
        let now = Instant::now();
        assert_eq!(deadline_after(now, Duration::MAX), None);
        assert_eq!(deadline_after(now, Duration::from_secs_f64(2e17 * 60.0)), None);
        assert_eq!(
            deadline_after(now, Duration::from_secs(60)),
            Some(now + Duration::from_secs(60))
        );
    }

    #[test]
    fn test_run_saves_table() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainerConfig {
            duration: Duration::from_millis(50),
            ..config(2, &dir)
        };
        let output = cfg.output.clone();
        let report = train(cfg).unwrap();

        assert!(report.games >= 2, "at least one batch runs");
        let saved = HeuristicTable::load(&output).unwrap();
        assert_eq!(saved.len(), report.encodings);
    }
}
