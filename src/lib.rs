//! Poker Squares Engine — Crate Root
//!
//! Monte Carlo move selection for Poker Squares: 25 cards, dealt one at a
//! time, each placed for good on a 5×5 grid, scored over the five rows and
//! five columns as poker hands. Plus the self-play trainer that learns the
//! partial-line values the selector's rollouts are scored with.
//!
//! ## Architecture
//!
//! ```text
//! bin/squares.rs                    CLI: train / play / export
//!     │
//!     ▼
//! lib.rs  ──────────────────────────  This file (re-exports, logging)
//!     ├── card.rs                    Card ids, text form, deck
//!     ├── grid.rs                    5×5 grid, cells, the ten lines
//!     ├── evaluator.rs               Final-hand classifier (bitwise)
//!     ├── scoring.rs                 British / American / custom points
//!     ├── reachable.rs               Which hands a partial line can still make
//!     ├── encoding.rs                Line → compact table key
//!     ├── board.rs                   Reversible board + undealt pool
//!     ├── table.rs                   Heuristic table (play + training)
//!     ├── rollout.rs                 Depth-limited random playouts
//!     ├── selector.rs                Time-budgeted Monte Carlo player
//!     ├── game.rs                    Game driver, Player trait
//!     ├── trainer.rs                 Self-play trainer
//!     └── config.rs                  JSON engine config
//! ```

pub mod board;
pub mod card;
pub mod config;
pub mod encoding;
pub mod evaluator;
pub mod game;
pub mod grid;
pub mod reachable;
pub mod rollout;
pub mod scoring;
pub mod selector;
pub mod table;
pub mod trainer;

pub use board::{Board, BoardError};
pub use card::{Card, ParseCardError};
pub use config::{ConfigError, EngineConfig};
pub use encoding::{encode, LineEncoding};
pub use evaluator::{classify, HandCategory};
pub use game::{GameError, GameRecord, Player, PokerSquares, RandomPlayer};
pub use grid::{Cell, Grid};
pub use reachable::{LineRules, Outlook, Reachable};
pub use rollout::{Estimator, RolloutEngine};
pub use scoring::PointSystem;
pub use selector::MonteCarloPlayer;
pub use table::{HeuristicTable, TableError, TrainingTable};
pub use trainer::{train, TrainError, Trainer, TrainerConfig, TrainingReport};

/// Set up `env_logger` (default filter `info`, `RUST_LOG` overrides).
/// Safe to call more than once.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .ok();
}

/// Return the engine version string.
pub fn version() -> String {
    format!("poker-squares-engine v{}", env!("CARGO_PKG_VERSION"))
}
