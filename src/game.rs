//! Poker Squares Engine — Game Driver
//!
//! Deals 25 cards one at a time to a [`Player`], enforces legality and the
//! per-game thinking budget, and scores the finished grid.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::card::{full_deck, Card};
use crate::grid::{Cell, Grid, NUM_CELLS};
use crate::scoring::PointSystem;

/// Default thinking budget per game.
pub const GAME_MILLIS: u64 = 30_000;

/// A Poker Squares player.
pub trait Player {
    fn name(&self) -> &str;

    /// Called before the first game, and whenever the rules change.
    fn set_point_system(&mut self, _system: &PointSystem, _game_time: Duration) {}

    /// Reset for a new game.
    fn init(&mut self);

    /// Choose an empty cell for `card`. `remaining` is what is left of this
    /// game's thinking budget.
    fn get_play(&mut self, card: Card, remaining: Duration) -> Cell;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{player} played {card} on occupied cell {cell}")]
    IllegalPlay {
        player: String,
        card: Card,
        cell: Cell,
    },
    #[error("{player} ran out of time on card {card_index}")]
    TimeExpired { player: String, card_index: usize },
    #[error("a deal needs {NUM_CELLS} distinct cards, got {cards} ({distinct} distinct)")]
    InvalidDeal { cards: usize, distinct: usize },
}

/// A finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub grid: Grid,
    pub score: i32,
    /// Cards in the order they were dealt.
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone)]
pub struct PokerSquares {
    system: PointSystem,
    game_time: Duration,
}

impl PokerSquares {
    pub fn new(system: PointSystem, game_time: Duration) -> Self {
        PokerSquares { system, game_time }
    }

    pub fn system(&self) -> &PointSystem {
        &self.system
    }

    pub fn game_time(&self) -> Duration {
        self.game_time
    }

    /// Hand `player` the rules. Call once before a series of games.
    pub fn seat<P: Player + ?Sized>(&self, player: &mut P) {
        player.set_point_system(&self.system, self.game_time);
    }

    /// Shuffle a fresh deck with `rng` and play one game.
    pub fn play<P: Player + ?Sized, R: Rng + ?Sized>(
        &self,
        player: &mut P,
        rng: &mut R,
    ) -> Result<GameRecord, GameError> {
        let mut deck = full_deck();
        deck.shuffle(rng);
        deck.truncate(NUM_CELLS);
        self.play_deal(player, deck)
    }

    /// Play one game with a fixed deal of exactly 25 distinct cards.
    pub fn play_deal<P: Player + ?Sized>(
        &self,
        player: &mut P,
        deal: Vec<Card>,
    ) -> Result<GameRecord, GameError> {
        check_deal(&deal)?;

        let mut grid = Grid::new();
        let mut remaining = self.game_time;
        player.init();

        for (card_index, &card) in deal.iter().enumerate() {
            let start = Instant::now();
            let cell = player.get_play(card, remaining);
            remaining = remaining.saturating_sub(start.elapsed());

            if remaining.is_zero() {
                return Err(GameError::TimeExpired {
                    player: player.name().to_string(),
                    card_index,
                });
            }
            if grid.get(cell).is_some() {
                return Err(GameError::IllegalPlay {
                    player: player.name().to_string(),
                    card,
                    cell,
                });
            }
            grid.set(cell, Some(card));
        }

        let score = self.system.score_grid(&grid);
        log::debug!("{} scored {}\n{}", player.name(), score, grid);
        Ok(GameRecord {
            grid,
            score,
            cards: deal,
        })
    }
}

fn check_deal(deal: &[Card]) -> Result<(), GameError> {
    let seen = deal.iter().fold(0u64, |seen, card| seen | 1u64 << card.id());
    let distinct = seen.count_ones() as usize;
    if deal.len() == NUM_CELLS && distinct == NUM_CELLS {
        Ok(())
    } else {
        Err(GameError::InvalidDeal {
            cards: deal.len(),
            distinct,
        })
    }
}

impl Default for PokerSquares {
    fn default() -> Self {
        PokerSquares::new(PointSystem::default(), Duration::from_millis(GAME_MILLIS))
    }
}

// ── Random Player ───────────────────────────────────────────────────

/// Places every card on a uniformly random empty cell.
///
/// The placement order is shuffled once per game and popped card by card.
pub struct RandomPlayer {
    rng: Xoshiro256PlusPlus,
    order: Vec<Cell>,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        RandomPlayer {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            order: Vec::with_capacity(NUM_CELLS),
        }
    }

    /// Next cell in this game's shuffled order.
    pub fn next_cell(&mut self) -> Option<Cell> {
        self.order.pop()
    }
}

impl Player for RandomPlayer {
    fn name(&self) -> &str {
        "RandomPlayer"
    }

    fn init(&mut self) {
        self.order.clear();
        self.order.extend(Cell::all());
        self.order.shuffle(&mut self.rng);
    }

    fn get_play(&mut self, _card: Card, _remaining: Duration) -> Cell {
        // An exhausted order only happens past the 25th card; the driver
        // rejects the repeated cell.
        self.next_cell().unwrap_or(Cell::ORIGIN)
    }
}
