//! Poker Squares Engine — Monte Carlo Move Selector
//!
//! For each empty cell: place the card tentatively, average as many
//! estimator calls as fit in that cell's slice of the clock, take the card
//! back. The cell with the best mean wins; ties are broken uniformly at
//! random.
//!
//! ## Time Budget
//!
//! With `n` open cells (counting the one about to be filled) and `k`
//! budget divisions, each candidate cell gets `remaining / nᵏ`. The default
//! `k = 2` spends only `1/n` of the fair per-move share on this move, which
//! leaves slack for the driver's overhead and later, wider decisions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::Board;
use crate::card::Card;
use crate::game::Player;
use crate::grid::Cell;
use crate::rollout::{Estimator, RolloutEngine};
use crate::scoring::PointSystem;
use crate::table::HeuristicTable;

pub const DEFAULT_DEPTH_LIMIT: usize = 3;
pub const DEFAULT_BUDGET_DIVISIONS: u32 = 2;

/// Per-candidate allowance: `remaining` divided by `open_cells`, `divisions` times.
pub fn per_cell_budget(remaining: Duration, open_cells: usize, divisions: u32) -> Duration {
    let n = open_cells.max(1) as u32;
    (0..divisions).fold(remaining, |budget, _| budget / n)
}

/// Collect every cell whose score equals the maximum into `ties` and return
/// that maximum.
///
/// Cells that never got a sample carry `f64::NEG_INFINITY`; they only end up
/// in the tie set when no cell was sampled at all.
pub fn best_cells(scores: &[(Cell, f64)], ties: &mut Vec<Cell>) -> f64 {
    ties.clear();
    let mut max = f64::NEG_INFINITY;
    for &(cell, score) in scores {
        if score >= max {
            if score > max {
                ties.clear();
            }
            ties.push(cell);
            max = score;
        }
    }
    max
}

pub struct MonteCarloPlayer<E = RolloutEngine> {
    board: Board,
    estimator: E,
    rng: Xoshiro256PlusPlus,
    budget_divisions: u32,
    scores: Vec<(Cell, f64)>,
    ties: Vec<Cell>,
}

impl MonteCarloPlayer<RolloutEngine> {
    /// Rollout-driven player over a loaded table.
    pub fn with_table(
        table: Arc<HeuristicTable>,
        system: PointSystem,
        depth_limit: usize,
        seed: u64,
    ) -> Self {
        MonteCarloPlayer::new(RolloutEngine::new(table, system, depth_limit), seed)
    }
}

impl<E: Estimator> MonteCarloPlayer<E> {
    pub fn new(estimator: E, seed: u64) -> Self {
        MonteCarloPlayer {
            board: Board::new(),
            estimator,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            budget_divisions: DEFAULT_BUDGET_DIVISIONS,
            scores: Vec::new(),
            ties: Vec::new(),
        }
    }

    pub fn with_budget_divisions(mut self, divisions: u32) -> Self {
        self.budget_divisions = divisions;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Pick a cell for `card`, commit it to the board and return it.
    pub fn select_move(&mut self, card: Card, remaining: Duration) -> Cell {
        let open = self.board.remaining_cells();
        if open <= 1 {
            let cell = self.board.empty_cells().first().copied().unwrap_or(Cell::ORIGIN);
            self.commit(card, cell);
            return cell;
        }

        let budget = per_cell_budget(remaining, open, self.budget_divisions);
        let mut scores = std::mem::take(&mut self.scores);
        scores.clear();
        let mut rollouts = 0u64;

        for i in 0..open {
            let cell = self.board.empty_cells()[i];
            if let Err(e) = self.board.apply(card, cell) {
                log::warn!("cannot try {card} on {cell}: {e}");
                continue;
            }
            let deadline = Instant::now() + budget;
            let mut total = 0.0;
            let mut count = 0u64;
            while Instant::now() < deadline {
                total += self.estimator.estimate(&mut self.board, &mut self.rng);
                count += 1;
            }
            self.board.undo();

            let mean = if count == 0 {
                log::trace!("no rollout finished for {card} on {cell} within {budget:?}");
                f64::NEG_INFINITY
            } else {
                total / count as f64
            };
            rollouts += count;
            scores.push((cell, mean));
        }

        let best = best_cells(&scores, &mut self.ties);
        let cell = match self.ties.choose(&mut self.rng) {
            Some(&cell) => cell,
            None => *self
                .board
                .empty_cells()
                .choose(&mut self.rng)
                .unwrap_or(&Cell::ORIGIN),
        };
        log::debug!(
            "{card} -> {cell}: mean {best:.2}, {} tied, {rollouts} rollouts over {open} cells",
            self.ties.len()
        );

        self.scores = scores;
        self.commit(card, cell);
        cell
    }

    /// The driver only deals distinct cards onto empty cells, so a failure
    /// here means the player's board and the driver's grid have diverged.
    fn commit(&mut self, card: Card, cell: Cell) {
        let placed = self.board.apply(card, cell);
        debug_assert!(placed.is_ok(), "board out of sync committing {card} on {cell}: {placed:?}");
        if let Err(e) = placed {
            log::error!("could not record {card} on {cell}: {e}");
        }
    }
}

impl<E: Estimator> Player for MonteCarloPlayer<E> {
    fn name(&self) -> &str {
        "MonteCarloPlayer"
    }

    fn set_point_system(&mut self, system: &PointSystem, _game_time: Duration) {
        self.estimator.set_point_system(system);
    }

    fn init(&mut self) {
        self.board.reset();
    }

    fn get_play(&mut self, card: Card, remaining: Duration) -> Cell {
        self.select_move(card, remaining)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::full_deck;
    use rand::Rng;

    /// Scores a position by whether the latest placement hit one of `favoured`.
    struct Favour {
        favoured: Vec<Cell>,
    }

    impl Estimator for Favour {
        fn estimate<R: Rng + ?Sized>(&self, board: &mut Board, _rng: &mut R) -> f64 {
            match board.last_play() {
                Some(cell) if self.favoured.contains(&cell) => 10.0,
                _ => 1.0,
            }
        }
    }

    fn cell(row: usize, col: usize) -> Cell {
        Cell::new(row, col).unwrap()
    }

    /// Fill all but the listed cells with the first cards of the deck.
    fn player_with_open(open: &[Cell], favoured: Vec<Cell>, seed: u64) -> MonteCarloPlayer<Favour> {
        let mut player = MonteCarloPlayer::new(Favour { favoured }, seed);
        let deck = full_deck();
        let mut next = deck.iter();
        for c in Cell::all().filter(|c| !open.contains(c)) {
            player.board.apply(*next.next().unwrap(), c).unwrap();
        }
        player
    }

    #[test]
    fn test_per_cell_budget_divides_twice() {
        let b = per_cell_budget(Duration::from_millis(2500), 5, 2);
        assert_eq!(b, Duration::from_millis(100));
        assert_eq!(per_cell_budget(Duration::from_millis(2500), 5, 1), Duration::from_millis(500));
    }

    #[test]
    fn test_best_cells_keeps_ties() {
        let scores = [(cell(0, 0), 3.0), (cell(0, 1), 7.0), (cell(0, 2), 7.0), (cell(0, 3), 5.0)];
        let mut ties = Vec::new();
        assert_eq!(best_cells(&scores, &mut ties), 7.0);
        assert_eq!(ties, vec![cell(0, 1), cell(0, 2)]);
    }

    #[test]
    fn test_unsampled_cells_lose_to_sampled() {
        let scores = [(cell(0, 0), f64::NEG_INFINITY), (cell(0, 1), -4.0)];
        let mut ties = Vec::new();
        best_cells(&scores, &mut ties);
        assert_eq!(ties, vec![cell(0, 1)]);
    }

    #[test]
    fn test_all_unsampled_ties_everything() {
        let scores = [(cell(0, 0), f64::NEG_INFINITY), (cell(4, 4), f64::NEG_INFINITY)];
        let mut ties = Vec::new();
        best_cells(&scores, &mut ties);
        assert_eq!(ties.len(), 2);
    }

    #[test]
    fn test_selector_picks_only_among_tied_cells() {
        let open = [cell(1, 1), cell(2, 2), cell(3, 3), cell(4, 4)];
        let favoured = vec![cell(2, 2), cell(4, 4)];
        let card = full_deck()[40];
        let mut seen = Vec::new();
        for seed in 0..16 {
            let mut player = player_with_open(&open, favoured.clone(), seed);
            let chosen = player.select_move(card, Duration::from_millis(400));
            assert!(favoured.contains(&chosen), "seed {seed} chose untied cell {chosen}");
            assert_eq!(player.board().grid().get(chosen), Some(card));
            seen.push(chosen);
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 2, "both tied cells should come up across seeds");
    }

    #[test]
    fn test_last_cell_skips_evaluation() {
        let open = [cell(3, 2)];
        let mut player = player_with_open(&open, vec![], 1);
        let card = full_deck()[51];
        let chosen = player.select_move(card, Duration::ZERO);
        assert_eq!(chosen, cell(3, 2));
        assert!(player.board().is_complete());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "board out of sync")]
    fn test_repeated_card_is_not_silently_dropped() {
        let open = [cell(0, 4), cell(1, 4)];
        let mut player = player_with_open(&open, vec![], 5);
        // The first card of the deck is already on the board.
        let card = full_deck()[0];
        player.select_move(card, Duration::from_millis(10));
    }

    #[test]
    fn test_zero_budget_falls_back_to_random_empty_cell() {
        let open = [cell(0, 4), cell(1, 4), cell(2, 4)];
        let mut player = player_with_open(&open, vec![cell(0, 4)], 3);
        let card = full_deck()[45];
        let chosen = player.select_move(card, Duration::ZERO);
        assert!(open.contains(&chosen));
        assert_eq!(player.board().num_plays(), 23);
    }
}
