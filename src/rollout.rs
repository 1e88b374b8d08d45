//! Poker Squares Engine — Rollouts
//!
//! A rollout continues the game a few random plies from the current board,
//! scores the resulting (usually still partial) grid with the heuristic table
//! and takes every simulated ply back.
//!
//! ## Flow
//!
//! 1. `depth_limit == 0` or board full → exact score of the grid
//! 2. Otherwise `min(depth_limit, empty cells)` times: random undealt card
//!    onto a random empty cell
//! 3. Sum the table's value for all ten lines at the new play count
//! 4. Undo the simulated plies

use std::sync::Arc;

use rand::Rng;

use crate::board::Board;
use crate::scoring::PointSystem;
use crate::table::HeuristicTable;

/// Something that can put a number on the current board position.
///
/// The move selector averages many calls to this per candidate cell. Calls
/// must leave the board exactly as they found it.
pub trait Estimator {
    fn estimate<R: Rng + ?Sized>(&self, board: &mut Board, rng: &mut R) -> f64;

    /// Rules changed; only estimators that score exact grids care.
    fn set_point_system(&mut self, _system: &PointSystem) {}
}

/// Depth-limited random playout scored by a [`HeuristicTable`].
#[derive(Debug, Clone)]
pub struct RolloutEngine {
    table: Arc<HeuristicTable>,
    system: PointSystem,
    depth_limit: usize,
}

impl RolloutEngine {
    pub fn new(table: Arc<HeuristicTable>, system: PointSystem, depth_limit: usize) -> Self {
        RolloutEngine {
            table,
            system,
            depth_limit,
        }
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    pub fn table(&self) -> &HeuristicTable {
        &self.table
    }

    pub fn rollout<R: Rng + ?Sized>(&self, board: &mut Board, rng: &mut R) -> f64 {
        if self.depth_limit == 0 || board.is_complete() {
            return self.system.score_grid(board.grid()) as f64;
        }

        let depth = self.depth_limit.min(board.remaining_cells());
        let mut applied = 0;
        for _ in 0..depth {
            let n = board.num_plays();
            let pool = board.undealt().len();
            if pool == 0 {
                break;
            }
            let card_slot = n + rng.gen_range(0..pool);
            let cell_slot = n + rng.gen_range(0..board.remaining_cells());
            board.place(card_slot, cell_slot);
            applied += 1;
        }

        let score = self.table.evaluate(board.grid(), board.num_plays());

        for _ in 0..applied {
            board.undo();
        }
        score
    }
}

impl Estimator for RolloutEngine {
    #[inline]
    fn estimate<R: Rng + ?Sized>(&self, board: &mut Board, rng: &mut R) -> f64 {
        self.rollout(board, rng)
    }

    fn set_point_system(&mut self, system: &PointSystem) {
        self.system = system.clone();
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode;
    use crate::grid::Cell;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn setup(depth: usize, table: HeuristicTable) -> (RolloutEngine, Board, Xoshiro256PlusPlus) {
        let engine = RolloutEngine::new(Arc::new(table), PointSystem::British, depth);
        (engine, Board::new(), Xoshiro256PlusPlus::seed_from_u64(42))
    }

    #[test]
    fn test_depth_zero_scores_exact_grid() {
        let (engine, mut board, mut rng) = setup(0, HeuristicTable::new());
        for (i, text) in ["9C", "9D", "9H"].iter().enumerate() {
            board.apply(text.parse().unwrap(), Cell::new(0, i).unwrap()).unwrap();
        }
        // Three nines in row 0, British: 6 points.
        assert_eq!(engine.rollout(&mut board, &mut rng), 6.0);
    }

    #[test]
    fn test_rollout_leaves_board_untouched() {
        let (engine, mut board, mut rng) = setup(3, HeuristicTable::new());
        board.apply("AS".parse().unwrap(), Cell::new(2, 2).unwrap()).unwrap();
        let before = board.clone();
        for _ in 0..200 {
            engine.rollout(&mut board, &mut rng);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_rollout_scores_at_simulated_play_count() {
        // Only the all-empty line at play count 3 has a value: after a 3-ply
        // rollout from an empty board, at least 10 - 6 = 4 lines are still empty.
        let empty_at_3 = encode(&[None; 5], 3);
        let table: HeuristicTable = [(empty_at_3, 1.0)].into_iter().collect();
        let (engine, mut board, mut rng) = setup(3, table);
        for _ in 0..50 {
            let v = engine.rollout(&mut board, &mut rng);
            assert!((4.0..=6.0).contains(&v), "unexpected estimate {v}");
        }
    }

    #[test]
    fn test_rollout_near_end_is_clamped_to_empty_cells() {
        let (engine, mut board, mut rng) = setup(5, HeuristicTable::new());
        let deck = crate::card::full_deck();
        for (i, cell) in Cell::all().take(23).enumerate() {
            board.apply(deck[i], cell).unwrap();
        }
        let before = board.clone();
        engine.rollout(&mut board, &mut rng);
        assert_eq!(board, before, "two-ply rollout must unwind both plies");
    }
}
