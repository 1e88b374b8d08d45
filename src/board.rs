//! Poker Squares Engine — Reversible Board
//!
//! Grid plus two permutation arrays partitioned by one cursor (`num_plays`):
//!
//! ```text
//! plays: [ occupied cells, placement order | empty cells, any order ]
//! deck:  [ placed cards,   placement order | undealt pool, any order ]
//!                                          ^ num_plays
//! ```
//!
//! `apply` swaps the placed card and cell to the cursor and advances it,
//! remembering which slots it swapped with. `undo` steps the cursor back,
//! clears that cell and swaps the two pairs back. Nothing else moves, so N
//! applies followed by N undos restore both arrays to the same permutation
//! and rollouts run without allocating.

use crate::card::{full_deck, Card};
use crate::grid::{Cell, Grid, NUM_CELLS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("cell {0} is already occupied")]
    CellOccupied(Cell),
    #[error("card {0} is not in the undealt pool")]
    CardUnavailable(Card),
    #[error("board is full")]
    BoardFull,
}

#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    plays: [Cell; NUM_CELLS],
    deck: Vec<Card>,
    num_plays: usize,
    /// `(card_slot, cell_slot)` each placement swapped with, by ply.
    swaps: [(u8, u8); NUM_CELLS],
}

/// Equal when the grid, both permutations and the cursor match; the swap
/// history past the cursor is scratch space.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.num_plays == other.num_plays
            && self.grid == other.grid
            && self.plays == other.plays
            && self.deck == other.deck
            && self.swaps[..self.num_plays] == other.swaps[..other.num_plays]
    }
}

impl Eq for Board {}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// Empty board over the standard 52-card deck.
    pub fn new() -> Board {
        Board::with_deck(full_deck())
    }

    /// Empty board whose undealt pool is `deck`. Cards must be distinct.
    pub fn with_deck(deck: Vec<Card>) -> Board {
        Board {
            grid: Grid::new(),
            plays: Cell::row_major(),
            deck,
            num_plays: 0,
            swaps: [(0, 0); NUM_CELLS],
        }
    }

    /// Clear the grid and rewind the cursor, keeping the arrays allocated.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.num_plays = 0;
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn num_plays(&self) -> usize {
        self.num_plays
    }

    #[inline]
    pub fn remaining_cells(&self) -> usize {
        NUM_CELLS - self.num_plays
    }

    pub fn is_complete(&self) -> bool {
        self.num_plays == NUM_CELLS
    }

    /// Occupied cells in placement order.
    pub fn placed_cells(&self) -> &[Cell] {
        &self.plays[..self.num_plays]
    }

    /// Currently empty cells, in no particular order.
    pub fn empty_cells(&self) -> &[Cell] {
        &self.plays[self.num_plays..]
    }

    /// Cards already placed, in placement order.
    pub fn placed_cards(&self) -> &[Card] {
        &self.deck[..self.num_plays.min(self.deck.len())]
    }

    /// Cards not yet dealt: the sampling pool for rollouts.
    pub fn undealt(&self) -> &[Card] {
        &self.deck[self.num_plays.min(self.deck.len())..]
    }

    pub fn last_play(&self) -> Option<Cell> {
        self.num_plays.checked_sub(1).map(|i| self.plays[i])
    }

    // ── Apply / Undo ────────────────────────────────────────────────

    /// Place `card` on `cell`.
    ///
    /// Both the card and the cell are located by linear scan from the cursor,
    /// then swapped into the cursor slot.
    pub fn apply(&mut self, card: Card, cell: Cell) -> Result<(), BoardError> {
        let n = self.num_plays;
        if n >= NUM_CELLS {
            return Err(BoardError::BoardFull);
        }
        if self.grid.get(cell).is_some() {
            return Err(BoardError::CellOccupied(cell));
        }
        let card_idx = self
            .deck
            .get(n..)
            .unwrap_or_default()
            .iter()
            .position(|&c| c == card)
            .ok_or(BoardError::CardUnavailable(card))?;
        let cell_idx = self.plays[n..]
            .iter()
            .position(|&c| c == cell)
            .ok_or(BoardError::CellOccupied(cell))?;
        self.place(n + card_idx, n + cell_idx);
        Ok(())
    }

    /// Place the undealt card at deck slot `card_slot` on the empty cell at
    /// plays slot `cell_slot`. Both slots must be at or past the cursor.
    ///
    /// Same effect as [`Board::apply`] without the scans; rollouts already
    /// know the slots they sampled.
    #[inline]
    pub fn place(&mut self, card_slot: usize, cell_slot: usize) {
        let n = self.num_plays;
        debug_assert!(card_slot >= n && card_slot < self.deck.len());
        debug_assert!(cell_slot >= n && cell_slot < NUM_CELLS);
        self.deck.swap(n, card_slot);
        self.plays.swap(n, cell_slot);
        self.swaps[n] = (card_slot as u8, cell_slot as u8);
        self.grid.set(self.plays[n], Some(self.deck[n]));
        self.num_plays += 1;
    }

    /// Take back the most recent placement. Returns the cell that was cleared,
    /// or `None` when nothing has been placed.
    #[inline]
    pub fn undo(&mut self) -> Option<Cell> {
        let n = self.num_plays.checked_sub(1)?;
        self.num_plays = n;
        let cell = self.plays[n];
        self.grid.set(cell, None);
        let (card_slot, cell_slot) = self.swaps[n];
        self.deck.swap(n, card_slot as usize);
        self.plays.swap(n, cell_slot as usize);
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn card(text: &str) -> Card {
        text.parse().unwrap()
    }

    fn cell(row: usize, col: usize) -> Cell {
        Cell::new(row, col).unwrap()
    }

    #[test]
    fn test_apply_moves_card_and_cell_to_cursor() {
        let mut board = Board::new();
        board.apply(card("KH"), cell(2, 3)).unwrap();

        assert_eq!(board.num_plays(), 1);
        assert_eq!(board.placed_cards(), &[card("KH")]);
        assert_eq!(board.placed_cells(), &[cell(2, 3)]);
        assert_eq!(board.grid().get(cell(2, 3)), Some(card("KH")));
        assert!(!board.undealt().contains(&card("KH")));
        assert!(!board.empty_cells().contains(&cell(2, 3)));
    }

    #[test]
    fn test_apply_rejects_bad_moves() {
        let mut board = Board::new();
        board.apply(card("KH"), cell(0, 0)).unwrap();
        assert_eq!(
            board.apply(card("2C"), cell(0, 0)),
            Err(BoardError::CellOccupied(cell(0, 0)))
        );
        assert_eq!(
            board.apply(card("KH"), cell(0, 1)),
            Err(BoardError::CardUnavailable(card("KH")))
        );
    }

    #[test]
    fn test_undo_on_empty_board() {
        let mut board = Board::new();
        assert_eq!(board.undo(), None);
        assert_eq!(board.num_plays(), 0);
    }

    #[test]
    fn test_apply_undo_round_trip_is_exact() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut board = Board::new();

        // Some real placements first so the arrays are already scrambled.
        for _ in 0..6 {
            let c = board.undealt()[rng.gen_range(0..board.undealt().len())];
            let e = board.empty_cells()[rng.gen_range(0..board.remaining_cells())];
            board.apply(c, e).unwrap();
        }
        let before = board.clone();

        for depth in 1..=board.remaining_cells() {
            for _ in 0..depth {
                let c = board.undealt()[rng.gen_range(0..board.undealt().len())];
                let e = board.empty_cells()[rng.gen_range(0..board.remaining_cells())];
                board.apply(c, e).unwrap();
            }
            for _ in 0..depth {
                assert!(board.undo().is_some());
            }
            assert_eq!(board, before, "state differs after {depth} apply/undo pairs");
        }
    }

    #[test]
    fn test_undo_restores_pool_order() {
        let mut board = Board::new();
        let pool_before = board.undealt().to_vec();
        board.apply(card("KH"), cell(4, 4)).unwrap();
        assert_eq!(board.undo(), Some(cell(4, 4)));
        assert_eq!(board.undealt(), pool_before.as_slice(), "pool permutation restored");
        assert_eq!(board.empty_cells(), Cell::row_major().as_slice());
    }

    #[test]
    fn test_fill_whole_board() {
        let mut board = Board::new();
        let deck = full_deck();
        for (i, c) in Cell::all().enumerate() {
            board.apply(deck[i], c).unwrap();
        }
        assert!(board.is_complete());
        assert!(board.grid().is_full());
        assert_eq!(board.apply(deck[30], cell(0, 0)), Err(BoardError::BoardFull));
        assert_eq!(board.undealt().len(), 52 - 25);
    }
}
