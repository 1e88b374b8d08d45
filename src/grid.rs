//! The 5×5 placement grid and its ten lines.

use std::fmt;

use crate::card::Card;

/// Rows/columns in the square grid.
pub const SIZE: usize = 5;
/// Cells in the grid (and cards dealt per game).
pub const NUM_CELLS: usize = SIZE * SIZE;
/// Rows plus columns.
pub const NUM_LINES: usize = 2 * SIZE;

/// A grid position, stored as a row-major index `row * SIZE + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell(u8);

impl Cell {
    /// Top-left corner.
    pub const ORIGIN: Cell = Cell(0);

    pub fn new(row: usize, col: usize) -> Option<Cell> {
        (row < SIZE && col < SIZE).then(|| Cell((row * SIZE + col) as u8))
    }

    pub fn from_index(index: usize) -> Option<Cell> {
        (index < NUM_CELLS).then_some(Cell(index as u8))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn row(self) -> usize {
        self.index() / SIZE
    }

    #[inline]
    pub fn col(self) -> usize {
        self.index() % SIZE
    }

    /// Every cell, indexed by itself.
    pub fn row_major() -> [Cell; NUM_CELLS] {
        std::array::from_fn(|i| Cell(i as u8))
    }

    /// Every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..NUM_CELLS as u8).map(Cell)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// Grid contents; `None` marks an empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [Option<Card>; NUM_CELLS],
}

impl Grid {
    pub fn new() -> Grid {
        Grid::default()
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> Option<Card> {
        self.cells[cell.index()]
    }

    #[inline]
    pub fn set(&mut self, cell: Cell, card: Option<Card>) {
        self.cells[cell.index()] = card;
    }

    pub fn clear(&mut self) {
        self.cells = [None; NUM_CELLS];
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Line `i`: rows are lines 0..5, columns are lines 5..10.
    #[inline]
    pub fn line(&self, i: usize) -> [Option<Card>; SIZE] {
        let mut line = [None; SIZE];
        if i < SIZE {
            line.copy_from_slice(&self.cells[i * SIZE..(i + 1) * SIZE]);
        } else {
            let col = i - SIZE;
            for (row, slot) in line.iter_mut().enumerate() {
                *slot = self.cells[row * SIZE + col];
            }
        }
        line
    }

    pub fn lines(&self) -> impl Iterator<Item = [Option<Card>; SIZE]> + '_ {
        (0..NUM_LINES).map(move |i| self.line(i))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            for col in 0..SIZE {
                if col > 0 {
                    write!(f, " ")?;
                }
                match self.cells[row * SIZE + col] {
                    Some(card) => write!(f, "{card}")?,
                    None => write!(f, "--")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
