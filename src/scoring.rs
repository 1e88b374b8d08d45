//! Point systems: points per final hand category, summed over the ten lines.

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::evaluator::{classify, HandCategory};
use crate::grid::Grid;

/// Points for each [`HandCategory`], indexed by `HandCategory::index()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSystem {
    #[default]
    British,
    American,
    Custom([i32; HandCategory::COUNT]),
}

//                      HC 1P 2P 3K  ST  FL  FH  4K  SF   RF
const BRITISH: [i32; 10] = [0, 1, 3, 6, 12, 5, 10, 16, 30, 30];
const AMERICAN: [i32; 10] = [0, 2, 5, 10, 15, 20, 25, 50, 75, 100];

impl PointSystem {
    pub fn table(&self) -> &[i32; HandCategory::COUNT] {
        match self {
            PointSystem::British => &BRITISH,
            PointSystem::American => &AMERICAN,
            PointSystem::Custom(points) => points,
        }
    }

    #[inline]
    pub fn points(&self, category: HandCategory) -> i32 {
        self.table()[category.index()]
    }

    pub fn score_line(&self, line: &[Option<Card>]) -> i32 {
        self.points(classify(line))
    }

    /// Sum of line scores. Works on partial grids too.
    pub fn score_grid(&self, grid: &Grid) -> i32 {
        grid.lines().map(|line| self.score_line(&line)).sum()
    }
}

impl std::fmt::Display for PointSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for category in HandCategory::ALL {
            writeln!(f, "{:>16}: {}", category.name(), self.points(category))?;
        }
        Ok(())
    }
}
