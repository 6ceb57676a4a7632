//! L-block detection and the Phase-A clear loop.
//!
//! Scans run row-major over every origin where a pattern's box fits. The clear
//! loop removes one match per pass, LFB before RFB, until nothing matches.

use l2w_core::{l_pattern, BlockType, Cell, ColorGrid, Direction, LShape, Pattern, GRID_SIZE};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{Ruleset, ScoreTable};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LMatch {
    pub block: BlockType,
    pub origin: Cell,
    pub cells: SmallVec<[Cell; 9]>,
}

#[derive(Clone, Debug)]
pub struct LDetector {
    rfb: Pattern,
    lfb: Pattern,
    color_sensitive: bool,
}

impl LDetector {
    pub fn new(shape: LShape, color_sensitive: bool) -> Self {
        Self {
            rfb: l_pattern(shape, BlockType::Rfb),
            lfb: l_pattern(shape, BlockType::Lfb),
            color_sensitive,
        }
    }

    pub fn for_ruleset(ruleset: Ruleset) -> Self {
        Self::new(ruleset.l_shape(), ruleset.color_sensitive())
    }

    pub fn pattern(&self, block: BlockType) -> &Pattern {
        match block {
            BlockType::Rfb => &self.rfb,
            BlockType::Lfb => &self.lfb,
        }
    }

    fn matches_at(&self, grid: &ColorGrid, pattern: &Pattern, origin: Cell) -> bool {
        let mut color = None;
        for cell in pattern.placed_at(origin) {
            let value = match grid.at(cell) {
                Some(v) if v != 0 => v,
                _ => return false,
            };
            if self.color_sensitive {
                match color {
                    None => color = Some(value),
                    Some(c) if c != value => return false,
                    Some(_) => {}
                }
            }
        }
        true
    }

    fn origins(pattern: &Pattern) -> impl Iterator<Item = Cell> {
        let n = GRID_SIZE as i32;
        let (rows, cols) = (pattern.rows(), pattern.cols());
        (0..=n - rows).flat_map(move |row| (0..=n - cols).map(move |col| Cell::new(row, col)))
    }

    pub fn find_first(&self, grid: &ColorGrid, block: BlockType) -> Option<LMatch> {
        let pattern = self.pattern(block);
        Self::origins(pattern)
            .find(|&origin| self.matches_at(grid, pattern, origin))
            .map(|origin| LMatch {
                block,
                origin,
                cells: pattern.placed_at(origin).collect(),
            })
    }

    /// Every origin that matches, overlapping matches included.
    pub fn find_all(&self, grid: &ColorGrid, block: BlockType) -> Vec<LMatch> {
        let pattern = self.pattern(block);
        Self::origins(pattern)
            .filter(|&origin| self.matches_at(grid, pattern, origin))
            .map(|origin| LMatch {
                block,
                origin,
                cells: pattern.placed_at(origin).collect(),
            })
            .collect()
    }

    pub fn has_any(&self, grid: &ColorGrid) -> bool {
        BlockType::ALL
            .iter()
            .any(|&block| self.find_first(grid, block).is_some())
    }
}

/// Result of one full clear loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearReport {
    pub grid: ColorGrid,
    /// In clear order.
    pub clears: Vec<LMatch>,
}

impl ClearReport {
    pub fn count(&self, block: BlockType) -> usize {
        self.clears.iter().filter(|m| m.block == block).count()
    }

    pub fn score(&self, scores: &ScoreTable) -> u64 {
        self.clears
            .iter()
            .map(|m| scores.l_block(m.block) as u64)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.clears.is_empty()
    }
}

/// Clears matches one at a time until the grid is stable. With `gravity`,
/// the grid is compacted toward that direction after every clear.
pub fn clear_loop(detector: &LDetector, grid: &ColorGrid, gravity: Option<Direction>) -> ClearReport {
    let mut grid = grid.clone();
    let mut clears = Vec::new();
    loop {
        let found = detector
            .find_first(&grid, BlockType::Lfb)
            .or_else(|| detector.find_first(&grid, BlockType::Rfb));
        let Some(found) = found else { break };
        grid.clear_cells(&found.cells);
        if let Some(dir) = gravity {
            grid = grid.compact(dir);
        }
        clears.push(found);
    }
    ClearReport { grid, clears }
}
