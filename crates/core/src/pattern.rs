//! L-block detection patterns (Phase A) and W-block reference shapes (Phase B)
//! patterns are normalized: translated to a zero-based box, sorted row-major

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::block::BlockType;
use crate::grid::Cell;

/// Which L family Phase A scans for.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum LShape {
    /// 4 cells: 3 tall, 2 wide.
    Compact,
    /// 5 cells inside a 3×3 box.
    Extended,
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Pattern {
    cells: SmallVec<[Cell; 9]>,
    rows: i32,
    cols: i32,
}

impl Pattern {
    /// Normalizes arbitrary cells: duplicates dropped, shifted to origin, sorted.
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        let mut cells: SmallVec<[Cell; 9]> = cells.into_iter().collect();
        cells.sort_unstable();
        cells.dedup();
        let min_row = cells.iter().map(|c| c.row).min().unwrap_or(0);
        let min_col = cells.iter().map(|c| c.col).min().unwrap_or(0);
        for cell in cells.iter_mut() {
            cell.row -= min_row;
            cell.col -= min_col;
        }
        // translation keeps row-major order, no re-sort needed
        let rows = cells.iter().map(|c| c.row + 1).max().unwrap_or(0);
        let cols = cells.iter().map(|c| c.col + 1).max().unwrap_or(0);
        Self { cells, rows, cols }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Pattern cells translated so its box starts at `origin`.
    pub fn placed_at(&self, origin: Cell) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .map(move |c| origin.offset(c.row, c.col))
    }

    pub fn rotate_cw(&self) -> Self {
        let rows = self.rows;
        Self::from_cells(self.cells.iter().map(|c| Cell::new(c.col, rows - 1 - c.row)))
    }
}

pub fn l_pattern(shape: LShape, block: BlockType) -> Pattern {
    let size = match shape {
        LShape::Compact => 2,
        LShape::Extended => 3,
    };
    let last = 2;
    let mut cells: SmallVec<[Cell; 9]> = SmallVec::new();
    match block {
        // bar on the left, foot running right
        BlockType::Rfb => {
            cells.extend((0..3).map(|row| Cell::new(row, 0)));
            cells.extend((1..size).map(|col| Cell::new(last, col)));
        }
        // bar on the right, foot running left
        BlockType::Lfb => {
            cells.extend((0..3).map(|row| Cell::new(row, size - 1)));
            cells.extend((0..size - 1).map(|col| Cell::new(last, col)));
        }
    }
    Pattern::from_cells(cells)
}

/// The four rotations of the W reference footprint.
pub fn w_patterns() -> &'static [Pattern; 4] {
    static PATTERNS: OnceLock<[Pattern; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let base = w_reference();
        let r90 = base.rotate_cw();
        let r180 = r90.rotate_cw();
        let r270 = r180.rotate_cw();
        [base, r90, r180, r270]
    })
}

/// RFB at (0,0) plus LFB at (0,2), both unrotated:
///
/// ```text
/// X . . . X
/// X X X . X
/// . . X X X
/// ```
fn w_reference() -> Pattern {
    let rfb = BlockType::Rfb.mask();
    let lfb = BlockType::Lfb.mask();
    let cells = rfb
        .offsets()
        .map(|(r, c)| Cell::new(r as i32, c as i32))
        .chain(lfb.offsets().map(|(r, c)| Cell::new(r as i32, c as i32 + 2)));
    Pattern::from_cells(cells)
}

/// Does this 9-cell footprint match a W reference in any rotation?
pub fn is_w_footprint(cells: &[Cell]) -> bool {
    let candidate = Pattern::from_cells(cells.iter().copied());
    if candidate.len() != 9 {
        return false;
    }
    w_patterns().iter().any(|p| *p == candidate)
}
