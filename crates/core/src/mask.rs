//! rectangular 0/1 cell masks and quarter-turn rotation

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Row-major occupancy mask. Every shape in the game fits in 3×3 or 1×4.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMask")]
pub struct Mask {
    rows: usize,
    cols: usize,
    bits: SmallVec<[bool; 9]>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("mask is {rows}x{cols} but carries {got} cells")]
pub struct MaskError {
    pub rows: usize,
    pub cols: usize,
    pub got: usize,
}

/// Wire form, checked before it becomes a `Mask`.
#[derive(Deserialize)]
struct RawMask {
    rows: usize,
    cols: usize,
    bits: SmallVec<[bool; 9]>,
}

impl TryFrom<RawMask> for Mask {
    type Error = MaskError;

    fn try_from(raw: RawMask) -> Result<Self, Self::Error> {
        if raw.rows.checked_mul(raw.cols) != Some(raw.bits.len()) {
            return Err(MaskError {
                rows: raw.rows,
                cols: raw.cols,
                got: raw.bits.len(),
            });
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            bits: raw.bits,
        })
    }
}

impl Mask {
    /// Build from literal rows of 0/1. All rows must have equal length.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        debug_assert!(rows.iter().all(|r| r.len() == cols), "ragged mask");
        let bits = rows
            .iter()
            .flat_map(|r| r.iter().map(|&b| b != 0))
            .collect();
        Self {
            rows: rows.len(),
            cols,
            bits,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.bits[row * self.cols + col]
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// (row, col) of every set cell, row-major.
    pub fn offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| (i / cols, i % cols))
    }

    /// 90° clockwise: transpose, then reverse each row.
    pub fn rotate_cw(&self) -> Self {
        let rows = self.cols;
        let cols = self.rows;
        let mut bits: SmallVec<[bool; 9]> = smallvec::smallvec![false; rows * cols];
        for r in 0..self.rows {
            for c in 0..self.cols {
                // old (r, c) lands on new (c, old_rows - 1 - r)
                bits[c * cols + (self.rows - 1 - r)] = self.bits[r * self.cols + c];
            }
        }
        Self { rows, cols, bits }
    }

    pub fn rotated(&self, quarter_turns: u8) -> Self {
        let mut mask = self.clone();
        for _ in 0..(quarter_turns % 4) {
            mask = mask.rotate_cw();
        }
        mask
    }
}
