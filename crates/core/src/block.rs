//! Phase-B blocks: RFB/LFB types, rotations, board pieces, board cell values.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::grid::Cell;
use crate::mask::Mask;

/// Right- / left-facing block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Rfb,
    Lfb,
}

impl BlockType {
    pub const ALL: [BlockType; 2] = [BlockType::Rfb, BlockType::Lfb];

    /// Unrotated Phase-B mask. RFB covers 4 cells, LFB 5, so a W pair is 9.
    pub fn mask(self) -> Mask {
        match self {
            BlockType::Rfb => Mask::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            BlockType::Lfb => Mask::from_rows(&[&[0, 0, 1], &[0, 0, 1], &[1, 1, 1]]),
        }
    }

    pub fn board_cell(self) -> BoardCell {
        match self {
            BlockType::Rfb => BoardCell::Rfb,
            BlockType::Lfb => BoardCell::Lfb,
        }
    }

    pub fn other(self) -> Self {
        match self {
            BlockType::Rfb => BlockType::Lfb,
            BlockType::Lfb => BlockType::Rfb,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum PieceRotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl PieceRotation {
    pub const ALL: [PieceRotation; 4] = [
        PieceRotation::R0,
        PieceRotation::R90,
        PieceRotation::R180,
        PieceRotation::R270,
    ];

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::R0),
            90 => Some(Self::R90),
            180 => Some(Self::R180),
            270 => Some(Self::R270),
            _ => None,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::R0 => 0,
            Self::R90 => 1,
            Self::R180 => 2,
            Self::R270 => 3,
        }
    }

    /// Next clockwise step, wrapping 270 -> 0.
    pub fn cw(self) -> Self {
        match self {
            Self::R0 => Self::R90,
            Self::R90 => Self::R180,
            Self::R180 => Self::R270,
            Self::R270 => Self::R0,
        }
    }
}

/// Phase-B grid value.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum BoardCell {
    #[default]
    Empty,
    Rfb,
    Lfb,
    /// Pre-filled obstacle.
    Locked,
}

impl BoardCell {
    pub fn value(self) -> u8 {
        match self {
            BoardCell::Empty => 0,
            BoardCell::Rfb => 1,
            BoardCell::Lfb => 2,
            BoardCell::Locked => 3,
        }
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(BoardCell::Empty),
            1 => Some(BoardCell::Rfb),
            2 => Some(BoardCell::Lfb),
            3 => Some(BoardCell::Locked),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "piece-{}", self.0)
    }
}

/// A placed Phase-B block. `anchor` is the rotated mask's top-left.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BoardPiece {
    pub id: PieceId,
    pub block: BlockType,
    pub rotation: PieceRotation,
    pub anchor: Cell,
    pub is_w_block: bool,
}

impl BoardPiece {
    pub fn new(id: PieceId, block: BlockType, anchor: Cell, rotation: PieceRotation) -> Self {
        Self {
            id,
            block,
            rotation,
            anchor,
            is_w_block: false,
        }
    }

    pub fn mask(&self) -> Mask {
        self.block.mask().rotated(self.rotation.quarter_turns())
    }

    pub fn cells(&self) -> SmallVec<[Cell; 5]> {
        self.mask()
            .offsets()
            .map(|(r, c)| self.anchor.offset(r as i32, c as i32))
            .collect()
    }

    pub fn covers(&self, cell: Cell) -> bool {
        self.cells().contains(&cell)
    }

    pub fn moved_to(&self, anchor: Cell) -> Self {
        Self {
            anchor,
            ..self.clone()
        }
    }

    pub fn turned(&self) -> Self {
        Self {
            rotation: self.rotation.cw(),
            ..self.clone()
        }
    }
}
