//! Phase-A falling pieces: shape catalog, color palette, positioned piece.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::grid::Cell;
use crate::mask::Mask;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Shape {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
    C,
    P,
}

impl Shape {
    pub const ALL: [Shape; 9] = [
        Shape::I,
        Shape::O,
        Shape::T,
        Shape::S,
        Shape::Z,
        Shape::L,
        Shape::J,
        Shape::C,
        Shape::P,
    ];

    /// The seven tetrominoes dealt by default.
    pub const STANDARD: [Shape; 7] = [
        Shape::I,
        Shape::O,
        Shape::T,
        Shape::S,
        Shape::Z,
        Shape::L,
        Shape::J,
    ];

    pub fn mask(self) -> Mask {
        let rows: &[&[u8]] = match self {
            Shape::I => &[&[1, 1, 1, 1]],
            Shape::O => &[&[1, 1], &[1, 1]],
            Shape::T => &[&[0, 1, 0], &[1, 1, 1]],
            Shape::S => &[&[0, 1, 1], &[1, 1, 0]],
            Shape::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Shape::L => &[&[1, 0], &[1, 0], &[1, 1]],
            Shape::J => &[&[0, 1], &[0, 1], &[1, 1]],
            Shape::C => &[&[1, 1], &[1, 0], &[1, 1]],
            Shape::P => &[&[1, 1], &[1, 1], &[1, 0]],
        };
        Mask::from_rows(rows)
    }
}

/// Display palette, indexed by `Color`.
pub const PALETTE: [&str; 7] = [
    "#FF0000", // red
    "#00FF00", // green
    "#0000FF", // blue
    "#FFFF00", // yellow
    "#FF00FF", // magenta
    "#00FFFF", // cyan
    "#FFA500", // orange
];

/// Palette index. Stored in the grid as `index + 1` so 0 stays empty.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Color(u8);

impl Color {
    pub const COUNT: usize = PALETTE.len();

    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < Self::COUNT).then_some(Self(index))
    }

    pub fn all() -> impl Iterator<Item = Color> {
        (0..Self::COUNT as u8).map(Color)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn cell_value(self) -> u8 {
        self.0 + 1
    }

    pub fn from_cell_value(value: u8) -> Option<Self> {
        value.checked_sub(1).and_then(Self::new)
    }

    pub fn hex(self) -> &'static str {
        PALETTE[self.index()]
    }
}

/// A falling piece. `(x, y)` is the mask's top-left in grid coordinates,
/// x = column, y = row.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Piece {
    pub shape: Shape,
    pub color: Color,
    pub mask: Mask,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn new(shape: Shape, color: Color, x: i32, y: i32) -> Self {
        Self {
            shape,
            color,
            mask: shape.mask(),
            x,
            y,
        }
    }

    pub fn width(&self) -> usize {
        self.mask.cols()
    }

    pub fn height(&self) -> usize {
        self.mask.rows()
    }

    /// Absolute cells covered when shifted by `(dx, dy)`.
    pub fn cells_at(&self, dx: i32, dy: i32) -> SmallVec<[Cell; 9]> {
        self.mask
            .offsets()
            .map(|(r, c)| Cell::new(self.y + dy + r as i32, self.x + dx + c as i32))
            .collect()
    }

    pub fn cells(&self) -> SmallVec<[Cell; 9]> {
        self.cells_at(0, 0)
    }

    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Same anchor, mask turned 90° clockwise.
    pub fn rotated(&self) -> Self {
        Self {
            mask: self.mask.rotate_cw(),
            ..self.clone()
        }
    }
}
