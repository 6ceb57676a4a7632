//! L2W core crate - grid, piece, block and state types shared by both phases.

mod block;
mod grid;
mod mask;
mod orientation;
mod pattern;
mod piece;
mod state;

pub use block::{BlockType, BoardCell, BoardPiece, PieceId, PieceRotation};
pub use grid::{Cell, ColorGrid, Grid, GridError, GRID_SIZE};
pub use mask::{Mask, MaskError};
pub use orientation::{rotation_for_level, Direction, Edge, Horizontal, Orientation, Vertical};
pub use pattern::{is_w_footprint, l_pattern, w_patterns, LShape, Pattern};
pub use piece::{Color, Piece, Shape, PALETTE};
pub use state::{CounterKind, GameState, Phase, StateError};
