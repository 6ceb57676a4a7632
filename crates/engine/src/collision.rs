//! collision detection and grid commits for Phase-A pieces

use l2w_core::{Cell, ColorGrid, Direction, Edge, Piece, GRID_SIZE};
use serde::{Deserialize, Serialize};

/// Vertical bounds policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Bounds {
    /// Every cell must be on the grid.
    #[default]
    Strict,
    /// Cells above row 0 are allowed (and never collide). Only honored while
    /// pieces fall down; see `for_fall`.
    OpenTop,
}

impl Bounds {
    /// Policy in effect for pieces falling along `fall`. The open top only
    /// applies to the spawn edge, so any other direction is strict.
    pub fn for_fall(self, fall: Direction) -> Bounds {
        match (self, fall) {
            (Bounds::OpenTop, Direction::Down) => Bounds::OpenTop,
            _ => Bounds::Strict,
        }
    }

    #[inline]
    fn admits(self, cell: Cell) -> bool {
        let n = GRID_SIZE as i32;
        let cols_ok = cell.col >= 0 && cell.col < n;
        match self {
            Bounds::Strict => cols_ok && cell.row >= 0 && cell.row < n,
            Bounds::OpenTop => cols_ok && cell.row < n,
        }
    }
}

/// does piece, shifted by (dx, dy), hit a wall or a filled cell?
pub fn collides(grid: &ColorGrid, piece: &Piece, dx: i32, dy: i32, bounds: Bounds) -> bool {
    piece.cells_at(dx, dy).into_iter().any(|cell| {
        if !bounds.admits(cell) {
            return true;
        }
        // above-top cells under OpenTop have nothing to hit
        grid.at(cell).is_some_and(|v| v != 0)
    })
}

/// True when the piece, shifted by (dx, dy), sits on free cells inside `bounds`.
pub fn can_place(grid: &ColorGrid, piece: &Piece, dx: i32, dy: i32, bounds: Bounds) -> bool {
    !collides(grid, piece, dx, dy, bounds)
}

/// Copy of `grid` with the piece's cells set to its color. Off-grid cells are skipped.
pub fn place(grid: &ColorGrid, piece: &Piece) -> ColorGrid {
    let mut next = grid.clone();
    let value = piece.color.cell_value();
    for cell in piece.cells() {
        next.put(cell, value);
    }
    next
}

pub fn remove_cells(grid: &ColorGrid, cells: &[Cell]) -> ColorGrid {
    grid.with_cells_cleared(cells)
}

/// Edge a piece falling in `fall` spawns against.
pub fn spawn_edge(fall: Direction) -> Edge {
    match fall {
        Direction::Down => Edge::Top,
        Direction::Up => Edge::Bottom,
        Direction::Left => Edge::Right,
        Direction::Right => Edge::Left,
    }
}

/// Phase-A termination: anything sitting on the spawn edge?
pub fn is_edge_full(grid: &ColorGrid, fall: Direction) -> bool {
    grid.edge_occupied(spawn_edge(fall))
}

/// Upper bound on any slide; a piece can cross the grid once from above the top.
const MAX_SLIDE: i32 = 2 * GRID_SIZE as i32;

/// How many free steps the piece can take along `dir` before it's blocked.
pub fn drop_distance(grid: &ColorGrid, piece: &Piece, dir: Direction, bounds: Bounds) -> i32 {
    let (sx, sy) = dir.delta();
    let mut steps = 0;
    while steps < MAX_SLIDE && can_place(grid, piece, sx * (steps + 1), sy * (steps + 1), bounds) {
        steps += 1;
    }
    steps
}
