//! square play grid - row-major cells, row 0 at the top
//! generic over the cell value so both phases share bounds/gravity logic

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::orientation::{Direction, Edge};
use crate::piece::Color;

/// Side length of both play grids.
pub const GRID_SIZE: usize = 14;

/// Signed grid coordinate. Off-grid values are legal for in-flight math.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    pub fn in_bounds(self) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < GRID_SIZE && (self.col as usize) < GRID_SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("expected {expected} rows, got {got}")]
    RowCount { expected: usize, got: usize },
    #[error("row {row} has {got} cells, expected {expected}")]
    RowLength { row: usize, expected: usize, got: usize },
    #[error("cell value {value} at row {row}, column {col} is outside the palette")]
    InvalidValue { row: usize, col: usize, value: u8 },
}

/// N×N matrix; `T::default()` is the empty cell.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Grid<T = u8> {
    cells: [[T; GRID_SIZE]; GRID_SIZE],
}

/// Phase-A grid: 0 empty, 1..=7 palette index + 1.
pub type ColorGrid = Grid<u8>;

impl<T: Copy + Default + PartialEq> Default for Grid<T> {
    fn default() -> Self {
        Self {
            cells: [[T::default(); GRID_SIZE]; GRID_SIZE],
        }
    }
}

impl<T: Copy + Default + PartialEq> Grid<T> {
    pub const SIZE: usize = GRID_SIZE;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, GridError> {
        if rows.len() != GRID_SIZE {
            return Err(GridError::RowCount {
                expected: GRID_SIZE,
                got: rows.len(),
            });
        }
        let mut grid = Self::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() != GRID_SIZE {
                return Err(GridError::RowLength {
                    row: y,
                    expected: GRID_SIZE,
                    got: row.len(),
                });
            }
            grid.cells[y].copy_from_slice(row);
        }
        Ok(grid)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.cells[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.cells[row][col] = value;
    }

    /// Bounds-checked read; `None` off-grid.
    pub fn at(&self, cell: Cell) -> Option<T> {
        if cell.in_bounds() {
            Some(self.cells[cell.row as usize][cell.col as usize])
        } else {
            None
        }
    }

    /// Bounds-checked write; off-grid writes are dropped.
    pub fn put(&mut self, cell: Cell, value: T) -> bool {
        if cell.in_bounds() {
            self.cells[cell.row as usize][cell.col as usize] = value;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.cells[row][col] != T::default()
    }

    pub fn row(&self, row: usize) -> &[T; GRID_SIZE] {
        &self.cells[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T; GRID_SIZE]> {
        self.cells.iter()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&v| v != T::default())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// Copy with every listed in-bounds cell reset to empty.
    pub fn with_cells_cleared(&self, cells: &[Cell]) -> Self {
        let mut next = self.clone();
        next.clear_cells(cells);
        next
    }

    pub fn clear_cells(&mut self, cells: &[Cell]) {
        for &cell in cells {
            self.put(cell, T::default());
        }
    }

    /// Does the given outer row/column hold any non-empty cell?
    pub fn edge_occupied(&self, edge: Edge) -> bool {
        let last = GRID_SIZE - 1;
        match edge {
            Edge::Top => self.cells[0].iter().any(|&v| v != T::default()),
            Edge::Bottom => self.cells[last].iter().any(|&v| v != T::default()),
            Edge::Left => self.cells.iter().any(|row| row[0] != T::default()),
            Edge::Right => self.cells.iter().any(|row| row[last] != T::default()),
        }
    }

    /// Slides every non-empty cell toward `toward`, line by line, keeping
    /// relative order within each line.
    pub fn compact(&self, toward: Direction) -> Self {
        let mut next = Self::new();
        for line in 0..GRID_SIZE {
            let mut slot = 0;
            for step in 0..GRID_SIZE {
                let (r, c) = line_position(toward, line, step);
                let value = self.cells[r][c];
                if value != T::default() {
                    let (tr, tc) = line_position(toward, line, slot);
                    next.cells[tr][tc] = value;
                    slot += 1;
                }
            }
        }
        next
    }

    /// Column-wise compaction toward the bottom row.
    pub fn apply_gravity(&self) -> Self {
        self.compact(Direction::Down)
    }
}

/// `step`-th cell of `line`, counted from the edge cells slide toward.
#[inline]
fn line_position(toward: Direction, line: usize, step: usize) -> (usize, usize) {
    let last = GRID_SIZE - 1;
    match toward {
        Direction::Down => (last - step, line),
        Direction::Up => (step, line),
        Direction::Right => (line, last - step),
        Direction::Left => (line, step),
    }
}

impl ColorGrid {
    /// Like `from_rows`, but also rejects values outside `0..=Color::COUNT`.
    pub fn from_color_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let grid = Self::from_rows(rows)?;
        for (y, row) in grid.cells.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != 0 && Color::from_cell_value(value).is_none() {
                    return Err(GridError::InvalidValue { row: y, col: x, value });
                }
            }
        }
        Ok(grid)
    }
}

impl<T: Serialize> Serialize for Grid<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rows: Vec<&[T]> = self.cells.iter().map(|row| row.as_slice()).collect();
        rows.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Grid<T>
where
    T: Deserialize<'de> + Copy + Default + PartialEq,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows: Vec<Vec<T>> = Vec::deserialize(deserializer)?;
        Grid::from_rows(&rows).map_err(serde::de::Error::custom)
    }
}

impl<T: Copy + Default + PartialEq> std::fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for &value in row {
                write!(f, "{}", if value != T::default() { "[]" } else { " ." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
