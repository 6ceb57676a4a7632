//! random piece dealing and level-dependent spawn placement

use l2w_core::{Color, Edge, Orientation, Piece, Shape, GRID_SIZE};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug)]
pub struct PieceGenerator {
    rng: SmallRng,
    pool: Vec<Shape>,
}

impl PieceGenerator {
    /// An empty pool falls back to the seven standard shapes.
    pub fn new(pool: &[Shape], seed: Option<u64>) -> Self {
        let pool = if pool.is_empty() {
            Shape::STANDARD.to_vec()
        } else {
            pool.to_vec()
        };
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng, pool }
    }

    pub fn pool(&self) -> &[Shape] {
        &self.pool
    }

    /// Uniform over the palette minus `last`; the full palette if that leaves nothing.
    pub fn pick_color(&mut self, last: Option<Color>) -> Color {
        let candidates: Vec<Color> = Color::all().filter(|c| Some(*c) != last).collect();
        let domain = if candidates.is_empty() {
            Color::all().collect()
        } else {
            candidates
        };
        domain[self.rng.gen_range(0..domain.len())]
    }

    pub fn pick_shape(&mut self) -> Shape {
        self.pool.choose(&mut self.rng).copied().unwrap_or(Shape::I)
    }

    /// New piece, pre-rotated for the level and anchored at its spawn point.
    pub fn generate(&mut self, last_color: Option<Color>, level: u32) -> Piece {
        let shape = self.pick_shape();
        let color = self.pick_color(last_color);
        let orientation = Orientation::for_level(level);
        let mut piece = Piece::new(shape, color, 0, 0);
        piece.mask = piece.mask.rotated(orientation.quarter_turns());
        let (x, y) = self.spawn_position(level, piece.width(), piece.height());
        piece.x = x;
        piece.y = y;
        piece
    }

    /// Flush against the spawn edge; centered on odd levels, random on even ones.
    pub fn spawn_position(&mut self, level: u32, width: usize, height: usize) -> (i32, i32) {
        let orientation = Orientation::for_level(level);
        let span = lateral_span(orientation.spawn_edge(), width, height);
        let lateral = if level % 2 == 1 {
            centered(span)
        } else {
            self.rng.gen_range(0..=max_offset(span))
        };
        spawn_anchor(orientation, lateral, width, height)
    }
}

/// Extent of the piece along the spawn edge.
fn lateral_span(edge: Edge, width: usize, height: usize) -> usize {
    match edge {
        Edge::Top | Edge::Bottom => width,
        Edge::Left | Edge::Right => height,
    }
}

fn max_offset(span: usize) -> i32 {
    GRID_SIZE.saturating_sub(span) as i32
}

fn centered(span: usize) -> i32 {
    (GRID_SIZE / 2) as i32 - (span / 2) as i32
}

/// Anchor for a piece whose lateral coordinate along the spawn edge is `lateral`.
pub fn spawn_anchor(orientation: Orientation, lateral: i32, width: usize, height: usize) -> (i32, i32) {
    let n = GRID_SIZE as i32;
    match orientation.spawn_edge() {
        Edge::Top => (lateral, 0),
        Edge::Bottom => (lateral, n - height as i32),
        Edge::Right => (n - width as i32, lateral),
        Edge::Left => (0, lateral),
    }
}
