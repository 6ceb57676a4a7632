//! Phase-A engine: falling pieces, locking, L-block clearing, edge-full end.
//!
//! Every intent validates against the grid first and is a silent no-op on
//! failure. Score and counter changes leave as events.

use l2w_core::{ColorGrid, CounterKind, Direction, Horizontal, Orientation, Piece, Vertical};
use tracing::debug;

use crate::collision::{self, Bounds};
use crate::config::{GameConfig, ScoreTable};
use crate::events::{EventQueue, GameEvent};
use crate::generator::PieceGenerator;
use crate::lblock::{clear_loop, ClearReport, LDetector};

/// What happened when a piece locked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockOutcome {
    /// No pattern on the grid; the next piece is already live (or the phase ended).
    Resolved,
    /// Patterns are present; call `resolve` once the clear delay has elapsed.
    ClearPending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallOutcome {
    Moved,
    Locked(LockOutcome),
    /// Nothing falling (not started, ended, or waiting on a clear).
    Idle,
}

#[derive(Debug)]
pub struct PartAEngine {
    grid: ColorGrid,
    active: Option<Piece>,
    next: Option<Piece>,
    level: u32,
    orientation: Orientation,
    generator: PieceGenerator,
    detector: LDetector,
    bounds: Bounds,
    scores: ScoreTable,
    gravity_after_clear: bool,
    awaiting_clear: bool,
    running: bool,
}

impl PartAEngine {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid: ColorGrid::new(),
            active: None,
            next: None,
            level: 1,
            orientation: Orientation::Down,
            generator: PieceGenerator::new(&config.shape_pool, config.seed),
            detector: LDetector::for_ruleset(config.ruleset),
            bounds: config.ruleset.bounds(),
            scores: config.scores,
            gravity_after_clear: config.gravity_after_clear,
            awaiting_clear: false,
            running: false,
        }
    }

    /// Fresh grid at `level`, first two pieces dealt.
    pub fn start(&mut self, level: u32, events: &mut EventQueue) {
        self.grid = ColorGrid::new();
        self.level = level.max(1);
        self.orientation = Orientation::for_level(self.level);
        self.awaiting_clear = false;
        self.running = true;
        let first = self.generator.generate(None, self.level);
        let second = self.generator.generate(Some(first.color), self.level);
        events.push(GameEvent::PieceSpawned {
            shape: first.shape,
            color: first.color,
        });
        debug!(shape = ?first.shape, level = self.level, "phase A started");
        self.active = Some(first);
        self.next = Some(second);
    }

    /// Drop all pieces and stop. Pending clears are forgotten.
    pub fn stop(&mut self) {
        self.running = false;
        self.awaiting_clear = false;
        self.active = None;
        self.next = None;
    }

    pub fn grid(&self) -> &ColorGrid {
        &self.grid
    }

    /// Replace the grid; used to stage boards in tests and tools.
    pub fn set_grid(&mut self, grid: ColorGrid) {
        self.grid = grid;
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// Swap in a specific falling piece. Rejected if it does not fit.
    pub fn set_active(&mut self, piece: Piece) -> bool {
        if !self.running || !collision::can_place(&self.grid, &piece, 0, 0, self.bounds()) {
            return false;
        }
        self.active = Some(piece);
        true
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_awaiting_clear(&self) -> bool {
        self.awaiting_clear
    }

    pub fn detector(&self) -> &LDetector {
        &self.detector
    }

    /// Ruleset bounds narrowed to the current fall direction.
    fn bounds(&self) -> Bounds {
        self.bounds.for_fall(self.orientation.fall_direction())
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        let bounds = self.bounds();
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        if !collision::can_place(&self.grid, piece, dx, dy, bounds) {
            return false;
        }
        piece.x += dx;
        piece.y += dy;
        true
    }

    /// One tick of automatic fall.
    pub fn step_fall(&mut self, events: &mut EventQueue) -> FallOutcome {
        if !self.running || self.active.is_none() {
            return FallOutcome::Idle;
        }
        let (dx, dy) = self.orientation.fall_direction().delta();
        if self.try_shift(dx, dy) {
            FallOutcome::Moved
        } else {
            FallOutcome::Locked(self.lock(events))
        }
    }

    pub fn move_horizontal(&mut self, dir: Horizontal) -> bool {
        let (dx, dy) = self.orientation.horizontal_movement(dir);
        self.try_shift(dx, dy)
    }

    /// Only the sideways-falling orientations accept vertical moves.
    pub fn move_vertical(&mut self, dir: Vertical) -> bool {
        if !self.orientation.allows_vertical_moves() {
            return false;
        }
        let (dx, dy) = self.orientation.vertical_movement(dir);
        self.try_shift(dx, dy)
    }

    pub fn move_down(&mut self, events: &mut EventQueue) -> Option<LockOutcome> {
        self.drop_in(Direction::Down, events)
    }

    /// Hard drop along the fall direction.
    pub fn drop(&mut self, events: &mut EventQueue) -> Option<LockOutcome> {
        self.drop_in(self.orientation.fall_direction(), events)
    }

    /// Slide along `dir` until blocked, then lock.
    pub fn drop_in(&mut self, dir: Direction, events: &mut EventQueue) -> Option<LockOutcome> {
        if !self.running {
            return None;
        }
        let piece = self.active.as_ref()?;
        let steps = collision::drop_distance(&self.grid, piece, dir, self.bounds());
        let (dx, dy) = dir.delta();
        self.try_shift(dx * steps, dy * steps);
        Some(self.lock(events))
    }

    pub fn rotate(&mut self) -> bool {
        let Some(piece) = self.active.as_ref() else {
            return false;
        };
        let turned = piece.rotated();
        if !collision::can_place(&self.grid, &turned, 0, 0, self.bounds()) {
            return false;
        }
        self.active = Some(turned);
        true
    }

    /// Commit the active piece. The active slot is emptied right away.
    pub fn lock(&mut self, events: &mut EventQueue) -> LockOutcome {
        let Some(piece) = self.active.take() else {
            return LockOutcome::Resolved;
        };
        self.grid = collision::place(&self.grid, &piece);
        debug!(shape = ?piece.shape, x = piece.x, y = piece.y, "piece locked");
        events.push(GameEvent::PieceLocked {
            shape: piece.shape,
            color: piece.color,
        });
        if self.detector.has_any(&self.grid) {
            self.awaiting_clear = true;
            LockOutcome::ClearPending
        } else {
            self.finish_lock(events);
            LockOutcome::Resolved
        }
    }

    /// Run the clear loop after a `ClearPending` lock, then continue play.
    pub fn resolve(&mut self, events: &mut EventQueue) -> ClearReport {
        let gravity = self
            .gravity_after_clear
            .then(|| self.orientation.fall_direction());
        let report = clear_loop(&self.detector, &self.grid, gravity);
        for found in &report.clears {
            let value = self.scores.l_block(found.block) as i64;
            debug!(block = ?found.block, row = found.origin.row, col = found.origin.col, "L-block cleared");
            events.push(GameEvent::LBlockCleared {
                block: found.block,
                cells: found.cells.to_vec(),
            });
            events.push(GameEvent::counter(CounterKind::from(found.block), 1));
            events.push(GameEvent::score(value));
        }
        self.grid = report.grid.clone();
        self.awaiting_clear = false;
        if self.running {
            self.finish_lock(events);
        }
        report
    }

    fn finish_lock(&mut self, events: &mut EventQueue) {
        if collision::is_edge_full(&self.grid, self.orientation.fall_direction()) {
            debug!(level = self.level, "spawn edge reached");
            self.end(events);
            return;
        }
        let Some(promoted) = self.next.take() else {
            self.end(events);
            return;
        };
        if !collision::can_place(&self.grid, &promoted, 0, 0, self.bounds()) {
            debug!(shape = ?promoted.shape, "no room to spawn");
            self.end(events);
            return;
        }
        self.next = Some(self.generator.generate(Some(promoted.color), self.level));
        events.push(GameEvent::PieceSpawned {
            shape: promoted.shape,
            color: promoted.color,
        });
        self.active = Some(promoted);
    }

    fn end(&mut self, events: &mut EventQueue) {
        self.stop();
        events.push(GameEvent::EdgeFull);
    }
}
