//! Phase-B engine: persistent RFB/LFB pieces on a placement board.
//!
//! Every mutation runs validate-then-commit, then a W rescan, then the
//! completion check. Unit counts mirror the shared counters through events.

use l2w_core::{BlockType, BoardCell, BoardPiece, Cell, Grid, PieceId, PieceRotation};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::completion::{self, BoardSummary};
use crate::config::{CompletionRule, GameConfig};
use crate::error::Rejection;
use crate::events::{EventQueue, GameEvent};
use crate::validation::{self, Conflict};
use crate::wblock::{RescanReport, WBlockTracker};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Committed { piece: PieceId },
    Conflict(Conflict),
}

impl Outcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartBSettings {
    pub w_value: u32,
    pub w_lock_level: u32,
    pub rule: CompletionRule,
}

impl From<&GameConfig> for PartBSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            w_value: config.scores.w_block,
            w_lock_level: config.w_lock_level,
            rule: config.completion_rule,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PartBEngine {
    pieces: Vec<BoardPiece>,
    locked: FxHashSet<Cell>,
    next_id: u32,
    rfb_available: u32,
    lfb_available: u32,
    level: u32,
    settings: PartBSettings,
    tracker: WBlockTracker,
    paused: bool,
    finished: bool,
}

impl PartBEngine {
    pub fn new(level: u32, rfb_available: u32, lfb_available: u32, settings: PartBSettings) -> Self {
        Self {
            pieces: Vec::new(),
            locked: FxHashSet::default(),
            next_id: 1,
            rfb_available,
            lfb_available,
            level: level.max(1),
            settings,
            tracker: WBlockTracker::new(),
            paused: false,
            finished: false,
        }
    }

    /// Pre-filled obstacle cells. Off-grid cells are ignored.
    pub fn with_locked_cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.locked = cells.into_iter().filter(|c| c.in_bounds()).collect();
        self
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn pieces(&self) -> &[BoardPiece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&BoardPiece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn find_piece_at(&self, cell: Cell) -> Option<&BoardPiece> {
        self.pieces.iter().find(|p| p.covers(cell))
    }

    pub fn locked_cells(&self) -> &FxHashSet<Cell> {
        &self.locked
    }

    pub fn available(&self, block: BlockType) -> u32 {
        match block {
            BlockType::Rfb => self.rfb_available,
            BlockType::Lfb => self.lfb_available,
        }
    }

    fn available_mut(&mut self, block: BlockType) -> &mut u32 {
        match block {
            BlockType::Rfb => &mut self.rfb_available,
            BlockType::Lfb => &mut self.lfb_available,
        }
    }

    pub fn formations(&self) -> usize {
        self.tracker.scored_count()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// W members freeze once the level reaches the lock threshold.
    pub fn is_locked(&self, piece: &BoardPiece) -> bool {
        piece.is_w_block && self.level >= self.settings.w_lock_level
    }

    /// Grid view derived from the piece set.
    pub fn build_grid(&self) -> Grid<BoardCell> {
        let mut grid = Grid::new();
        for &cell in &self.locked {
            grid.put(cell, BoardCell::Locked);
        }
        for piece in &self.pieces {
            for cell in piece.cells() {
                grid.put(cell, piece.block.board_cell());
            }
        }
        grid
    }

    pub fn validate(&self, candidate: &BoardPiece, ignore: Option<PieceId>) -> Result<(), Conflict> {
        validation::validate(candidate, &self.pieces, &self.locked, ignore)
    }

    pub fn can_place_type(&self, block: BlockType) -> bool {
        validation::can_place_type(block, &self.pieces, &self.locked)
    }

    fn guard(&self) -> Result<(), Rejection> {
        if self.finished {
            return Err(Rejection::Finished);
        }
        if self.paused {
            return Err(Rejection::Paused);
        }
        Ok(())
    }

    /// Index of a piece that may still be touched.
    fn movable_index(&self, id: PieceId) -> Result<usize, Rejection> {
        self.guard()?;
        let index = self
            .pieces
            .iter()
            .position(|p| p.id == id)
            .ok_or(Rejection::UnknownPiece(id))?;
        if self.is_locked(&self.pieces[index]) {
            return Err(Rejection::Locked(id));
        }
        Ok(index)
    }

    pub fn place_new(
        &mut self,
        block: BlockType,
        anchor: Cell,
        rotation: PieceRotation,
        events: &mut EventQueue,
    ) -> Result<Outcome, Rejection> {
        self.guard()?;
        if self.available(block) == 0 {
            return Err(Rejection::CounterEmpty(block));
        }
        let id = PieceId(self.next_id);
        let candidate = BoardPiece::new(id, block, anchor, rotation);
        if let Err(conflict) = self.validate(&candidate, None) {
            return Ok(Outcome::Conflict(conflict));
        }
        self.next_id += 1;
        *self.available_mut(block) -= 1;
        self.pieces.push(candidate);
        debug!(%id, ?block, row = anchor.row, col = anchor.col, "block placed");
        events.push(GameEvent::BlockPlaced { id, block });
        events.push(GameEvent::counter(block, -1));
        self.after_change(events);
        Ok(Outcome::Committed { piece: id })
    }

    pub fn move_existing(&mut self, id: PieceId, anchor: Cell, events: &mut EventQueue) -> Result<Outcome, Rejection> {
        let index = self.movable_index(id)?;
        let candidate = self.pieces[index].moved_to(anchor);
        self.commit(index, candidate, events)
    }

    /// Quarter turn clockwise about the anchor.
    pub fn rotate_piece(&mut self, id: PieceId, events: &mut EventQueue) -> Result<Outcome, Rejection> {
        let index = self.movable_index(id)?;
        let candidate = self.pieces[index].turned();
        self.commit(index, candidate, events)
    }

    fn commit(&mut self, index: usize, candidate: BoardPiece, events: &mut EventQueue) -> Result<Outcome, Rejection> {
        let id = candidate.id;
        if let Err(conflict) = self.validate(&candidate, Some(id)) {
            return Ok(Outcome::Conflict(conflict));
        }
        self.pieces[index] = candidate;
        self.after_change(events);
        Ok(Outcome::Committed { piece: id })
    }

    /// Take a piece off the board and return its unit.
    pub fn remove_piece(&mut self, id: PieceId, events: &mut EventQueue) -> Result<BoardPiece, Rejection> {
        let index = self.movable_index(id)?;
        let piece = self.pieces.remove(index);
        *self.available_mut(piece.block) += 1;
        debug!(%id, block = ?piece.block, "block removed");
        events.push(GameEvent::BlockRemoved { id, block: piece.block });
        events.push(GameEvent::counter(piece.block, 1));
        self.after_change(events);
        Ok(piece)
    }

    /// Re-run W detection without any piece change.
    pub fn rescan(&mut self, events: &mut EventQueue) -> RescanReport {
        self.tracker.rescan(&mut self.pieces, self.settings.w_value, events)
    }

    fn after_change(&mut self, events: &mut EventQueue) {
        self.rescan(events);
        self.check_completion(events);
    }

    pub fn summary(&self) -> BoardSummary {
        let unpaired = |block: BlockType| {
            self.pieces
                .iter()
                .filter(|p| p.block == block && !p.is_w_block)
                .count()
        };
        BoardSummary {
            rfb_available: self.rfb_available,
            lfb_available: self.lfb_available,
            unpaired_rfb: unpaired(BlockType::Rfb),
            unpaired_lfb: unpaired(BlockType::Lfb),
            fits_rfb: self.can_place_type(BlockType::Rfb),
            fits_lfb: self.can_place_type(BlockType::Lfb),
            formations: self.tracker.scored_count(),
        }
    }

    /// Fires `PartBEnded` at most once per round.
    pub fn check_completion(&mut self, events: &mut EventQueue) -> Option<bool> {
        if self.finished {
            return None;
        }
        let resolved = completion::evaluate(self.settings.rule, &self.summary())?;
        self.finished = true;
        debug!(resolved, level = self.level, "phase B finished");
        events.push(GameEvent::PartBEnded { resolved });
        Some(resolved)
    }

    /// New round on the same board with fresh unit counts.
    pub fn refill(&mut self, rfb_available: u32, lfb_available: u32, events: &mut EventQueue) {
        self.rfb_available = rfb_available;
        self.lfb_available = lfb_available;
        self.finished = false;
        self.paused = false;
        self.check_completion(events);
    }

    /// "Keep going": wipe the board, keep unit counts, forget credited W pairs.
    pub fn reset_grid(&mut self, events: &mut EventQueue) {
        self.pieces.clear();
        self.tracker.reset();
        self.paused = false;
        self.finished = false;
        self.check_completion(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use l2w_core::CounterKind;

    fn settings() -> PartBSettings {
        PartBSettings::from(&GameConfig::standard())
    }

    fn place(engine: &mut PartBEngine, block: BlockType, row: i32, col: i32, events: &mut EventQueue) -> PieceId {
        match engine
            .place_new(block, Cell::new(row, col), PieceRotation::R0, events)
            .unwrap()
        {
            Outcome::Committed { piece } => piece,
            Outcome::Conflict(c) => panic!("unexpected conflict {c:?}"),
        }
    }

    #[test]
    fn test_place_consumes_unit() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 2, 2, settings());
        let id = place(&mut engine, BlockType::Rfb, 3, 3, &mut events);
        assert_eq!(id, PieceId(1));
        assert_eq!(engine.available(BlockType::Rfb), 1);
        assert!(events.iter().any(|e| *e == GameEvent::counter(CounterKind::Rfb, -1)));
        assert_eq!(engine.build_grid().get(4, 5), BoardCell::Rfb);
    }

    #[test]
    fn test_place_rejected_without_units() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 0, 3, settings());
        let result = engine.place_new(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0, &mut events);
        assert_eq!(result, Err(Rejection::CounterEmpty(BlockType::Rfb)));
    }

    #[test]
    fn test_conflict_leaves_state_untouched() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 3, 3, settings());
        let first = place(&mut engine, BlockType::Rfb, 0, 0, &mut events);
        events.drain().for_each(drop);
        let outcome = engine
            .place_new(BlockType::Rfb, Cell::new(0, 1), PieceRotation::R0, &mut events)
            .unwrap();
        match outcome {
            Outcome::Conflict(c) => assert_eq!(c.blocking, vec![first]),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(engine.available(BlockType::Rfb), 2);
        assert_eq!(engine.pieces().len(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_w_pair_scores_and_locks_at_level_two() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(2, 2, 2, settings());
        let rfb = place(&mut engine, BlockType::Rfb, 0, 0, &mut events);
        let lfb = place(&mut engine, BlockType::Lfb, 0, 2, &mut events);
        assert_eq!(engine.formations(), 1);
        assert!(engine.pieces().iter().all(|p| p.is_w_block));
        assert_eq!(engine.move_existing(rfb, Cell::new(5, 5), &mut events), Err(Rejection::Locked(rfb)));
        assert_eq!(engine.rotate_piece(lfb, &mut events), Err(Rejection::Locked(lfb)));
        assert!(matches!(engine.remove_piece(lfb, &mut events), Err(Rejection::Locked(_))));
    }

    #[test]
    fn test_level_one_w_stays_movable() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 2, 2, settings());
        let rfb = place(&mut engine, BlockType::Rfb, 0, 0, &mut events);
        place(&mut engine, BlockType::Lfb, 0, 2, &mut events);
        events.drain().for_each(drop);
        let outcome = engine.move_existing(rfb, Cell::new(8, 0), &mut events).unwrap();
        assert!(outcome.is_committed());
        assert_eq!(engine.formations(), 0);
        let deltas: i64 = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Score { delta } => Some(*delta),
                _ => None,
            })
            .sum();
        assert_eq!(deltas, -200);
    }

    #[test]
    fn test_remove_returns_unit() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 1, 1, settings());
        let id = place(&mut engine, BlockType::Lfb, 5, 5, &mut events);
        assert_eq!(engine.available(BlockType::Lfb), 0);
        let removed = engine.remove_piece(id, &mut events).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(engine.available(BlockType::Lfb), 1);
        assert!(engine.find_piece_at(Cell::new(7, 7)).is_none());
        assert_eq!(engine.remove_piece(id, &mut events), Err(Rejection::UnknownPiece(id)));
    }

    #[test]
    fn test_rotate_against_wall_is_conflict() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 2, 2, settings());
        // R0 RFB is 2x3; at (12, 11) a turn to 3x2 would run off the bottom
        let id = place(&mut engine, BlockType::Rfb, 12, 11, &mut events);
        let outcome = engine.rotate_piece(id, &mut events).unwrap();
        assert!(matches!(outcome, Outcome::Conflict(ref c) if c.blocking.is_empty()));
        assert_eq!(engine.piece(id).map(|p| p.rotation), Some(PieceRotation::R0));
    }

    #[test]
    fn test_strict_completion_fires_once() {
        let mut events = EventQueue::new();
        let mut s = settings();
        s.rule = CompletionRule::Strict;
        let mut engine = PartBEngine::new(1, 1, 1, s);
        place(&mut engine, BlockType::Rfb, 0, 0, &mut events);
        assert!(!engine.is_finished());
        place(&mut engine, BlockType::Lfb, 0, 2, &mut events);
        assert!(engine.is_finished());
        let ends = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PartBEnded { resolved: true }))
            .count();
        assert_eq!(ends, 1);
        assert_eq!(engine.check_completion(&mut events), None);
        assert_eq!(
            engine.place_new(BlockType::Rfb, Cell::new(9, 9), PieceRotation::R0, &mut events),
            Err(Rejection::Finished)
        );
    }

    #[test]
    fn test_locked_cells_block_placement() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 1, 1, settings()).with_locked_cells([Cell::new(1, 1), Cell::new(30, 30)]);
        assert_eq!(engine.locked_cells().len(), 1);
        assert_eq!(engine.build_grid().get(1, 1), BoardCell::Locked);
        let outcome = engine
            .place_new(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0, &mut events)
            .unwrap();
        assert!(!outcome.is_committed());
    }

    #[test]
    fn test_paused_rejects_actions() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 2, 2, settings());
        engine.pause();
        assert_eq!(
            engine.place_new(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0, &mut events),
            Err(Rejection::Paused)
        );
        engine.resume();
        assert!(engine
            .place_new(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0, &mut events)
            .is_ok());
    }

    #[test]
    fn test_reset_grid_keeps_counts_and_score_events() {
        let mut events = EventQueue::new();
        let mut engine = PartBEngine::new(1, 3, 3, settings());
        place(&mut engine, BlockType::Rfb, 0, 0, &mut events);
        place(&mut engine, BlockType::Lfb, 0, 2, &mut events);
        events.drain().for_each(drop);
        engine.reset_grid(&mut events);
        assert!(engine.pieces().is_empty());
        assert_eq!(engine.available(BlockType::Rfb), 2);
        assert_eq!(engine.formations(), 0);
        assert!(!events.iter().any(|e| e.is_delta()));
    }
}
