//! Drag-and-drop controller for Phase B.
//!
//! Turns grab / move / release into engine calls: a counter drop places,
//! a board drop moves, a release without movement rotates, a drop off the
//! grid removes. Holds the last conflict for display and interaction gating.

use l2w_core::{BlockType, BoardPiece, Cell, PieceId, PieceRotation};
use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::events::EventQueue;
use crate::part_b::{Outcome, PartBEngine};
use crate::validation::Conflict;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragSource {
    Counter(BlockType),
    Board(PieceId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct DragState {
    source: DragSource,
    block: BlockType,
    rotation: PieceRotation,
    /// Grabbed cell minus piece anchor.
    offset: (i32, i32),
    origin: Cell,
    hover: Option<Cell>,
    moved: bool,
}

impl DragState {
    fn anchor_for(&self, cell: Cell) -> Cell {
        cell.offset(-self.offset.0, -self.offset.1)
    }
}

/// What the renderer should draw under the pointer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPreview {
    pub block: BlockType,
    pub rotation: PieceRotation,
    pub anchor: Cell,
    pub cells: Vec<Cell>,
    pub valid: bool,
}

/// Last failed drop. `piece` is set when a board piece caused it.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictState {
    pub piece: Option<PieceId>,
    pub cells: Vec<Cell>,
    pub blocking: Vec<PieceId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragResult {
    Placed(PieceId),
    Moved(PieceId),
    Rotated(PieceId),
    Removed(PieceId),
    Conflict(Conflict),
    Cancelled,
}

#[derive(Clone, Debug, Default)]
pub struct DragController {
    drag: Option<DragState>,
    preview: Option<DragPreview>,
    conflict: Option<ConflictState>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn source(&self) -> Option<DragSource> {
        self.drag.as_ref().map(|d| d.source)
    }

    /// Cell the pointer was last seen over.
    pub fn hover(&self) -> Option<Cell> {
        self.drag.as_ref().and_then(|d| d.hover)
    }

    pub fn preview(&self) -> Option<&DragPreview> {
        self.preview.as_ref()
    }

    pub fn conflict(&self) -> Option<&ConflictState> {
        self.conflict.as_ref()
    }

    pub fn conflict_cells(&self) -> &[Cell] {
        self.conflict
            .as_ref()
            .map(|c| c.cells.as_slice())
            .unwrap_or_default()
    }

    pub fn clear_conflict(&mut self) {
        self.conflict = None;
    }

    /// Board piece that must be dealt with before anything else, if any.
    fn gating_piece(&self) -> Option<PieceId> {
        self.conflict.as_ref().and_then(|c| c.piece)
    }

    pub fn can_interact(&self, piece: Option<PieceId>) -> bool {
        match self.gating_piece() {
            Some(gate) => piece == Some(gate),
            None => true,
        }
    }

    /// Pick a unit off a counter. The pointer holds the mask's center cell.
    pub fn grab_counter(&mut self, engine: &PartBEngine, block: BlockType) -> Result<(), Rejection> {
        if let Some(gate) = self.gating_piece() {
            return Err(Rejection::ConflictBlocked(gate));
        }
        if engine.is_finished() {
            return Err(Rejection::Finished);
        }
        if engine.is_paused() {
            return Err(Rejection::Paused);
        }
        if engine.available(block) == 0 {
            return Err(Rejection::CounterEmpty(block));
        }
        let mask = block.mask();
        self.drag = Some(DragState {
            source: DragSource::Counter(block),
            block,
            rotation: PieceRotation::R0,
            offset: ((mask.rows() / 2) as i32, (mask.cols() / 2) as i32),
            origin: Cell::new(-1, -1),
            hover: None,
            moved: false,
        });
        self.preview = None;
        Ok(())
    }

    /// Pick up the board piece under `cell`.
    pub fn grab_board(&mut self, engine: &PartBEngine, cell: Cell) -> Result<PieceId, Rejection> {
        if engine.is_finished() {
            return Err(Rejection::Finished);
        }
        if engine.is_paused() {
            return Err(Rejection::Paused);
        }
        let piece = engine.find_piece_at(cell).ok_or(Rejection::NoPieceAt(cell))?;
        if !self.can_interact(Some(piece.id)) {
            return Err(Rejection::ConflictBlocked(self.gating_piece().unwrap_or(piece.id)));
        }
        if engine.is_locked(piece) {
            return Err(Rejection::Locked(piece.id));
        }
        self.conflict = None;
        self.drag = Some(DragState {
            source: DragSource::Board(piece.id),
            block: piece.block,
            rotation: piece.rotation,
            offset: (cell.row - piece.anchor.row, cell.col - piece.anchor.col),
            origin: cell,
            hover: Some(cell),
            moved: false,
        });
        self.preview = None;
        Ok(piece.id)
    }

    /// Pointer moved over `cell`; refreshes the preview.
    pub fn move_to(&mut self, engine: &PartBEngine, cell: Cell) -> Option<&DragPreview> {
        let drag = self.drag.as_mut()?;
        if cell != drag.origin {
            drag.moved = true;
        }
        drag.hover = Some(cell);
        let ignore = match drag.source {
            DragSource::Board(id) => Some(id),
            DragSource::Counter(_) => None,
        };
        let anchor = drag.anchor_for(cell);
        let probe = BoardPiece::new(ignore.unwrap_or(PieceId(0)), drag.block, anchor, drag.rotation);
        self.preview = Some(DragPreview {
            block: drag.block,
            rotation: drag.rotation,
            anchor,
            cells: probe.cells().to_vec(),
            valid: engine.validate(&probe, ignore).is_ok(),
        });
        self.preview.as_ref()
    }

    pub fn cancel(&mut self) {
        self.drag = None;
        self.preview = None;
    }

    /// Drop at `target`; `None` or an off-grid cell means outside the board.
    pub fn release(
        &mut self,
        engine: &mut PartBEngine,
        target: Option<Cell>,
        events: &mut EventQueue,
    ) -> Result<DragResult, Rejection> {
        let drag = self.drag.take().ok_or(Rejection::NotDragging)?;
        self.preview = None;
        let target = target.filter(|c| c.in_bounds());

        let (piece, outcome) = match (drag.source, target) {
            (DragSource::Counter(_), None) => return Ok(DragResult::Cancelled),
            (DragSource::Counter(block), Some(cell)) => {
                let outcome = engine.place_new(block, drag.anchor_for(cell), drag.rotation, events)?;
                (None, outcome)
            }
            (DragSource::Board(id), None) => {
                engine.remove_piece(id, events)?;
                self.conflict = None;
                return Ok(DragResult::Removed(id));
            }
            (DragSource::Board(id), Some(_)) if !drag.moved => {
                let outcome = engine.rotate_piece(id, events)?;
                if outcome.is_committed() {
                    self.conflict = None;
                    return Ok(DragResult::Rotated(id));
                }
                (Some(id), outcome)
            }
            (DragSource::Board(id), Some(cell)) => {
                let outcome = engine.move_existing(id, drag.anchor_for(cell), events)?;
                (Some(id), outcome)
            }
        };

        match outcome {
            Outcome::Committed { piece: placed } => {
                self.conflict = None;
                Ok(match drag.source {
                    DragSource::Counter(_) => DragResult::Placed(placed),
                    DragSource::Board(_) => DragResult::Moved(placed),
                })
            }
            Outcome::Conflict(conflict) => {
                self.conflict = Some(ConflictState {
                    piece,
                    cells: conflict.cells.clone(),
                    blocking: conflict.blocking.clone(),
                });
                Ok(DragResult::Conflict(conflict))
            }
        }
    }
}
