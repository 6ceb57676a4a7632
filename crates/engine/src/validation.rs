//! Phase-B placement validation against bounds, pieces and locked cells.

use l2w_core::{BlockType, BoardPiece, Cell, PieceId, PieceRotation, GRID_SIZE};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Why a candidate does not fit. `blocking` lists distinct piece ids in
/// first-hit order; off-grid and locked cells have no blocker.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Conflict {
    pub cells: Vec<Cell>,
    pub blocking: Vec<PieceId>,
}

/// Cell -> owning piece for every piece except `ignore`.
pub fn occupancy(pieces: &[BoardPiece], ignore: Option<PieceId>) -> FxHashMap<Cell, PieceId> {
    let mut map = FxHashMap::default();
    for piece in pieces.iter().filter(|p| Some(p.id) != ignore) {
        for cell in piece.cells() {
            map.insert(cell, piece.id);
        }
    }
    map
}

pub fn validate(
    candidate: &BoardPiece,
    pieces: &[BoardPiece],
    locked: &FxHashSet<Cell>,
    ignore: Option<PieceId>,
) -> Result<(), Conflict> {
    validate_with(candidate, &occupancy(pieces, ignore), locked)
}

/// Same as `validate` with a prebuilt occupancy map.
pub fn validate_with(
    candidate: &BoardPiece,
    occupied: &FxHashMap<Cell, PieceId>,
    locked: &FxHashSet<Cell>,
) -> Result<(), Conflict> {
    let mut conflict = Conflict::default();
    for cell in candidate.cells() {
        if !cell.in_bounds() || locked.contains(&cell) {
            conflict.cells.push(cell);
        } else if let Some(&owner) = occupied.get(&cell) {
            conflict.cells.push(cell);
            if !conflict.blocking.contains(&owner) {
                conflict.blocking.push(owner);
            }
        }
    }
    if conflict.cells.is_empty() {
        Ok(())
    } else {
        Err(conflict)
    }
}

/// Is there any anchor and rotation where a new `block` fits?
pub fn can_place_type(block: BlockType, pieces: &[BoardPiece], locked: &FxHashSet<Cell>) -> bool {
    let occupied = occupancy(pieces, None);
    let n = GRID_SIZE as i32;
    PieceRotation::ALL.iter().any(|&rotation| {
        (0..n).any(|row| {
            (0..n).any(|col| {
                let probe = BoardPiece::new(PieceId(u32::MAX), block, Cell::new(row, col), rotation);
                validate_with(&probe, &occupied, locked).is_ok()
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfb(id: u32, row: i32, col: i32) -> BoardPiece {
        BoardPiece::new(PieceId(id), BlockType::Rfb, Cell::new(row, col), PieceRotation::R0)
    }

    #[test]
    fn test_valid_on_empty_board() {
        let locked = FxHashSet::default();
        assert!(validate(&rfb(1, 0, 0), &[], &locked, None).is_ok());
    }

    #[test]
    fn test_out_of_bounds_cells_reported() {
        let locked = FxHashSet::default();
        let err = validate(&rfb(1, 13, 12), &[], &locked, None).unwrap_err();
        // (14,12) (14,13) (14,14) off the bottom; (13,12) is fine
        assert_eq!(err.cells.len(), 3);
        assert!(err.blocking.is_empty());
    }

    #[test]
    fn test_blockers_are_distinct() {
        let locked = FxHashSet::default();
        let board = vec![rfb(1, 0, 0), rfb(2, 0, 3)];
        // spans both pieces' bottom rows
        let candidate = BoardPiece::new(PieceId(3), BlockType::Rfb, Cell::new(0, 2), PieceRotation::R0);
        let err = validate(&candidate, &board, &locked, None).unwrap_err();
        assert_eq!(err.blocking, vec![PieceId(1), PieceId(2)]);
        assert_eq!(err.cells.len(), 3);
    }

    #[test]
    fn test_ignore_self() {
        let locked = FxHashSet::default();
        let board = vec![rfb(1, 4, 4)];
        let nudged = board[0].moved_to(Cell::new(4, 5));
        assert!(validate(&nudged, &board, &locked, Some(PieceId(1))).is_ok());
        assert!(validate(&nudged, &board, &locked, None).is_err());
    }

    #[test]
    fn test_locked_cells_conflict_without_blocker() {
        let locked: FxHashSet<Cell> = [Cell::new(1, 1)].into_iter().collect();
        let err = validate(&rfb(1, 0, 0), &[], &locked, None).unwrap_err();
        assert_eq!(err.cells, vec![Cell::new(1, 1)]);
        assert!(err.blocking.is_empty());
    }

    #[test]
    fn test_can_place_type_on_full_board() {
        let locked: FxHashSet<Cell> = (0..GRID_SIZE as i32)
            .flat_map(|r| (0..GRID_SIZE as i32).map(move |c| Cell::new(r, c)))
            .filter(|c| !(c.row < 2 && c.col < 3))
            .collect();
        // a 2x3 hole fits an unrotated RFB but never the 3x3 LFB
        assert!(can_place_type(BlockType::Rfb, &[], &locked));
        assert!(!can_place_type(BlockType::Lfb, &[], &locked));
    }
}
