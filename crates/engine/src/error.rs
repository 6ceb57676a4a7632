//! Error types for rejected Phase-B actions and misrouted game calls.

use l2w_core::{BlockType, Cell, Phase, PieceId};

/// A Phase-B action refused before any placement check ran.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("{0} is part of a W-block and locked")]
    Locked(PieceId),
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),
    #[error("no piece at row {}, column {}", .0.row, .0.col)]
    NoPieceAt(Cell),
    #[error("no {0:?} units left")]
    CounterEmpty(BlockType),
    #[error("board is paused")]
    Paused,
    #[error("phase B has already ended")]
    Finished,
    #[error("resolve the conflict on {0} first")]
    ConflictBlocked(PieceId),
    #[error("nothing is being dragged")]
    NotDragging,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("not allowed in phase {actual:?}")]
    WrongPhase { actual: Phase },
    #[error("the phase B clock has not run out")]
    NotTimedOut,
    #[error(transparent)]
    Rejected(#[from] Rejection),
}
