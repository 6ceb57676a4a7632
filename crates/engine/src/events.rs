//! Engine output. Engines push, the game drains in emission order.

use std::collections::VecDeque;

use l2w_core::{BlockType, Cell, Color, CounterKind, Phase, PieceId, Shape};
use serde::{Deserialize, Serialize};

use crate::wblock::PairKey;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Score { delta: i64 },
    Counter { kind: CounterKind, delta: i64 },
    PieceSpawned { shape: Shape, color: Color },
    PieceLocked { shape: Shape, color: Color },
    LBlockCleared { block: BlockType, cells: Vec<Cell> },
    /// Phase A is over: spawn edge reached or the next piece has no room.
    EdgeFull,
    BlockPlaced { id: PieceId, block: BlockType },
    BlockRemoved { id: PieceId, block: BlockType },
    WFormed { pair: PairKey },
    WBroken { pair: PairKey },
    PartBEnded { resolved: bool },
    TimeUp,
    PhaseChanged { from: Phase, to: Phase },
}

impl GameEvent {
    pub fn score(delta: i64) -> Self {
        GameEvent::Score { delta }
    }

    pub fn counter(kind: impl Into<CounterKind>, delta: i64) -> Self {
        GameEvent::Counter {
            kind: kind.into(),
            delta,
        }
    }

    /// Does this event carry a state delta?
    pub fn is_delta(&self) -> bool {
        matches!(self, GameEvent::Score { .. } | GameEvent::Counter { .. })
    }
}

/// FIFO command buffer.
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<GameEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }
}
