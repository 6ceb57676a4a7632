//! W-block detection and idempotent scoring.
//!
//! A W is one RFB plus one LFB whose 9 cells match a reference footprint.
//! Formations are recomputed from scratch; the tracker diffs the result
//! against what it has already credited.

use std::fmt;

use l2w_core::{is_w_footprint, BlockType, BoardPiece, Cell, CounterKind, PieceId};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::events::{EventQueue, GameEvent};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PairKey {
    pub rfb: PieceId,
    pub lfb: PieceId,
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rfb.0, self.lfb.0)
    }
}

/// Do these two pieces form a W? Order-insensitive.
pub fn is_w_pair(a: &BoardPiece, b: &BoardPiece) -> bool {
    if a.block == b.block {
        return false;
    }
    let mut cells: SmallVec<[Cell; 9]> = a.cells().into_iter().chain(b.cells()).collect();
    cells.sort_unstable();
    cells.dedup();
    cells.len() == 9 && is_w_footprint(&cells)
}

/// Every RFB x LFB pair currently in formation, sorted.
pub fn detect_all(pieces: &[BoardPiece]) -> Vec<PairKey> {
    let mut pairs = Vec::new();
    for rfb in pieces.iter().filter(|p| p.block == BlockType::Rfb) {
        for lfb in pieces.iter().filter(|p| p.block == BlockType::Lfb) {
            if is_w_pair(rfb, lfb) {
                pairs.push(PairKey {
                    rfb: rfb.id,
                    lfb: lfb.id,
                });
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RescanReport {
    pub formed: Vec<PairKey>,
    pub broken: Vec<PairKey>,
    pub standing: usize,
}

#[derive(Clone, Debug, Default)]
pub struct WBlockTracker {
    scored: FxHashSet<PairKey>,
}

impl WBlockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scored(&self) -> impl Iterator<Item = &PairKey> {
        self.scored.iter()
    }

    pub fn scored_count(&self) -> usize {
        self.scored.len()
    }

    /// Re-detect, reflag `is_w_block`, emit +/- W and score deltas for the difference.
    pub fn rescan(&mut self, pieces: &mut [BoardPiece], value: u32, events: &mut EventQueue) -> RescanReport {
        let detected = detect_all(pieces);
        let members: FxHashSet<PieceId> = detected.iter().flat_map(|k| [k.rfb, k.lfb]).collect();
        for piece in pieces.iter_mut() {
            piece.is_w_block = members.contains(&piece.id);
        }

        let current: FxHashSet<PairKey> = detected.iter().copied().collect();
        let mut broken: Vec<PairKey> = self.scored.difference(&current).copied().collect();
        broken.sort_unstable();
        let formed: Vec<PairKey> = detected
            .iter()
            .filter(|k| !self.scored.contains(k))
            .copied()
            .collect();

        for key in &broken {
            debug!(pair = %key, "W-block broken");
            events.push(GameEvent::WBroken { pair: *key });
            events.push(GameEvent::counter(CounterKind::W, -1));
            events.push(GameEvent::score(-(value as i64)));
        }
        for key in &formed {
            debug!(pair = %key, "W-block formed");
            events.push(GameEvent::WFormed { pair: *key });
            events.push(GameEvent::counter(CounterKind::W, 1));
            events.push(GameEvent::score(value as i64));
        }
        self.scored = current;
        RescanReport {
            formed,
            broken,
            standing: detected.len(),
        }
    }

    /// Forget credited pairs without emitting any de-scoring deltas.
    pub fn reset(&mut self) {
        self.scored.clear();
    }
}
