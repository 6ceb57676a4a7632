//! Shared game state. Score and counters change only through delta application.

use serde::{Deserialize, Serialize};

use crate::block::BlockType;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    PartA,
    TransitionAB,
    PartB,
    TransitionBA,
    Complete,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    Rfb,
    Lfb,
    W,
}

impl From<BlockType> for CounterKind {
    fn from(block: BlockType) -> Self {
        match block {
            BlockType::Rfb => CounterKind::Rfb,
            BlockType::Lfb => CounterKind::Lfb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("{kind:?} counter would drop below zero ({current} {delta:+})")]
    CounterUnderflow {
        kind: CounterKind,
        current: u32,
        delta: i64,
    },
    #[error("score would drop below zero ({current} {delta:+})")]
    ScoreUnderflow { current: u64, delta: i64 },
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GameState {
    phase: Phase,
    score: u64,
    level: u32,
    rfb_count: u32,
    lfb_count: u32,
    w_count: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            level: 1,
            rfb_count: 0,
            lfb_count: 0,
            w_count: 0,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.max(1),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rfb_count(&self) -> u32 {
        self.rfb_count
    }

    pub fn lfb_count(&self) -> u32 {
        self.lfb_count
    }

    pub fn w_count(&self) -> u32 {
        self.w_count
    }

    pub fn counter(&self, kind: CounterKind) -> u32 {
        match kind {
            CounterKind::Rfb => self.rfb_count,
            CounterKind::Lfb => self.lfb_count,
            CounterKind::W => self.w_count,
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn advance_level(&mut self) -> u32 {
        self.level = self.level.saturating_add(1);
        self.level
    }

    /// Applies a signed score change. On underflow the score is untouched.
    pub fn apply_score_delta(&mut self, delta: i64) -> Result<u64, StateError> {
        let next = (self.score as i64)
            .checked_add(delta)
            .filter(|v| *v >= 0)
            .ok_or(StateError::ScoreUnderflow {
                current: self.score,
                delta,
            })?;
        self.score = next as u64;
        Ok(self.score)
    }

    /// Applies a signed counter change. On underflow the counter is untouched.
    pub fn apply_counter_delta(&mut self, kind: CounterKind, delta: i64) -> Result<u32, StateError> {
        let slot = match kind {
            CounterKind::Rfb => &mut self.rfb_count,
            CounterKind::Lfb => &mut self.lfb_count,
            CounterKind::W => &mut self.w_count,
        };
        let current = *slot;
        let next = (current as i64) + delta;
        if next < 0 || next > u32::MAX as i64 {
            return Err(StateError::CounterUnderflow { kind, current, delta });
        }
        *slot = next as u32;
        Ok(*slot)
    }

    /// Back to a fresh idle game at level 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
