//! cosmetic message sequences shown between phases

use serde::{Deserialize, Serialize};

use crate::config::StageDelays;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Fail,
    FailForward,
    DoIt,
    Continue,
    LevelComplete,
    NiceTurnAround,
    Button,
    TimeUp,
    KeepGoing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sequence {
    /// Phase A ran out of room.
    TransitionAB,
    /// Phase B ended with loose pieces.
    TransitionBA,
    Completion,
    TimeUp,
}

impl Sequence {
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Sequence::TransitionAB => &[Stage::Fail, Stage::FailForward, Stage::DoIt],
            Sequence::TransitionBA => &[Stage::Continue],
            Sequence::Completion => &[Stage::LevelComplete, Stage::NiceTurnAround, Stage::Button],
            Sequence::TimeUp => &[Stage::TimeUp, Stage::KeepGoing],
        }
    }

    /// (offset from sequence start, stage) for every stage after the first.
    pub fn schedule(self, delays: &StageDelays) -> impl Iterator<Item = (u64, Stage)> {
        let offsets = [delays.short_ms, delays.long_ms];
        self.stages()
            .iter()
            .skip(1)
            .zip(offsets)
            .map(|(&stage, at)| (at, stage))
    }

    pub fn first(self) -> Stage {
        self.stages()[0]
    }
}
