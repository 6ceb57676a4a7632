//! Game configuration and presets.
//!
//! Every field has a default, so partial JSON documents are accepted.

use l2w_core::{BlockType, LShape, Shape};
use serde::{Deserialize, Serialize};

use crate::collision::Bounds;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("shape pool is empty")]
    EmptyShapePool,
    #[error("no fall intervals configured")]
    NoFallIntervals,
    #[error("fall interval for level range {index} is zero")]
    ZeroFallInterval { index: usize },
    #[error("part B time limit must be at least one second")]
    ZeroTimeLimit,
}

/// L-block matching rules for Phase A.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    /// 4-cell L, any colors, pieces may poke above row 0.
    Simple,
    /// 5-cell L, uniform color, strict bounds.
    #[default]
    Extended,
}

impl Ruleset {
    pub fn l_shape(self) -> LShape {
        match self {
            Ruleset::Simple => LShape::Compact,
            Ruleset::Extended => LShape::Extended,
        }
    }

    pub fn color_sensitive(self) -> bool {
        matches!(self, Ruleset::Extended)
    }

    pub fn bounds(self) -> Bounds {
        match self {
            Ruleset::Simple => Bounds::OpenTop,
            Ruleset::Extended => Bounds::Strict,
        }
    }
}

/// Which Phase-B termination condition is in force.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRule {
    /// Both counters spent and every board piece part of a W.
    Strict,
    /// Also ends early once the remaining units cannot make progress.
    #[default]
    Permissive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    pub rfb: u32,
    pub lfb: u32,
    pub w_block: u32,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            rfb: 100,
            lfb: 150,
            w_block: 200,
        }
    }
}

impl ScoreTable {
    pub fn l_block(&self, block: BlockType) -> u32 {
        match block {
            BlockType::Rfb => self.rfb,
            BlockType::Lfb => self.lfb,
        }
    }
}

/// Offsets from the start of a cosmetic sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDelays {
    pub short_ms: u64,
    pub long_ms: u64,
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            short_ms: 1000,
            long_ms: 2000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub ruleset: Ruleset,
    pub scores: ScoreTable,
    /// One entry per two-level range; the last entry covers everything above.
    pub fall_intervals_ms: Vec<u64>,
    pub clear_delay_ms: u64,
    pub stage_delays: StageDelays,
    pub input_cooldown_ms: u64,
    /// From this level on, pieces in a W formation are frozen.
    pub w_lock_level: u32,
    pub completion_rule: CompletionRule,
    pub gravity_after_clear: bool,
    pub part_b_time_limit_secs: Option<u32>,
    pub part_b_bonus_secs: u32,
    pub shape_pool: Vec<Shape>,
    pub seed: Option<u64>,
    pub feedback_endpoint: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl GameConfig {
    pub fn standard() -> Self {
        Self {
            ruleset: Ruleset::Extended,
            scores: ScoreTable::default(),
            fall_intervals_ms: vec![1000, 1000, 1000, 1000],
            clear_delay_ms: 400,
            stage_delays: StageDelays::default(),
            input_cooldown_ms: 120,
            w_lock_level: 2,
            completion_rule: CompletionRule::Permissive,
            gravity_after_clear: false,
            part_b_time_limit_secs: Some(120),
            part_b_bonus_secs: 0,
            shape_pool: Shape::STANDARD.to_vec(),
            seed: None,
            feedback_endpoint: None,
        }
    }

    /// Early rules: compact L patterns, color-blind matching.
    pub fn classic() -> Self {
        Self {
            ruleset: Ruleset::Simple,
            ..Self::standard()
        }
    }

    /// No cosmetic delays or input cooldown. For headless drivers.
    pub fn instant() -> Self {
        Self {
            clear_delay_ms: 0,
            stage_delays: StageDelays {
                short_ms: 0,
                long_ms: 0,
            },
            input_cooldown_ms: 0,
            ..Self::standard()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shape_pool.is_empty() {
            return Err(ConfigError::EmptyShapePool);
        }
        if self.fall_intervals_ms.is_empty() {
            return Err(ConfigError::NoFallIntervals);
        }
        if let Some(index) = self.fall_intervals_ms.iter().position(|&ms| ms == 0) {
            return Err(ConfigError::ZeroFallInterval { index });
        }
        if self.part_b_time_limit_secs == Some(0) {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(())
    }

    pub fn fall_interval_ms(&self, level: u32) -> u64 {
        let index = (level.max(1) as usize - 1) / 2;
        self.fall_intervals_ms
            .get(index)
            .or_else(|| self.fall_intervals_ms.last())
            .copied()
            .unwrap_or(1000)
    }

    pub fn part_b_duration_secs(&self) -> Option<u32> {
        self.part_b_time_limit_secs
            .map(|limit| limit.saturating_add(self.part_b_bonus_secs))
    }
}
