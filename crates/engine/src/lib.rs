//! l2w-engine - rules engine for the two-phase L2W puzzle.
//!
//! Phase A drops pieces and clears L-blocks; Phase B assembles the earned
//! units into W-blocks. `Game` ties both together on a virtual clock.

pub mod collision;
pub mod completion;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod feedback;
pub mod game;
pub mod generator;
pub mod input;
pub mod lblock;
pub mod part_a;
pub mod part_b;
pub mod part_b_timer;
pub mod stages;
pub mod timers;
pub mod validation;
pub mod wblock;

pub use collision::{can_place, collides, drop_distance, is_edge_full, place, Bounds};
pub use completion::{evaluate as evaluate_completion, BoardSummary};
pub use config::{CompletionRule, ConfigError, GameConfig, Ruleset, ScoreTable, StageDelays};
pub use drag::{ConflictState, DragController, DragPreview, DragResult, DragSource};
pub use error::{GameError, Rejection};
pub use events::{EventQueue, GameEvent};
pub use feedback::{FeedbackClient, FeedbackError, FeedbackSubmission, FeedbackTransport};
pub use game::{Game, Snapshot};
pub use generator::PieceGenerator;
pub use input::{gesture_intent, key_intent, Gesture, Input, InputGate, Intent, Key};
pub use lblock::{clear_loop, ClearReport, LDetector, LMatch};
pub use part_a::{FallOutcome, LockOutcome, PartAEngine};
pub use part_b::{Outcome, PartBEngine, PartBSettings};
pub use part_b_timer::{Countdown, Tick};
pub use stages::{Sequence, Stage};
pub use timers::{Scheduler, TaskId};
pub use validation::Conflict;
pub use wblock::{detect_all, PairKey, RescanReport, WBlockTracker};

pub use l2w_core as core;
