//! Phase state machine.
//!
//! `Game` owns both engines, the shared `GameState` and a virtual clock.
//! Engines only push events; `flush` drains them in order, applies score and
//! counter deltas, and reacts to the phase-ending ones. A host drives time
//! with `advance` and reads everything it needs from `snapshot` and
//! `drain_events`.

use l2w_core::{
    BlockType, BoardCell, BoardPiece, Cell, ColorGrid, CounterKind, GameState, Grid, Orientation, Phase, Piece,
    PieceId, PieceRotation,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GameConfig};
use crate::drag::{DragController, DragPreview, DragResult};
use crate::error::{GameError, Rejection};
use crate::events::{EventQueue, GameEvent};
use crate::feedback::FeedbackSubmission;
use crate::input::{gesture_intent, key_intent, Gesture, InputGate, Intent, Key};
use crate::part_a::{FallOutcome, LockOutcome, PartAEngine};
use crate::part_b::{Outcome, PartBEngine, PartBSettings};
use crate::part_b_timer::{Countdown, Tick};
use crate::stages::{Sequence, Stage};
use crate::timers::Scheduler;

const SECOND_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    Fall,
    ResolveClears,
    Stage(Stage),
    PartBSecond,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: Phase,
    pub stage: Option<Stage>,
    pub score: u64,
    pub level: u32,
    pub rfb_count: u32,
    pub lfb_count: u32,
    pub w_count: u32,
    pub orientation: Orientation,
    pub rotation_degrees: u16,
    pub part_a_grid: ColorGrid,
    pub active: Option<Piece>,
    pub next: Option<Piece>,
    pub part_b_grid: Option<Grid<BoardCell>>,
    pub pieces: Vec<BoardPiece>,
    pub drag_preview: Option<DragPreview>,
    pub conflict_cells: Vec<Cell>,
    pub remaining_secs: Option<u32>,
    pub time_display: Option<String>,
}

#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    state: GameState,
    part_a: PartAEngine,
    part_b: Option<PartBEngine>,
    drag: DragController,
    scheduler: Scheduler<Task>,
    stage: Option<Stage>,
    countdown: Option<Countdown>,
    gate: InputGate,
    pending: EventQueue,
    outbox: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            part_a: PartAEngine::new(&config),
            gate: InputGate::new(config.input_cooldown_ms),
            state: GameState::new(),
            part_b: None,
            drag: DragController::new(),
            scheduler: Scheduler::new(),
            stage: None,
            countdown: None,
            pending: EventQueue::new(),
            outbox: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Virtual clock in milliseconds since construction.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn part_a(&self) -> &PartAEngine {
        &self.part_a
    }

    /// Mutable access for staging boards; the clock is not touched.
    pub fn part_a_mut(&mut self) -> &mut PartAEngine {
        &mut self.part_a
    }

    pub fn part_b(&self) -> Option<&PartBEngine> {
        self.part_b.as_ref()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    fn require(&self, phase: Phase) -> Result<(), GameError> {
        let actual = self.state.phase();
        if actual == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase { actual })
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.state.phase();
        if from == to {
            return;
        }
        self.state.set_phase(to);
        info!(?from, ?to, level = self.state.level(), "phase changed");
        self.pending.push(GameEvent::PhaseChanged { from, to });
    }

    // ---- lifecycle ----

    pub fn start(&mut self) -> Result<(), GameError> {
        self.require(Phase::Idle)?;
        info!(level = self.state.level(), seed = ?self.config.seed, "game started");
        self.enter_part_a();
        self.flush();
        Ok(())
    }

    /// Back to a fresh idle game; the piece generator keeps its stream.
    pub fn reset(&mut self) {
        let from = self.state.phase();
        self.scheduler.clear();
        self.part_a.stop();
        self.part_a.set_grid(ColorGrid::new());
        self.part_b = None;
        self.drag = DragController::new();
        self.stage = None;
        self.countdown = None;
        self.gate.release();
        self.pending = EventQueue::new();
        self.state.reset();
        info!(?from, "game reset");
        if from != Phase::Idle {
            self.pending.push(GameEvent::PhaseChanged { from, to: Phase::Idle });
        }
        self.flush();
    }

    /// The "continue" button on a transition screen.
    pub fn continue_game(&mut self) -> Result<(), GameError> {
        match self.state.phase() {
            Phase::TransitionAB => self.enter_part_b(),
            Phase::TransitionBA => self.enter_part_a(),
            actual => return Err(GameError::WrongPhase { actual }),
        }
        self.flush();
        Ok(())
    }

    /// Next level from the completion screen, straight into a fresh Phase B.
    pub fn level_up(&mut self) -> Result<(), GameError> {
        self.require(Phase::Complete)?;
        let level = self.state.advance_level();
        info!(level, "level up");
        self.part_b = None;
        self.enter_part_b();
        self.flush();
        Ok(())
    }

    /// Clear the board and restart the clock after time ran out.
    pub fn keep_going(&mut self) -> Result<(), GameError> {
        self.require(Phase::PartB)?;
        let expired = self.countdown.as_ref().is_some_and(Countdown::is_expired);
        if !expired {
            return Err(GameError::NotTimedOut);
        }
        self.cancel_stages();
        self.stage = None;
        self.drag.cancel();
        self.drag.clear_conflict();
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.reset();
        }
        self.scheduler.schedule(SECOND_MS, Task::PartBSecond);
        if let Some(engine) = self.part_b.as_mut() {
            engine.reset_grid(&mut self.pending);
        }
        info!(level = self.state.level(), "keep going");
        self.flush();
        Ok(())
    }

    pub fn add_bonus_time(&mut self, secs: u32) -> Result<(), GameError> {
        self.require(Phase::PartB)?;
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.add_bonus(secs);
        }
        Ok(())
    }

    /// Freeze the Phase-B board and clock.
    pub fn pause(&mut self) -> Result<(), GameError> {
        self.require(Phase::PartB)?;
        if let Some(engine) = self.part_b.as_mut() {
            engine.pause();
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.pause();
        }
        self.drag.cancel();
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), GameError> {
        self.require(Phase::PartB)?;
        if self.countdown.as_ref().is_some_and(Countdown::is_expired) {
            return Err(GameError::Rejected(Rejection::Paused));
        }
        if let Some(engine) = self.part_b.as_mut() {
            engine.resume();
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.resume();
        }
        Ok(())
    }

    // ---- clock ----

    /// Run every task due within the next `dt_ms`, in due order.
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.scheduler.now().saturating_add(dt_ms);
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
            self.flush();
        }
        self.scheduler.advance_to(until);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Fall => {
                if self.state.phase() != Phase::PartA {
                    return;
                }
                if let FallOutcome::Locked(outcome) = self.part_a.step_fall(&mut self.pending) {
                    self.after_lock(outcome);
                }
                if self.part_a.is_running() {
                    let interval = self.config.fall_interval_ms(self.state.level());
                    self.scheduler.schedule(interval, Task::Fall);
                }
            }
            Task::ResolveClears => {
                if self.state.phase() == Phase::PartA && self.part_a.is_awaiting_clear() {
                    self.part_a.resolve(&mut self.pending);
                }
            }
            Task::Stage(stage) => {
                debug!(?stage, "stage");
                self.stage = Some(stage);
            }
            Task::PartBSecond => {
                if self.state.phase() != Phase::PartB {
                    return;
                }
                let Some(countdown) = self.countdown.as_mut() else {
                    return;
                };
                match countdown.tick() {
                    Tick::Expired => self.pending.push(GameEvent::TimeUp),
                    Tick::Running(_) | Tick::Idle => {
                        self.scheduler.schedule(SECOND_MS, Task::PartBSecond);
                    }
                }
            }
        }
    }

    fn after_lock(&mut self, outcome: LockOutcome) {
        if outcome != LockOutcome::ClearPending {
            return;
        }
        if self.config.clear_delay_ms == 0 {
            self.part_a.resolve(&mut self.pending);
        } else {
            self.scheduler.schedule(self.config.clear_delay_ms, Task::ResolveClears);
        }
    }

    fn cancel_stages(&mut self) {
        self.scheduler.cancel_where(|t| matches!(t, Task::Stage(_)));
    }

    fn begin_sequence(&mut self, sequence: Sequence) {
        self.cancel_stages();
        self.stage = Some(sequence.first());
        for (at, stage) in sequence.schedule(&self.config.stage_delays) {
            if at == 0 {
                self.stage = Some(stage);
            } else {
                self.scheduler.schedule(at, Task::Stage(stage));
            }
        }
    }

    // ---- phase entry and exit ----

    fn enter_part_a(&mut self) {
        self.cancel_stages();
        self.stage = None;
        self.set_phase(Phase::PartA);
        self.part_a.start(self.state.level(), &mut self.pending);
        self.gate.release();
        let interval = self.config.fall_interval_ms(self.state.level());
        self.scheduler.schedule(interval, Task::Fall);
    }

    fn finish_part_a(&mut self) {
        if self.state.phase() != Phase::PartA {
            return;
        }
        self.scheduler
            .cancel_where(|t| matches!(t, Task::Fall | Task::ResolveClears));
        self.part_a.stop();
        self.set_phase(Phase::TransitionAB);
        self.begin_sequence(Sequence::TransitionAB);
    }

    fn enter_part_b(&mut self) {
        self.cancel_stages();
        self.stage = None;
        self.drag = DragController::new();
        self.set_phase(Phase::PartB);

        if let Some(limit) = self.config.part_b_duration_secs() {
            self.countdown = Some(Countdown::new(limit));
            self.scheduler.cancel_where(|t| matches!(t, Task::PartBSecond));
            self.scheduler.schedule(SECOND_MS, Task::PartBSecond);
        } else {
            self.countdown = None;
        }

        let level = self.state.level();
        let (rfb, lfb) = (self.state.rfb_count(), self.state.lfb_count());
        match self.part_b.as_mut() {
            Some(engine) if engine.level() == level => {
                debug!(level, rfb, lfb, "phase B board kept");
                engine.refill(rfb, lfb, &mut self.pending);
            }
            _ => {
                let mut engine = PartBEngine::new(level, rfb, lfb, PartBSettings::from(&self.config));
                engine.check_completion(&mut self.pending);
                self.part_b = Some(engine);
            }
        }
    }

    fn finish_part_b(&mut self, resolved: bool) {
        if self.state.phase() != Phase::PartB {
            return;
        }
        self.scheduler.cancel_where(|t| matches!(t, Task::PartBSecond));
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.pause();
        }
        self.drag.cancel();
        if resolved {
            self.set_phase(Phase::Complete);
            self.begin_sequence(Sequence::Completion);
        } else {
            self.set_phase(Phase::TransitionBA);
            self.begin_sequence(Sequence::TransitionBA);
        }
    }

    fn time_up(&mut self) {
        if self.state.phase() != Phase::PartB {
            return;
        }
        info!(level = self.state.level(), "phase B time up");
        if let Some(engine) = self.part_b.as_mut() {
            engine.pause();
        }
        self.drag.cancel();
        self.begin_sequence(Sequence::TimeUp);
    }

    // ---- event pump ----

    fn flush(&mut self) {
        while let Some(event) = self.pending.pop() {
            match &event {
                GameEvent::Score { delta } => {
                    if let Err(err) = self.state.apply_score_delta(*delta) {
                        warn!(%err, "score change dropped");
                    }
                }
                GameEvent::Counter { kind, delta } => {
                    if let Err(err) = self.state.apply_counter_delta(*kind, *delta) {
                        warn!(%err, "counter change dropped");
                    }
                }
                GameEvent::EdgeFull => self.finish_part_a(),
                GameEvent::PartBEnded { resolved } => self.finish_part_b(*resolved),
                GameEvent::TimeUp => self.time_up(),
                _ => {}
            }
            self.outbox.push(event);
        }
    }

    /// Everything that happened since the last call, in order.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ---- phase A input ----

    /// Debounced key press. Returns whether it changed anything.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if self.state.phase() != Phase::PartA || !self.gate.accept(key, self.scheduler.now()) {
            return false;
        }
        let intent = key_intent(self.part_a.orientation(), key);
        self.apply_intent(intent)
    }

    pub fn handle_gesture(&mut self, gesture: Gesture) -> bool {
        if self.state.phase() != Phase::PartA || !self.gate.accept(gesture, self.scheduler.now()) {
            return false;
        }
        gesture_intent(self.part_a.orientation(), gesture).is_some_and(|intent| self.apply_intent(intent))
    }

    /// Key up or pointer up.
    pub fn release_input(&mut self) {
        self.gate.release();
    }

    /// Run an intent without debouncing.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        if self.state.phase() != Phase::PartA {
            return false;
        }
        let changed = match intent {
            Intent::Move(dir) => self.part_a.move_horizontal(dir),
            Intent::MoveVertical(dir) => self.part_a.move_vertical(dir),
            Intent::Rotate => self.part_a.rotate(),
            Intent::Drop => self.part_a.drop(&mut self.pending).map(|o| self.after_lock(o)).is_some(),
            Intent::DropIn(dir) => self
                .part_a
                .drop_in(dir, &mut self.pending)
                .map(|o| self.after_lock(o))
                .is_some(),
        };
        self.flush();
        changed
    }

    // ---- phase B board ----

    /// Run a board action and pump its events.
    fn with_board<R>(
        &mut self,
        action: impl FnOnce(&mut PartBEngine, &mut EventQueue) -> Result<R, Rejection>,
    ) -> Result<R, GameError> {
        self.require(Phase::PartB)?;
        let actual = self.state.phase();
        let engine = self.part_b.as_mut().ok_or(GameError::WrongPhase { actual })?;
        let result = action(engine, &mut self.pending)?;
        self.flush();
        Ok(result)
    }

    pub fn place_block(&mut self, block: BlockType, anchor: Cell, rotation: PieceRotation) -> Result<Outcome, GameError> {
        self.with_board(|engine, events| engine.place_new(block, anchor, rotation, events))
    }

    pub fn move_block(&mut self, id: PieceId, anchor: Cell) -> Result<Outcome, GameError> {
        self.with_board(|engine, events| engine.move_existing(id, anchor, events))
    }

    pub fn rotate_block(&mut self, id: PieceId) -> Result<Outcome, GameError> {
        self.with_board(|engine, events| engine.rotate_piece(id, events))
    }

    pub fn remove_block(&mut self, id: PieceId) -> Result<BoardPiece, GameError> {
        self.with_board(|engine, events| engine.remove_piece(id, events))
    }

    // ---- phase B drag ----

    pub fn grab_counter(&mut self, block: BlockType) -> Result<(), GameError> {
        self.require(Phase::PartB)?;
        match self.part_b.as_ref() {
            Some(engine) => Ok(self.drag.grab_counter(engine, block)?),
            None => Err(GameError::WrongPhase { actual: self.state.phase() }),
        }
    }

    pub fn grab_board(&mut self, cell: Cell) -> Result<PieceId, GameError> {
        self.require(Phase::PartB)?;
        match self.part_b.as_ref() {
            Some(engine) => Ok(self.drag.grab_board(engine, cell)?),
            None => Err(GameError::WrongPhase { actual: self.state.phase() }),
        }
    }

    pub fn drag_to(&mut self, cell: Cell) -> Option<DragPreview> {
        if self.state.phase() != Phase::PartB {
            return None;
        }
        let engine = self.part_b.as_ref()?;
        self.drag.move_to(engine, cell).cloned()
    }

    pub fn release(&mut self, target: Option<Cell>) -> Result<DragResult, GameError> {
        self.require(Phase::PartB)?;
        let result = match self.part_b.as_mut() {
            Some(engine) => self.drag.release(engine, target, &mut self.pending)?,
            None => return Err(GameError::WrongPhase { actual: self.state.phase() }),
        };
        self.flush();
        Ok(result)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    // ---- read side ----

    pub fn counter(&self, kind: CounterKind) -> u32 {
        self.state.counter(kind)
    }

    /// A feedback answer stamped with the current level.
    pub fn feedback(&self, question_id: &str, question: &str, answer: &str) -> FeedbackSubmission {
        FeedbackSubmission {
            question_id: question_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            level: self.state.level(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let orientation = Orientation::for_level(self.state.level());
        Snapshot {
            phase: self.state.phase(),
            stage: self.stage,
            score: self.state.score(),
            level: self.state.level(),
            rfb_count: self.state.rfb_count(),
            lfb_count: self.state.lfb_count(),
            w_count: self.state.w_count(),
            orientation,
            rotation_degrees: orientation.degrees(),
            part_a_grid: self.part_a.grid().clone(),
            active: self.part_a.active().cloned(),
            next: self.part_a.next().cloned(),
            part_b_grid: self.part_b.as_ref().map(PartBEngine::build_grid),
            pieces: self.part_b.as_ref().map(|e| e.pieces().to_vec()).unwrap_or_default(),
            drag_preview: self.drag.preview().cloned(),
            conflict_cells: self.drag.conflict_cells().to_vec(),
            remaining_secs: self.countdown.as_ref().map(Countdown::remaining),
            time_display: self.countdown.as_ref().map(Countdown::formatted),
        }
    }
}
