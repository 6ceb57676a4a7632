use l2w_core::{
    rotation_for_level, BlockType, BoardPiece, Cell, Color, ColorGrid, CounterKind, Direction, Edge, GameState, Phase,
    Piece, PieceId, PieceRotation, Shape, GRID_SIZE,
};
use l2w_engine::{
    clear_loop, collision, detect_all, DragResult, EventQueue, FallOutcome, Game, GameConfig, GameError, GameEvent,
    Intent, LDetector, LockOutcome, Outcome, PartAEngine, PartBEngine, PartBSettings, Rejection, Ruleset, ScoreTable,
    Stage,
};

fn config() -> GameConfig {
    let mut config = GameConfig::instant().with_seed(5);
    config.shape_pool = vec![Shape::O];
    config
}

fn started() -> Game {
    let mut game = Game::new(config()).unwrap();
    game.start().unwrap();
    game
}

/// Stage four cells of an L next to an empty slot, then drop an O into it.
fn earn(game: &mut Game, block: BlockType) {
    let color = Color::new(0).unwrap();
    let (preset, x): (&[(usize, usize)], i32) = match block {
        BlockType::Rfb => (&[(11, 0), (12, 0), (13, 0), (13, 1)], 2),
        BlockType::Lfb => (&[(11, 2), (12, 2), (13, 2)], 0),
    };
    let mut grid = ColorGrid::new();
    for &(r, c) in preset {
        grid.set(r, c, color.cell_value());
    }
    let before = game.state().counter(block.into());
    game.part_a_mut().set_grid(grid);
    assert!(game.part_a_mut().set_active(Piece::new(Shape::O, color, x, 0)));
    assert!(game.apply_intent(Intent::Drop));
    assert_eq!(game.state().counter(block.into()), before + 1);
}

/// Stack pieces in the middle until the spawn edge fills.
fn finish_phase_a(game: &mut Game) {
    for _ in 0..64 {
        if game.phase() != Phase::PartA {
            break;
        }
        game.apply_intent(Intent::Drop);
    }
    assert_eq!(game.phase(), Phase::TransitionAB);
}

fn phase_changes(events: &[GameEvent]) -> Vec<(Phase, Phase)> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

/// Mirror of what `Game` does with delta events.
fn apply(state: &mut GameState, events: &mut EventQueue) {
    for event in events.drain() {
        match event {
            GameEvent::Score { delta } => {
                state.apply_score_delta(delta).unwrap();
            }
            GameEvent::Counter { kind, delta } => {
                state.apply_counter_delta(kind, delta).unwrap();
            }
            _ => {}
        }
    }
}

mod phase_a {
    use super::*;

    #[test]
    fn test_l_clear_feeds_counters_and_score() {
        let mut game = started();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        assert_eq!(game.state().rfb_count(), 1);
        assert_eq!(game.state().lfb_count(), 1);
        assert_eq!(game.state().score(), 250);
        // play continues with the promoted piece
        assert!(game.part_a().active().is_some());
    }

    #[test]
    fn test_compact_rfb_scenario() {
        // rows 0-2 of column 0 plus row 2 column 1, one color
        let mut grid = ColorGrid::new();
        for (r, c) in [(0, 0), (1, 0), (2, 0), (2, 1)] {
            grid.set(r, c, 4);
        }
        let report = clear_loop(&LDetector::for_ruleset(Ruleset::Simple), &grid, None);
        assert_eq!(report.clears.len(), 1);
        assert_eq!(report.clears[0].block, BlockType::Rfb);
        assert_eq!(report.clears[0].cells.len(), 4);
        assert!(report.grid.is_empty());
        assert_eq!(report.score(&ScoreTable::default()), 100);
    }

    #[test]
    fn test_lfb_clears_before_rfb() {
        let mut grid = ColorGrid::new();
        for (r, c) in [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)] {
            grid.set(r, c, 1);
        }
        for (r, c) in [(8, 12), (9, 12), (10, 10), (10, 11), (10, 12)] {
            grid.set(r, c, 2);
        }
        let report = clear_loop(&LDetector::for_ruleset(Ruleset::Extended), &grid, None);
        let order: Vec<_> = report.clears.iter().map(|m| m.block).collect();
        assert_eq!(order, vec![BlockType::Lfb, BlockType::Rfb]);
    }

    #[test]
    fn test_edge_full_per_orientation() {
        let cases = [
            (Direction::Down, Cell::new(0, 7)),
            (Direction::Left, Cell::new(7, 13)),
            (Direction::Right, Cell::new(7, 0)),
            (Direction::Up, Cell::new(13, 7)),
        ];
        for (fall, edge_cell) in cases {
            let mut grid = ColorGrid::new();
            assert!(!collision::is_edge_full(&grid, fall));
            grid.put(Cell::new(7, 7), 1);
            assert!(!collision::is_edge_full(&grid, fall), "{fall:?}");
            grid.put(edge_cell, 1);
            assert!(collision::is_edge_full(&grid, fall), "{fall:?}");
        }
    }

    #[test]
    fn test_level_rotation_is_stable() {
        let first = rotation_for_level(9);
        for _ in 0..50 {
            assert_eq!(rotation_for_level(9), first);
        }
        assert_eq!(rotation_for_level(1), 0);
        assert_eq!(rotation_for_level(3), 90);
    }

    #[test]
    fn test_inputs_ignored_outside_phase_a() {
        let mut game = Game::new(config()).unwrap();
        assert!(!game.apply_intent(Intent::Rotate));
        assert!(game.drain_events().is_empty());
    }

    /// First level of each orientation band.
    const ORIENTATION_LEVELS: [u32; 4] = [1, 3, 5, 7];

    fn part_a_engine(ruleset: Ruleset, level: u32) -> (PartAEngine, EventQueue) {
        let mut config = config();
        config.ruleset = ruleset;
        let mut events = EventQueue::new();
        let mut engine = PartAEngine::new(&config);
        engine.start(level, &mut events);
        (engine, events)
    }

    #[test]
    fn test_auto_fall_locks_in_every_orientation() {
        for ruleset in [Ruleset::Simple, Ruleset::Extended] {
            for level in ORIENTATION_LEVELS {
                let (mut engine, mut events) = part_a_engine(ruleset, level);
                let mut ticks = 0;
                let outcome = loop {
                    match engine.step_fall(&mut events) {
                        FallOutcome::Moved => ticks += 1,
                        other => break other,
                    }
                    assert!(ticks <= GRID_SIZE, "{ruleset:?} level {level} never locked");
                };
                assert_eq!(outcome, FallOutcome::Locked(LockOutcome::Resolved), "{ruleset:?} level {level}");
                assert_eq!(ticks, GRID_SIZE - 2, "{ruleset:?} level {level}");
                assert_eq!(engine.grid().occupied_count(), 4, "{ruleset:?} level {level}");
            }
        }
    }

    #[test]
    fn test_drop_ends_phase_at_spawn_edge_in_every_orientation() {
        let last = GRID_SIZE - 1;
        for ruleset in [Ruleset::Simple, Ruleset::Extended] {
            for level in ORIENTATION_LEVELS {
                let (mut engine, mut events) = part_a_engine(ruleset, level);
                // one stray cell on the spawn edge, clear of the falling piece
                let (row, col) = match engine.orientation().spawn_edge() {
                    Edge::Top | Edge::Left => (0, 0),
                    Edge::Bottom => (last, 0),
                    Edge::Right => (0, last),
                };
                let mut grid = ColorGrid::new();
                grid.set(row, col, 3);
                engine.set_grid(grid);
                events.drain().for_each(drop);

                assert_eq!(engine.drop(&mut events), Some(LockOutcome::Resolved), "{ruleset:?} level {level}");
                assert_eq!(engine.grid().occupied_count(), 5, "{ruleset:?} level {level}");
                assert!(!engine.is_running(), "{ruleset:?} level {level}");
                assert!(events.iter().any(|e| *e == GameEvent::EdgeFull), "{ruleset:?} level {level}");
            }
        }
    }
}

mod phase_b {
    use super::*;

    fn engine(rfb: u32, lfb: u32) -> PartBEngine {
        PartBEngine::new(1, rfb, lfb, PartBSettings::from(&GameConfig::standard()))
    }

    fn committed(outcome: Outcome) -> PieceId {
        match outcome {
            Outcome::Committed { piece } => piece,
            Outcome::Conflict(c) => panic!("unexpected conflict {c:?}"),
        }
    }

    #[test]
    fn test_reference_pair_is_detected() {
        let pieces = vec![
            BoardPiece::new(PieceId(1), BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0),
            BoardPiece::new(PieceId(2), BlockType::Lfb, Cell::new(0, 2), PieceRotation::R0),
        ];
        let pairs = detect_all(&pieces);
        assert_eq!(pairs.len(), 1);

        let mut events = EventQueue::new();
        let mut b = engine(1, 1);
        b.place_new(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0, &mut events)
            .unwrap();
        b.place_new(BlockType::Lfb, Cell::new(0, 2), PieceRotation::R0, &mut events)
            .unwrap();
        assert!(b.pieces().iter().all(|p| p.is_w_block));
    }

    #[test]
    fn test_w_scoring_is_symmetric() {
        let mut state = GameState::new();
        state.apply_counter_delta(CounterKind::Rfb, 2).unwrap();
        state.apply_counter_delta(CounterKind::Lfb, 2).unwrap();
        let mut events = EventQueue::new();
        let mut b = engine(2, 2);

        b.place_new(BlockType::Rfb, Cell::new(4, 4), PieceRotation::R0, &mut events)
            .unwrap();
        let lfb = committed(
            b.place_new(BlockType::Lfb, Cell::new(4, 6), PieceRotation::R0, &mut events)
                .unwrap(),
        );
        apply(&mut state, &mut events);
        assert_eq!(state.w_count(), 1);
        assert_eq!(state.score(), 200);

        committed(b.move_existing(lfb, Cell::new(10, 10), &mut events).unwrap());
        apply(&mut state, &mut events);
        assert_eq!(state.w_count(), 0);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let mut state = GameState::new();
        let mut events = EventQueue::new();
        let mut b = engine(2, 2);
        b.place_new(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0, &mut events)
            .unwrap();
        b.place_new(BlockType::Lfb, Cell::new(0, 2), PieceRotation::R0, &mut events)
            .unwrap();
        state.apply_counter_delta(CounterKind::Rfb, 2).unwrap();
        state.apply_counter_delta(CounterKind::Lfb, 2).unwrap();
        apply(&mut state, &mut events);
        let (score, w) = (state.score(), state.w_count());
        for _ in 0..3 {
            b.rescan(&mut events);
        }
        assert!(events.is_empty());
        assert_eq!((state.score(), state.w_count()), (score, w));
    }

    #[test]
    fn test_removal_returns_exactly_one_unit() {
        let mut events = EventQueue::new();
        let mut b = engine(1, 2);
        let id = committed(
            b.place_new(BlockType::Lfb, Cell::new(5, 5), PieceRotation::R90, &mut events)
                .unwrap(),
        );
        assert_eq!(b.available(BlockType::Lfb), 1);
        b.remove_piece(id, &mut events).unwrap();
        assert_eq!(b.available(BlockType::Lfb), 2);
        assert_eq!(b.remove_piece(id, &mut events), Err(Rejection::UnknownPiece(id)));
    }
}

mod flow {
    use super::*;

    #[test]
    fn test_full_round_to_completion() {
        let mut game = started();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        finish_phase_a(&mut game);

        game.continue_game().unwrap();
        assert_eq!(game.phase(), Phase::PartB);
        game.place_block(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0)
            .unwrap();
        assert_eq!(game.phase(), Phase::PartB);
        game.place_block(BlockType::Lfb, Cell::new(0, 2), PieceRotation::R0)
            .unwrap();

        assert_eq!(game.phase(), Phase::Complete);
        assert_eq!(game.stage(), Some(Stage::Button));
        assert_eq!(game.state().w_count(), 1);
        assert_eq!(game.state().score(), 450);
        assert_eq!((game.state().rfb_count(), game.state().lfb_count()), (0, 0));

        let events = game.drain_events();
        assert_eq!(
            phase_changes(&events),
            vec![
                (Phase::Idle, Phase::PartA),
                (Phase::PartA, Phase::TransitionAB),
                (Phase::TransitionAB, Phase::PartB),
                (Phase::PartB, Phase::Complete),
            ]
        );
        let ended: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PartBEnded { .. }))
            .collect();
        assert_eq!(ended, vec![&GameEvent::PartBEnded { resolved: true }]);
    }

    #[test]
    fn test_level_up_with_nothing_left_routes_to_phase_a() {
        let mut game = started();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        finish_phase_a(&mut game);
        game.continue_game().unwrap();
        game.place_block(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0)
            .unwrap();
        game.place_block(BlockType::Lfb, Cell::new(0, 2), PieceRotation::R0)
            .unwrap();
        assert_eq!(game.phase(), Phase::Complete);

        game.level_up().unwrap();
        assert_eq!(game.state().level(), 2);
        assert_eq!(game.phase(), Phase::TransitionBA);
        assert!(game.part_b().unwrap().pieces().is_empty());

        game.continue_game().unwrap();
        assert_eq!(game.phase(), Phase::PartA);
        assert_eq!(game.part_a().level(), 2);
    }

    #[test]
    fn test_board_refilled_on_return() {
        let mut game = started();
        finish_phase_a(&mut game);
        game.continue_game().unwrap();
        assert_eq!(game.phase(), Phase::TransitionBA);

        game.continue_game().unwrap();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        finish_phase_a(&mut game);
        game.continue_game().unwrap();
        assert_eq!(game.phase(), Phase::PartB);
        let board = game.part_b().unwrap();
        assert_eq!(board.level(), 1);
        assert_eq!(board.available(BlockType::Rfb), 1);
        assert_eq!(board.available(BlockType::Lfb), 1);
    }

    #[test]
    fn test_drag_and_drop_round() {
        let mut game = started();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        finish_phase_a(&mut game);
        game.continue_game().unwrap();

        game.grab_counter(BlockType::Rfb).unwrap();
        let preview = game.drag_to(Cell::new(1, 1)).unwrap();
        assert_eq!(preview.anchor, Cell::new(0, 0));
        assert!(preview.valid);
        assert!(matches!(game.release(Some(Cell::new(1, 1))), Ok(DragResult::Placed(_))));
        assert_eq!(game.state().rfb_count(), 0);

        // overlapping drop is refused and reported
        game.grab_counter(BlockType::Lfb).unwrap();
        let result = game.release(Some(Cell::new(1, 1))).unwrap();
        assert!(matches!(result, DragResult::Conflict(_)));
        assert!(!game.snapshot().conflict_cells.is_empty());
        assert_eq!(game.state().lfb_count(), 1);

        game.grab_counter(BlockType::Lfb).unwrap();
        assert!(matches!(game.release(Some(Cell::new(1, 3))), Ok(DragResult::Placed(_))));
        assert_eq!(game.phase(), Phase::Complete);
        assert!(game.snapshot().conflict_cells.is_empty());
    }

    #[test]
    fn test_time_up_and_keep_going() {
        let mut game = started();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        finish_phase_a(&mut game);
        game.continue_game().unwrap();
        assert_eq!(game.snapshot().time_display.as_deref(), Some("2:00"));

        game.advance(119_000);
        assert_eq!(game.snapshot().remaining_secs, Some(1));
        assert_eq!(game.keep_going(), Err(GameError::NotTimedOut));
        game.advance(1_000);
        assert_eq!(game.stage(), Some(Stage::KeepGoing));
        assert!(game.drain_events().contains(&GameEvent::TimeUp));
        assert_eq!(
            game.place_block(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0),
            Err(GameError::Rejected(Rejection::Paused))
        );

        game.keep_going().unwrap();
        assert_eq!(game.phase(), Phase::PartB);
        assert_eq!(game.stage(), None);
        assert_eq!(game.snapshot().remaining_secs, Some(120));
        assert!(game
            .place_block(BlockType::Rfb, Cell::new(0, 0), PieceRotation::R0)
            .unwrap()
            .is_committed());
    }

    #[test]
    fn test_pause_blocks_board_and_clock() {
        let mut game = started();
        earn(&mut game, BlockType::Rfb);
        earn(&mut game, BlockType::Lfb);
        finish_phase_a(&mut game);
        game.continue_game().unwrap();

        game.pause().unwrap();
        game.advance(10_000);
        assert_eq!(game.snapshot().remaining_secs, Some(120));
        assert!(game.grab_counter(BlockType::Rfb).is_err());
        game.resume().unwrap();
        game.add_bonus_time(30).unwrap();
        game.advance(1_000);
        assert_eq!(game.snapshot().remaining_secs, Some(149));
    }
}
