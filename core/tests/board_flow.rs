use puzzleboard_core::alignment::compute_global_offset;
use puzzleboard_core::store::{read_best, record_best};
use puzzleboard_core::{
    AlignmentRules, BoardRect, CanvasSize, Difficulty, GlobalOffset, GridShape, KeyValueStore, MemoryStore,
    PointerId, PointerInput, PointerPhase, PuzzleCatalog, PuzzleController, PuzzleEvent, PuzzleSession,
};

fn shifted_two_by_two(dx: f32, dy: f32) -> PuzzleSession {
    let mut session = PuzzleSession::new(CanvasSize::new(200, 200), GridShape::new(2, 2));
    let homes: Vec<_> = session
        .pieces()
        .iter()
        .map(|p| (p.id(), p.correct_x(), p.correct_y()))
        .collect();
    for (id, x, y) in homes {
        assert!(session.move_piece(id, x + dx, y + dy));
    }
    session
}

fn pointer(phase: PointerPhase, id: i32, x: f32, y: f32) -> PointerInput {
    PointerInput {
        phase,
        pointer_id: PointerId(id),
        client_x: x,
        client_y: y,
    }
}

#[test]
fn shifted_two_by_two_completes_and_snaps_home() {
    let mut session = shifted_two_by_two(30.0, 5.0);
    assert_eq!(session.piece_width(), 100.0);
    assert_eq!(session.piece_height(), 100.0);
    assert_eq!(
        compute_global_offset(session.pieces()),
        GlobalOffset { off_x: 30.0, off_y: 5.0 }
    );
    assert!(session.is_solved(10.0));
    assert!(session.try_complete(10.0, 0.0));
    let placed: Vec<_> = (0..4)
        .filter_map(|id| session.piece(id))
        .map(|p| (p.position(), p.locked()))
        .collect();
    assert_eq!(
        placed,
        vec![
            ((0.0, 0.0), true),
            ((100.0, 0.0), true),
            ((0.0, 100.0), true),
            ((100.0, 100.0), true),
        ]
    );
}

#[test]
fn dragging_every_piece_into_place_completes_once_and_records_best() {
    let mut controller = PuzzleController::new(MemoryStore::new(), PuzzleCatalog::default(), AlignmentRules::default());
    controller.install_puzzle(CanvasSize::new(800, 600), 11);
    // Displayed at half the backing size.
    let rect = BoardRect {
        left: 100.0,
        top: 50.0,
        width: 400.0,
        height: 300.0,
    };
    let client = |x: f32, y: f32| (rect.left + x / 2.0, rect.top + y / 2.0);

    // Assemble the picture well to the right of the scatter area so placed
    // pieces never cover the ones still waiting.
    let shift = (1_000.0, 40.0);
    let mut completions = Vec::new();
    let mut clock = 1_000.0;
    while !controller.is_completed() {
        let session = controller.session().expect("session");
        let piece = *session
            .pieces()
            .iter()
            .rev()
            .find(|p| p.x() < 900.0)
            .expect("an unplaced piece remains");
        let (gx, gy) = client(piece.x() + 1.0, piece.y() + 1.0);
        let (tx, ty) = client(piece.correct_x() + shift.0 + 1.0, piece.correct_y() + shift.1 + 1.0);
        for event in [
            pointer(PointerPhase::Down, 1, gx, gy),
            pointer(PointerPhase::Move, 1, tx, ty),
            pointer(PointerPhase::Up, 1, tx, ty),
        ] {
            clock += 250.0;
            for produced in controller.handle_pointer(event, rect, clock) {
                if let PuzzleEvent::Completed(report) = produced {
                    completions.push(report);
                }
            }
        }
        assert!(clock < 100_000.0, "board never completed");
    }

    assert_eq!(completions.len(), 1);
    let report = &completions[0];
    assert!(report.new_best);
    assert!(!report.forced);
    assert_eq!(report.best_ms, controller.best_time());
    assert_eq!(controller.progress(), 100);
    let session = controller.session().expect("session");
    assert!(session
        .pieces()
        .iter()
        .all(|p| p.locked() && p.position() == (p.correct_x(), p.correct_y())));

    // Residual input after completion changes nothing.
    let (gx, gy) = client(1.0, 1.0);
    let events = controller.handle_pointer(pointer(PointerPhase::Down, 3, gx, gy), rect, clock + 10.0);
    assert!(events.iter().all(|e| !matches!(e, PuzzleEvent::Completed(_))));
    assert_eq!(controller.drag().active_piece(), None);
}

#[test]
fn best_time_is_scoped_and_monotonic() {
    let mut store = MemoryStore::new();
    assert!(record_best(&mut store, "villa", Difficulty::Medium, 90_000.0).expect("write"));
    assert!(!record_best(&mut store, "villa", Difficulty::Medium, 95_000.0).expect("write"));
    assert!(record_best(&mut store, "villa", Difficulty::Hard, 120_000.0).expect("write"));
    assert_eq!(read_best(&store, "villa", Difficulty::Medium), Some(90_000.0));
    assert_eq!(store.get("best:villa:hard").as_deref(), Some("120000"));
}

#[test]
fn catalog_navigation_drops_round_until_reinstalled() {
    let catalog = PuzzleCatalog::from_json(
        r#"{"puzzles":[{"id":"a","title":"A","imageUrl":"https://img.test/a.jpg"},{"id":"b","title":"B","imageUrl":"https://img.test/b.jpg"}]}"#,
    )
    .expect("catalog");
    let mut controller = PuzzleController::new(MemoryStore::new(), catalog, AlignmentRules::default());
    controller.install_puzzle(CanvasSize::new(400, 300), 1);
    assert!(controller.is_ready());
    assert_eq!(controller.next_puzzle().id, "b");
    assert!(!controller.is_ready());
    assert_eq!(
        controller.current_image_url(),
        "https://img.test/b.jpg?w=1200&q=70&auto=format&fit=crop"
    );
    assert_eq!(controller.previous_puzzle().id, "a");
    assert_eq!(controller.previous_puzzle().id, "b");
}
