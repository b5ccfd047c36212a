use super::*;

use std::collections::BTreeSet;

use puzzleboard_core::{
    BoardRect, CompletionReport, KeyValueStore, PointerId, PointerInput, PointerPhase, PuzzleEvent,
};

const BOT_POINTER: PointerId = PointerId(1);

#[derive(Args)]
pub(super) struct BotArgs {
    /// Where the assembled picture ends up, relative to its home position.
    #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
    offset_x: f32,
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    offset_y: f32,
    /// Simulated solve time, spread evenly over the bot's pointer events.
    #[arg(long, default_value_t = 90_000.0)]
    elapsed_ms: f64,
}

#[derive(Debug)]
pub(super) struct BotSummary {
    pub(super) drags: usize,
    pub(super) completion: Option<CompletionReport>,
}

/// Pointer driver with a virtual clock that spreads `total_ms` evenly over
/// `total_events` pointer events, the first one at zero.
struct BotHand {
    rect: BoardRect,
    total_ms: f64,
    total_events: usize,
    sent: usize,
    drags: usize,
    completion: Option<CompletionReport>,
}

impl BotHand {
    fn drag<S: KeyValueStore>(
        &mut self,
        controller: &mut PuzzleController<S>,
        from: (f32, f32),
        to: (f32, f32),
    ) -> Vec<PuzzleEvent> {
        let mut events = Vec::new();
        for (phase, (x, y)) in [(PointerPhase::Down, from), (PointerPhase::Move, to), (PointerPhase::Up, to)] {
            let input = PointerInput {
                phase,
                pointer_id: BOT_POINTER,
                client_x: self.rect.left + x,
                client_y: self.rect.top + y,
            };
            events.extend(controller.handle_pointer(input, self.rect, self.clock_ms()));
            self.sent += 1;
        }
        self.drags += 1;
        for event in &events {
            if let PuzzleEvent::Completed(report) = event {
                self.completion = Some(report.clone());
            }
        }
        events
    }

    fn clock_ms(&self) -> f64 {
        let last = self.total_events.saturating_sub(1).max(1);
        self.total_ms * self.sent.min(last) as f64 / last as f64
    }
}

/// Solves the installed board by hand.
///
/// Pieces overlap freely, so the bot first lifts every piece off the board
/// onto a staging row to the right (topmost first, so each grab lands on the
/// intended piece), then drops each one at `home + offset`.
pub(super) fn solve<S: KeyValueStore>(
    controller: &mut PuzzleController<S>,
    args: &BotArgs,
) -> Result<BotSummary, Box<dyn std::error::Error>> {
    let Some(session) = controller.session() else {
        return Err(err_msg("no puzzle installed".to_string()));
    };
    let canvas = controller.canvas();
    let grid = session.grid();
    let count = session.piece_count();
    let (piece_w, piece_h) = (session.piece_width(), session.piece_height());
    let gap = controller.rules().snap_tolerance_px * 2.0 + 4.0;
    let stage_x0 = canvas.width as f32 + args.offset_x.max(0.0) + gap;
    let slot = |id: usize| {
        let col = (id % grid.cols as usize) as f32;
        let row = (id / grid.cols as usize) as f32;
        (stage_x0 + col * (piece_w + gap), row * (piece_h + gap))
    };

    let mut hand = BotHand {
        rect: BoardRect::identity(canvas),
        total_ms: args.elapsed_ms.max(0.0),
        total_events: count * 6,
        sent: 0,
        drags: 0,
        completion: None,
    };

    let mut staged = BTreeSet::new();
    while staged.len() < count {
        let Some(piece) = controller
            .session()
            .and_then(|s| s.pieces().iter().rev().find(|p| !staged.contains(&p.id())).copied())
        else {
            break;
        };
        let grab = (piece.x() + piece_w / 2.0, piece.y() + piece_h / 2.0);
        let (sx, sy) = slot(piece.id());
        hand.drag(controller, grab, (sx + piece_w / 2.0, sy + piece_h / 2.0));
        staged.insert(piece.id());
    }
    tracing::debug!(count, "pieces staged");

    for id in 0..count {
        let Some(piece) = controller.session().and_then(|s| s.piece(id)).copied() else {
            continue;
        };
        let grab = (piece.x() + piece_w / 2.0, piece.y() + piece_h / 2.0);
        let target = (
            piece.correct_x() + args.offset_x + piece_w / 2.0,
            piece.correct_y() + args.offset_y + piece_h / 2.0,
        );
        for event in hand.drag(controller, grab, target) {
            if let PuzzleEvent::Progress(percent) = event {
                println!("placed {}/{count} progress {percent}%", id + 1);
            }
        }
        if let Some(stats) = controller.stats() {
            println!(
                "  aligned {}/{} at home {} offset ({}, {})",
                stats.aligned, stats.total, stats.at_home, stats.offset.off_x, stats.offset.off_y
            );
        }
        if hand.completion.is_some() {
            break;
        }
    }

    Ok(BotSummary {
        drags: hand.drags,
        completion: hand.completion,
    })
}

pub(super) fn run<S: KeyValueStore>(
    controller: &mut PuzzleController<S>,
    args: &BotArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = solve(controller, args)?;
    let Some(report) = summary.completion else {
        return Err(err_msg(format!(
            "solver made {} drags without completing the board",
            summary.drags
        )));
    };
    let outcome = if report.new_best { "new best" } else { "best unchanged" };
    println!(
        "completed in {} after {} drags ({outcome}); {}",
        format_clock(report.elapsed_ms),
        summary.drags,
        format_best(report.best_ms)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleboard_core::MemoryStore;

    fn controller(difficulty: Difficulty, seed: u32) -> PuzzleController<MemoryStore> {
        let mut controller =
            PuzzleController::new(MemoryStore::new(), PuzzleCatalog::default(), AlignmentRules::default());
        controller.select_difficulty(difficulty, 0);
        controller.install_puzzle(CanvasSize::new(800, 600), seed);
        controller
    }

    fn args(offset_x: f32, offset_y: f32) -> BotArgs {
        BotArgs {
            offset_x,
            offset_y,
            elapsed_ms: 61_000.0,
        }
    }

    #[test]
    fn bot_solves_every_preset() {
        for (difficulty, seed) in [(Difficulty::Easy, 1), (Difficulty::Medium, 0xBEEF), (Difficulty::Hard, 99)] {
            let mut controller = controller(difficulty, seed);
            let summary = solve(&mut controller, &args(30.0, 5.0)).expect("solve");
            let report = summary.completion.expect("completed");
            let count = difficulty.grid().piece_count();
            assert_eq!(summary.drags, count * 2, "{difficulty}");
            assert!(report.new_best);
            assert!((report.elapsed_ms - 61_000.0).abs() < 1.0, "{}", report.elapsed_ms);
            assert!(controller.is_completed());
        }
    }

    #[test]
    fn stats_follow_the_assembly() {
        let mut controller = controller(Difficulty::Easy, 1);
        solve(&mut controller, &args(30.0, 5.0)).expect("solve");
        let stats = controller.stats().expect("stats");
        assert_eq!(stats.total, 12);
        assert_eq!(stats.aligned, 12);
        assert_eq!(stats.at_home, 12);
        assert_eq!(stats.progress, 100);
        assert_eq!((stats.offset.off_x, stats.offset.off_y), (0.0, 0.0));
    }

    #[test]
    fn negative_offset_still_completes() {
        let mut controller = controller(Difficulty::Easy, 7);
        let summary = solve(&mut controller, &args(-40.0, -25.0)).expect("solve");
        assert!(summary.completion.is_some());
    }
}
