use tracing::{debug, info, warn};

use crate::alignment;
use crate::catalog::{PuzzleCatalog, PuzzleDescriptor};
use crate::drag::{client_to_canvas, BoardRect, DragController, DragOutcome, PointerInput, PointerPhase, PointerId};
use crate::error::{PuzzleError, StoreError};
use crate::grid::{CanvasSize, Difficulty};
use crate::rules::AlignmentRules;
use crate::scramble::{scramble_seed, SCRAMBLE_BASE_SEED};
use crate::session::PuzzleSession;
use crate::store::{self, KeyValueStore};
use crate::timer::{format_best, format_clock};

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionReport {
    pub puzzle_id: String,
    pub difficulty: Difficulty,
    pub elapsed_ms: f64,
    /// Best time after this completion was recorded.
    pub best_ms: Option<f64>,
    pub new_best: bool,
    pub forced: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PuzzleEvent {
    Redraw,
    Progress(u8),
    TimerStarted,
    CapturePointer(PointerId),
    ReleasePointer(PointerId),
    Completed(CompletionReport),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardStats {
    pub total: usize,
    pub aligned: usize,
    pub at_home: usize,
    pub progress: u8,
    pub offset: alignment::GlobalOffset,
}

/// Owns the catalog position, difficulty, the current round and the
/// persistent store, and turns pointer input into board events.
pub struct PuzzleController<S: KeyValueStore> {
    rules: AlignmentRules,
    store: S,
    catalog: PuzzleCatalog,
    current_index: usize,
    difficulty: Difficulty,
    canvas: CanvasSize,
    session: Option<PuzzleSession>,
    drag: DragController,
    progress: u8,
}

impl<S: KeyValueStore> PuzzleController<S> {
    pub fn new(store: S, catalog: PuzzleCatalog, rules: AlignmentRules) -> Self {
        Self {
            rules,
            store,
            catalog,
            current_index: 0,
            difficulty: Difficulty::default(),
            canvas: CanvasSize::new(0, 0),
            session: None,
            drag: DragController::new(),
            progress: 0,
        }
    }

    pub fn rules(&self) -> &AlignmentRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn catalog(&self) -> &PuzzleCatalog {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_puzzle(&self) -> &PuzzleDescriptor {
        self.catalog.wrapped(self.current_index)
    }

    pub fn current_image_url(&self) -> String {
        self.current_puzzle().optimized_image_url()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn session(&self) -> Option<&PuzzleSession> {
        self.session.as_ref()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// True once the image is in and pieces exist.
    pub fn is_ready(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.piece_count() > 0)
    }

    pub fn is_completed(&self) -> bool {
        self.session.as_ref().is_some_and(PuzzleSession::completed)
    }

    /// Jumps to a catalog entry (wrapped). The current round is dropped
    /// until the caller has loaded the new image and installs it.
    pub fn select_puzzle(&mut self, index: usize) -> &PuzzleDescriptor {
        self.current_index = index % self.catalog.len();
        self.drop_round();
        let puzzle = self.catalog.wrapped(self.current_index);
        debug!(index = self.current_index, id = %puzzle.id, "puzzle selected");
        puzzle
    }

    pub fn next_puzzle(&mut self) -> &PuzzleDescriptor {
        let index = self.catalog.next_index(self.current_index);
        self.select_puzzle(index)
    }

    pub fn previous_puzzle(&mut self) -> &PuzzleDescriptor {
        let index = self.catalog.prev_index(self.current_index);
        self.select_puzzle(index)
    }

    fn drop_round(&mut self) {
        self.session = None;
        self.drag.reset();
        self.progress = 0;
    }

    /// Starts a fresh round on `canvas` with shuffled pieces and a stopped clock.
    pub fn install_puzzle(&mut self, canvas: CanvasSize, nonce: u32) -> Vec<PuzzleEvent> {
        self.canvas = canvas;
        let grid = self.difficulty.grid();
        let mut session = PuzzleSession::new(canvas, grid);
        let seed = scramble_seed(SCRAMBLE_BASE_SEED, nonce, grid);
        session.shuffle(seed, self.rules.shuffle_margin_px);
        self.session = Some(session);
        self.drag.reset();
        info!(
            puzzle = %self.current_puzzle().id,
            difficulty = %self.difficulty,
            width = canvas.width,
            height = canvas.height,
            "puzzle installed"
        );
        self.refresh_progress();
        vec![PuzzleEvent::Progress(self.progress), PuzzleEvent::Redraw]
    }

    /// Switches the grid preset. A loaded board is rebuilt immediately.
    pub fn select_difficulty(&mut self, difficulty: Difficulty, nonce: u32) -> Vec<PuzzleEvent> {
        self.difficulty = difficulty;
        if self.session.is_none() {
            return Vec::new();
        }
        self.install_puzzle(self.canvas, nonce)
    }

    /// Re-scatters the pieces. After completion this starts a new round
    /// instead, with a fresh clock.
    pub fn shuffle(&mut self, nonce: u32) -> Vec<PuzzleEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.completed() {
            return self.install_puzzle(self.canvas, nonce);
        }
        let seed = scramble_seed(SCRAMBLE_BASE_SEED, nonce, session.grid());
        session.shuffle(seed, self.rules.shuffle_margin_px);
        debug!(seed, "pieces reshuffled");
        self.drag.reset();
        self.refresh_progress();
        vec![PuzzleEvent::Progress(self.progress), PuzzleEvent::Redraw]
    }

    pub fn resize(&mut self, canvas: CanvasSize) -> Vec<PuzzleEvent> {
        self.canvas = canvas;
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.resize(canvas);
        self.refresh_progress();
        vec![PuzzleEvent::Progress(self.progress), PuzzleEvent::Redraw]
    }

    fn refresh_progress(&mut self) -> u8 {
        let tolerance = self.rules.detection_tolerance_px;
        self.progress = self
            .session
            .as_ref()
            .map(|session| session.progress(tolerance))
            .unwrap_or(0);
        self.progress
    }

    pub fn handle_pointer(&mut self, input: PointerInput, rect: BoardRect, now_ms: f64) -> Vec<PuzzleEvent> {
        let mut events = Vec::new();
        let Some(session) = self.session.as_mut() else {
            return events;
        };
        match input.phase {
            PointerPhase::Down => {
                let Some((x, y)) = client_to_canvas(input.client_x, input.client_y, rect, self.canvas) else {
                    return events;
                };
                match self.drag.pointer_down(session, x, y, input.pointer_id) {
                    DragOutcome::Started { pointer_id, .. } => {
                        if session.timer_mut().start(now_ms) {
                            events.push(PuzzleEvent::TimerStarted);
                        }
                        events.push(PuzzleEvent::CapturePointer(pointer_id));
                        events.push(PuzzleEvent::Redraw);
                    }
                    DragOutcome::Raised { .. } => events.push(PuzzleEvent::Redraw),
                    _ => {}
                }
            }
            PointerPhase::Move => {
                if self.drag.active_pointer() != Some(input.pointer_id) {
                    return events;
                }
                let Some((x, y)) = client_to_canvas(input.client_x, input.client_y, rect, self.canvas) else {
                    return events;
                };
                if let DragOutcome::Moved { .. } = self.drag.pointer_move(session, x, y, &self.rules) {
                    events.push(PuzzleEvent::Redraw);
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let DragOutcome::Released { pointer_id, .. } = self.drag.pointer_up(Some(input.pointer_id))
                else {
                    return events;
                };
                events.push(PuzzleEvent::ReleasePointer(pointer_id));
                events.push(PuzzleEvent::Progress(self.refresh_progress()));
                if let Some(report) = self.evaluate_completion(now_ms) {
                    events.push(PuzzleEvent::Completed(report));
                }
                events.push(PuzzleEvent::Redraw);
            }
        }
        events
    }

    fn evaluate_completion(&mut self, now_ms: f64) -> Option<CompletionReport> {
        let tolerance = self.rules.detection_tolerance_px;
        let session = self.session.as_mut()?;
        if !session.try_complete(tolerance, now_ms) {
            return None;
        }
        let elapsed_ms = session.timer().elapsed_ms(now_ms);
        self.refresh_progress();
        Some(self.finish_round(elapsed_ms, true, false))
    }

    fn finish_round(&mut self, elapsed_ms: f64, update_best: bool, forced: bool) -> CompletionReport {
        let puzzle_id = self.current_puzzle().id.clone();
        let difficulty = self.difficulty;
        let new_best = if update_best {
            match store::record_best(&mut self.store, &puzzle_id, difficulty, elapsed_ms) {
                Ok(written) => written,
                Err(err) => {
                    warn!(%err, puzzle = %puzzle_id, "best time not saved");
                    false
                }
            }
        } else {
            false
        };
        let best_ms = store::read_best(&self.store, &puzzle_id, difficulty);
        info!(
            puzzle = %puzzle_id,
            %difficulty,
            elapsed = %format_clock(elapsed_ms),
            new_best,
            forced,
            "puzzle completed"
        );
        CompletionReport {
            puzzle_id,
            difficulty,
            elapsed_ms,
            best_ms,
            new_best,
            forced,
        }
    }

    /// Completes the round on the spot: every piece home and locked.
    /// `Ok(None)` when the round was already complete.
    pub fn force_win(&mut self, update_best: bool, now_ms: f64) -> Result<Option<CompletionReport>, PuzzleError> {
        let Some(session) = self.session.as_mut() else {
            return Err(PuzzleError::NotReady);
        };
        if session.completed() {
            return Ok(None);
        }
        session.mark_completed(now_ms);
        let elapsed_ms = session.timer().elapsed_ms(now_ms);
        self.drag.reset();
        self.refresh_progress();
        let update_best = update_best && session_started(self.session.as_ref());
        Ok(Some(self.finish_round(elapsed_ms, update_best, true)))
    }

    /// Report for replaying the celebration of a round that is already
    /// complete. Nothing is written; `new_best` is always false.
    pub fn completed_report(&self, now_ms: f64) -> Option<CompletionReport> {
        let session = self.session.as_ref().filter(|session| session.completed())?;
        let puzzle_id = self.current_puzzle().id.clone();
        Some(CompletionReport {
            best_ms: store::read_best(&self.store, &puzzle_id, self.difficulty),
            puzzle_id,
            difficulty: self.difficulty,
            elapsed_ms: session.timer().elapsed_ms(now_ms),
            new_best: false,
            forced: true,
        })
    }

    /// Starts the clock without a grab, as if the player had just interacted.
    pub fn start_clock(&mut self, now_ms: f64) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.timer_mut().start(now_ms))
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        self.session
            .as_ref()
            .map(|session| session.timer().elapsed_ms(now_ms))
            .unwrap_or(0.0)
    }

    /// Clock text for the HUD, `00:00` before the first grab.
    pub fn clock_text(&self, now_ms: f64) -> String {
        format_clock(self.elapsed_ms(now_ms))
    }

    pub fn best_time(&self) -> Option<f64> {
        store::read_best(&self.store, &self.current_puzzle().id, self.difficulty)
    }

    pub fn best_label(&self) -> String {
        format_best(self.best_time())
    }

    pub fn can_show_preview(&self) -> bool {
        store::can_show_preview(&self.store, &self.current_puzzle().id)
    }

    /// Spends one preview view on the current puzzle.
    pub fn request_preview(&mut self) -> Result<bool, StoreError> {
        let puzzle_id = self.current_puzzle().id.clone();
        let shown = store::consume_preview_view(&mut self.store, &puzzle_id)?;
        if !shown {
            debug!(puzzle = %puzzle_id, "preview allowance used up");
        }
        Ok(shown)
    }

    /// Snapshot of the board: pieces aligned to the consensus offset, pieces
    /// sitting exactly on their absolute home, and the offset itself.
    pub fn stats(&self) -> Option<BoardStats> {
        let session = self.session.as_ref()?;
        let pieces = session.pieces();
        Some(BoardStats {
            total: pieces.len(),
            aligned: alignment::aligned_count(pieces, self.rules.detection_tolerance_px),
            at_home: alignment::count_at_home(pieces, self.rules.exact_tolerance_px),
            progress: self.progress,
            offset: session.global_offset(),
        })
    }
}

fn session_started(session: Option<&PuzzleSession>) -> bool {
    session.is_some_and(|session| session.timer().started())
}
