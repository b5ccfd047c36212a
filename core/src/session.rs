use crate::alignment::{self, GlobalOffset};
use crate::grid::{create_pieces, CanvasSize, GridShape, Piece};
use crate::scramble::shuffle_pieces;
use crate::timer::PuzzleTimer;

/// One puzzle round: the pieces, their layout and the solve state.
///
/// `pieces` is kept in z-order, last element topmost. Rounds are replaced
/// wholesale on load, difficulty change or post-completion shuffle.
#[derive(Clone, Debug)]
pub struct PuzzleSession {
    grid: GridShape,
    canvas: CanvasSize,
    piece_width: f32,
    piece_height: f32,
    pieces: Vec<Piece>,
    completed: bool,
    timer: PuzzleTimer,
}

impl PuzzleSession {
    /// Fresh unshuffled session with every piece at the origin.
    pub fn new(canvas: CanvasSize, grid: GridShape) -> Self {
        let layout = create_pieces(canvas, grid);
        Self {
            grid: layout.grid,
            canvas: layout.canvas,
            piece_width: layout.piece_width,
            piece_height: layout.piece_height,
            pieces: layout.pieces,
            completed: false,
            timer: PuzzleTimer::new(),
        }
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn piece_width(&self) -> f32 {
        self.piece_width
    }

    pub fn piece_height(&self) -> f32 {
        self.piece_height
    }

    /// Pieces in paint order, bottom first.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn piece(&self, id: usize) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id() == id)
    }

    pub fn z_order(&self) -> Vec<usize> {
        self.pieces.iter().map(Piece::id).collect()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn timer(&self) -> &PuzzleTimer {
        &self.timer
    }

    pub(crate) fn timer_mut(&mut self) -> &mut PuzzleTimer {
        &mut self.timer
    }

    pub fn shuffle(&mut self, seed: u32, margin: f32) {
        shuffle_pieces(
            &mut self.pieces,
            seed,
            self.canvas,
            self.piece_width,
            self.piece_height,
            margin,
        );
    }

    /// Topmost piece whose rectangle contains the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<usize> {
        self.pieces
            .iter()
            .rev()
            .find(|piece| piece.contains(x, y, self.piece_width, self.piece_height))
            .map(Piece::id)
    }

    /// Moves the piece to the end of the z-order. False for unknown ids.
    pub fn bring_to_top(&mut self, id: usize) -> bool {
        let Some(index) = self.pieces.iter().position(|piece| piece.id() == id) else {
            return false;
        };
        let piece = self.pieces.remove(index);
        self.pieces.push(piece);
        true
    }

    /// Repositions an unlocked piece. Locked or unknown pieces are untouched.
    pub fn move_piece(&mut self, id: usize, x: f32, y: f32) -> bool {
        let Some(piece) = self.pieces.iter_mut().find(|piece| piece.id() == id) else {
            return false;
        };
        if piece.locked() {
            return false;
        }
        piece.x = x;
        piece.y = y;
        true
    }

    pub fn global_offset(&self) -> GlobalOffset {
        alignment::compute_global_offset(&self.pieces)
    }

    pub fn progress(&self, tolerance: f32) -> u8 {
        alignment::progress_percent(&self.pieces, tolerance)
    }

    pub fn is_solved(&self, tolerance: f32) -> bool {
        alignment::all_aligned(&self.pieces, tolerance)
    }

    /// Snaps the whole assembly to its canonical position and locks it.
    pub fn lock_all_in_place(&mut self) {
        for piece in &mut self.pieces {
            piece.snap_home();
            piece.locked = true;
        }
    }

    /// Completion latch. On the first call that finds every piece aligned,
    /// locks the board, stops the clock and returns true; afterwards always
    /// returns false.
    pub fn try_complete(&mut self, tolerance: f32, now_ms: f64) -> bool {
        if self.completed || !self.is_solved(tolerance) {
            return false;
        }
        self.mark_completed(now_ms);
        true
    }

    /// Forced completion path; same end state as [`Self::try_complete`].
    pub(crate) fn mark_completed(&mut self, now_ms: f64) {
        self.completed = true;
        self.timer.stop(now_ms);
        self.lock_all_in_place();
    }

    /// Rebuilds the layout for a new canvas, keeping each piece at the same
    /// relative spot on the board and keeping z-order and lock state.
    pub fn resize(&mut self, canvas: CanvasSize) {
        if canvas == self.canvas {
            return;
        }
        let layout = create_pieces(canvas, self.grid);
        let scale_x = canvas.width as f32 / self.canvas.width.max(1) as f32;
        let scale_y = canvas.height as f32 / self.canvas.height.max(1) as f32;
        let mut resized = Vec::with_capacity(self.pieces.len());
        for old in &self.pieces {
            let Some(mut piece) = layout.pieces.get(old.id()).copied() else {
                continue;
            };
            if old.locked() {
                piece.snap_home();
            } else {
                piece.x = (old.x() * scale_x).round();
                piece.y = (old.y() * scale_y).round();
            }
            piece.locked = old.locked();
            resized.push(piece);
        }
        self.canvas = layout.canvas;
        self.piece_width = layout.piece_width;
        self.piece_height = layout.piece_height;
        self.pieces = resized;
    }
}
