use std::collections::BTreeSet;

use tracing::debug;

use crate::alignment::{is_near_home, neighbor_snap_target};
use crate::grid::CanvasSize;
use crate::rules::AlignmentRules;
use crate::session::PuzzleSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer event in client (viewport) coordinates.
#[derive(Clone, Copy, Debug)]
pub struct PointerInput {
    pub phase: PointerPhase,
    pub pointer_id: PointerId,
    pub client_x: f32,
    pub client_y: f32,
}

/// Where the board is displayed, in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoardRect {
    /// Board displayed at its backing size at the client origin.
    pub fn identity(canvas: CanvasSize) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: canvas.width as f32,
            height: canvas.height as f32,
        }
    }
}

/// Maps a client point into canvas pixels using the displayed-to-backing ratio.
///
/// `None` while the board has no displayed area.
pub fn client_to_canvas(
    client_x: f32,
    client_y: f32,
    rect: BoardRect,
    canvas: CanvasSize,
) -> Option<(f32, f32)> {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return None;
    }
    let x = (client_x - rect.left) * (canvas.width as f32 / rect.width);
    let y = (client_y - rect.top) * (canvas.height as f32 / rect.height);
    Some((x, y))
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveDrag {
    piece_id: usize,
    offset_x: f32,
    offset_y: f32,
    pointer_id: PointerId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    Ignored,
    /// A locked piece was hit: raised to the top, no drag.
    Raised { piece_id: usize },
    /// The board should capture `pointer_id` until release.
    Started { piece_id: usize, pointer_id: PointerId },
    Moved {
        piece_id: usize,
        snapped: bool,
        highlighted: bool,
    },
    Released { piece_id: usize, pointer_id: PointerId },
}

/// Idle/Dragging state machine for a single active pointer.
///
/// Holds the dragged piece by id only; the session owns the piece.
#[derive(Clone, Debug, Default)]
pub struct DragController {
    active: Option<ActiveDrag>,
    highlights: BTreeSet<usize>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_piece(&self) -> Option<usize> {
        self.active.map(|drag| drag.piece_id)
    }

    pub fn active_pointer(&self) -> Option<PointerId> {
        self.active.map(|drag| drag.pointer_id)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn highlights(&self) -> &BTreeSet<usize> {
        &self.highlights
    }

    pub fn is_highlighted(&self, id: usize) -> bool {
        self.highlights.contains(&id)
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.highlights.clear();
    }

    pub fn pointer_down(
        &mut self,
        session: &mut PuzzleSession,
        x: f32,
        y: f32,
        pointer_id: PointerId,
    ) -> DragOutcome {
        if session.completed() || self.active.is_some() {
            return DragOutcome::Ignored;
        }
        let Some(piece_id) = session.hit_test(x, y) else {
            return DragOutcome::Ignored;
        };
        session.bring_to_top(piece_id);
        let Some(piece) = session.piece(piece_id).copied() else {
            return DragOutcome::Ignored;
        };
        if piece.locked() {
            return DragOutcome::Raised { piece_id };
        }
        self.active = Some(ActiveDrag {
            piece_id,
            offset_x: x - piece.x(),
            offset_y: y - piece.y(),
            pointer_id,
        });
        debug!(piece_id, x, y, "drag start");
        DragOutcome::Started {
            piece_id,
            pointer_id,
        }
    }

    /// Follows the pointer, applies the neighbor assist and rebuilds the
    /// home highlight set from scratch.
    pub fn pointer_move(
        &mut self,
        session: &mut PuzzleSession,
        x: f32,
        y: f32,
        rules: &AlignmentRules,
    ) -> DragOutcome {
        let Some(drag) = self.active else {
            return DragOutcome::Ignored;
        };
        let piece_id = drag.piece_id;
        if !session.move_piece(piece_id, x - drag.offset_x, y - drag.offset_y) {
            return DragOutcome::Ignored;
        }
        let mut snapped = false;
        if rules.neighbor_snap {
            let target = session.piece(piece_id).and_then(|piece| {
                neighbor_snap_target(
                    session.pieces(),
                    piece,
                    session.grid(),
                    session.piece_width(),
                    session.piece_height(),
                    rules.snap_tolerance_px,
                )
            });
            if let Some((snap_x, snap_y)) = target {
                snapped = session.move_piece(piece_id, snap_x, snap_y);
            }
        }
        self.highlights.clear();
        let highlighted = session
            .piece(piece_id)
            .map(|piece| is_near_home(piece, rules.highlight_tolerance_px()))
            .unwrap_or(false);
        if highlighted {
            self.highlights.insert(piece_id);
        }
        DragOutcome::Moved {
            piece_id,
            snapped,
            highlighted,
        }
    }

    /// Ends the drag. An up from a different pointer than the one that
    /// started the drag is ignored; `None` releases unconditionally.
    pub fn pointer_up(&mut self, pointer_id: Option<PointerId>) -> DragOutcome {
        let Some(drag) = self.active else {
            return DragOutcome::Ignored;
        };
        if pointer_id.is_some_and(|id| id != drag.pointer_id) {
            return DragOutcome::Ignored;
        }
        self.reset();
        debug!(piece_id = drag.piece_id, "drag release");
        DragOutcome::Released {
            piece_id: drag.piece_id,
            pointer_id: drag.pointer_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridShape;

    fn session() -> PuzzleSession {
        let mut session = PuzzleSession::new(CanvasSize::new(200, 200), GridShape::new(2, 2));
        session.move_piece(0, 0.0, 0.0);
        session.move_piece(1, 20.0, 20.0);
        session.move_piece(2, 300.0, 300.0);
        session.move_piece(3, 300.0, 0.0);
        session
    }

    #[test]
    fn client_mapping_scales_css_to_backing_pixels() {
        let rect = BoardRect {
            left: 10.0,
            top: 20.0,
            width: 100.0,
            height: 50.0,
        };
        let mapped = client_to_canvas(60.0, 45.0, rect, CanvasSize::new(200, 200));
        assert_eq!(mapped, Some((100.0, 100.0)));
        let collapsed = BoardRect { width: 0.0, ..rect };
        assert_eq!(client_to_canvas(0.0, 0.0, collapsed, CanvasSize::new(1, 1)), None);
    }

    #[test]
    fn down_picks_topmost_and_keeps_grab_offset() {
        let mut session = session();
        let mut drag = DragController::new();
        let outcome = drag.pointer_down(&mut session, 50.0, 50.0, PointerId(7));
        assert_eq!(
            outcome,
            DragOutcome::Started {
                piece_id: 1,
                pointer_id: PointerId(7)
            }
        );
        assert_eq!(session.z_order().last(), Some(&1));
        let rules = AlignmentRules {
            neighbor_snap: false,
            ..AlignmentRules::default()
        };
        drag.pointer_move(&mut session, 80.0, 95.0, &rules);
        assert_eq!(session.piece(1).map(|p| p.position()), Some((50.0, 65.0)));
    }

    #[test]
    fn highlight_tracks_home_distance_each_move() {
        let mut session = session();
        let mut drag = DragController::new();
        let rules = AlignmentRules {
            neighbor_snap: false,
            ..AlignmentRules::default()
        };
        drag.pointer_down(&mut session, 310.0, 10.0, PointerId(1));
        // piece 3 lands at (115, 108), home is (100, 100)
        drag.pointer_move(&mut session, 125.0, 118.0, &rules);
        assert!(drag.is_highlighted(3));
        drag.pointer_move(&mut session, 250.0, 250.0, &rules);
        assert!(drag.highlights().is_empty());
        drag.pointer_move(&mut session, 125.0, 118.0, &rules);
        assert!(drag.is_highlighted(3));
        assert!(matches!(drag.pointer_up(Some(PointerId(1))), DragOutcome::Released { .. }));
        assert!(drag.highlights().is_empty());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn neighbor_assist_pulls_piece_flush() {
        let mut session = session();
        let mut drag = DragController::new();
        drag.pointer_down(&mut session, 310.0, 310.0, PointerId(1));
        // piece 2 sits below piece 0 at (0, 100); drop it slightly off.
        let outcome = drag.pointer_move(&mut session, 15.0, 122.0, &AlignmentRules::default());
        assert!(matches!(outcome, DragOutcome::Moved { snapped: true, .. }));
        assert_eq!(session.piece(2).map(|p| p.position()), Some((0.0, 100.0)));
    }

    #[test]
    fn locked_piece_is_raised_but_not_dragged() {
        let mut session = session();
        session.lock_all_in_place();
        let mut drag = DragController::new();
        assert_eq!(
            drag.pointer_down(&mut session, 50.0, 50.0, PointerId(1)),
            DragOutcome::Raised { piece_id: 0 }
        );
        assert_eq!(session.z_order().last(), Some(&0));
        assert_eq!(
            drag.pointer_move(&mut session, 90.0, 90.0, &AlignmentRules::default()),
            DragOutcome::Ignored
        );
        assert_eq!(session.piece(0).map(|p| p.position()), Some((0.0, 0.0)));
    }

    #[test]
    fn up_from_other_pointer_is_ignored() {
        let mut session = session();
        let mut drag = DragController::new();
        drag.pointer_down(&mut session, 5.0, 5.0, PointerId(3));
        assert_eq!(drag.pointer_up(Some(PointerId(4))), DragOutcome::Ignored);
        assert!(drag.is_dragging());
        assert!(matches!(drag.pointer_up(Some(PointerId(3))), DragOutcome::Released { .. }));
        assert_eq!(drag.active_piece(), None);
    }
}
