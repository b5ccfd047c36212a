//! Consensus-offset alignment.
//!
//! The board counts as solved when pieces sit correctly relative to each
//! other; the assembly itself may be anywhere on the canvas. The anchor of
//! that assembly is the per-axis median displacement of all pieces, which a
//! single stray piece cannot drag around.

use crate::grid::{GridShape, Piece};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalOffset {
    pub off_x: f32,
    pub off_y: f32,
}

/// Middle element of the sorted values; for an even count the mean of the
/// two middle elements rounded half-up to a whole pixel. Empty input is 0.
pub fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        round_half_up((values[mid - 1] + values[mid]) / 2.0)
    }
}

fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

pub fn compute_global_offset(pieces: &[Piece]) -> GlobalOffset {
    if pieces.is_empty() {
        return GlobalOffset::default();
    }
    let (dxs, dys): (Vec<f32>, Vec<f32>) = pieces.iter().map(Piece::displacement).unzip();
    GlobalOffset {
        off_x: median(dxs),
        off_y: median(dys),
    }
}

pub fn is_piece_aligned(piece: &Piece, offset: GlobalOffset, tolerance: f32) -> bool {
    (piece.x() - (piece.correct_x() + offset.off_x)).abs() <= tolerance
        && (piece.y() - (piece.correct_y() + offset.off_y)).abs() <= tolerance
}

pub fn aligned_count(pieces: &[Piece], tolerance: f32) -> usize {
    let offset = compute_global_offset(pieces);
    pieces
        .iter()
        .filter(|piece| is_piece_aligned(piece, offset, tolerance))
        .count()
}

/// Whole percent of pieces aligned with the consensus offset.
pub fn progress_percent(pieces: &[Piece], tolerance: f32) -> u8 {
    if pieces.is_empty() {
        return 0;
    }
    let aligned = aligned_count(pieces, tolerance) as f32;
    round_half_up(aligned * 100.0 / pieces.len() as f32) as u8
}

/// False for an empty board.
pub fn all_aligned(pieces: &[Piece], tolerance: f32) -> bool {
    if pieces.is_empty() {
        return false;
    }
    let offset = compute_global_offset(pieces);
    pieces
        .iter()
        .all(|piece| is_piece_aligned(piece, offset, tolerance))
}

/// Within `tolerance` of the absolute home position on both axes.
pub fn is_near_home(piece: &Piece, tolerance: f32) -> bool {
    let (dx, dy) = piece.displacement();
    dx.abs() <= tolerance && dy.abs() <= tolerance
}

pub fn count_at_home(pieces: &[Piece], tolerance: f32) -> usize {
    pieces
        .iter()
        .filter(|piece| is_near_home(piece, tolerance))
        .count()
}

const NEIGHBOR_DIRS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Position that puts `piece` flush against the first grid neighbor (left,
/// right, up, down) whose relative placement is within `tolerance` of the
/// exact neighbor offset on both axes.
///
/// `pieces` may be in any order; neighbors are looked up by id.
pub fn neighbor_snap_target(
    pieces: &[Piece],
    piece: &Piece,
    grid: GridShape,
    piece_width: f32,
    piece_height: f32,
    tolerance: f32,
) -> Option<(f32, f32)> {
    for (dr, dc) in NEIGHBOR_DIRS {
        let row = piece.row() as i32 + dr;
        let col = piece.col() as i32 + dc;
        if row < 0 || col < 0 {
            continue;
        }
        let Some(neighbor_id) = grid.id_of(row as u32, col as u32) else {
            continue;
        };
        let Some(neighbor) = pieces.iter().find(|p| p.id() == neighbor_id) else {
            continue;
        };
        // Expected vector from the neighbor to this piece.
        let expect_x = -(dc as f32) * piece_width;
        let expect_y = -(dr as f32) * piece_height;
        let gap_x = ((piece.x() - neighbor.x()) - expect_x).abs();
        let gap_y = ((piece.y() - neighbor.y()) - expect_y).abs();
        if gap_x <= tolerance && gap_y <= tolerance {
            return Some((neighbor.x() + expect_x, neighbor.y() + expect_y));
        }
    }
    None
}
