use crate::grid::{CanvasSize, GridShape, Piece};

pub const SCRAMBLE_BASE_SEED: u32 = 0x5EED_2520;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Uniform value in `[0, 1)` from the top 24 bits of the mixed seed.
pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ splitmix32(salt));
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

pub fn scramble_seed(base: u32, nonce: u32, grid: GridShape) -> u32 {
    let shape = (grid.cols << 16) ^ grid.rows;
    base ^ nonce.wrapping_mul(0x9E37_79B9) ^ shape ^ 0x5CA7_7EED
}

/// Whole-pixel position on `[margin, extent - piece - margin]`.
///
/// Collapses to `margin` when the board has no room left for the piece.
fn scramble_axis(seed: u32, salt: u32, extent: u32, piece: f32, margin: f32) -> f32 {
    let span = (extent as f32 - piece - margin * 2.0).max(0.0);
    (rand_unit(seed, salt) * span).floor() + margin
}

/// One position per id in `0..count`, independent per axis and per piece.
pub fn scramble_positions(
    seed: u32,
    count: usize,
    canvas: CanvasSize,
    piece_width: f32,
    piece_height: f32,
    margin: f32,
) -> Vec<(f32, f32)> {
    let mut positions = Vec::with_capacity(count);
    for id in 0..count {
        let salt = (id as u32) << 1;
        let x = scramble_axis(seed, salt, canvas.width, piece_width, margin);
        let y = scramble_axis(seed, salt + 1, canvas.height, piece_height, margin);
        positions.push((x, y));
    }
    positions
}

/// Scatters every piece across the board and unlocks it.
///
/// Overlap between pieces is allowed.
pub fn shuffle_pieces(
    pieces: &mut [Piece],
    seed: u32,
    canvas: CanvasSize,
    piece_width: f32,
    piece_height: f32,
    margin: f32,
) {
    let total = pieces.iter().map(|p| p.id() + 1).max().unwrap_or(0);
    let positions = scramble_positions(seed, total, canvas, piece_width, piece_height, margin);
    for piece in pieces.iter_mut() {
        if let Some(&(x, y)) = positions.get(piece.id()) {
            piece.x = x;
            piece.y = y;
        }
        piece.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_unit_stays_in_unit_interval() {
        for salt in 0..2048 {
            let value = rand_unit(0xDEAD_BEEF, salt);
            assert!((0.0..1.0).contains(&value), "salt {salt} gave {value}");
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let canvas = CanvasSize::new(800, 600);
        let a = scramble_positions(7, 12, canvas, 200.0, 200.0, 12.0);
        let b = scramble_positions(7, 12, canvas, 200.0, 200.0, 12.0);
        let c = scramble_positions(8, 12, canvas, 200.0, 200.0, 12.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn cramped_board_pins_pieces_to_margin() {
        let positions = scramble_positions(3, 4, CanvasSize::new(30, 30), 20.0, 20.0, 12.0);
        assert!(positions.iter().all(|&(x, y)| x == 12.0 && y == 12.0));
    }

    #[test]
    fn seed_depends_on_grid_shape() {
        let easy = scramble_seed(SCRAMBLE_BASE_SEED, 1, GridShape::new(3, 4));
        let hard = scramble_seed(SCRAMBLE_BASE_SEED, 1, GridShape::new(6, 7));
        assert_ne!(easy, hard);
    }
}
