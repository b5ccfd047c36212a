use std::fmt;

use serde::{Deserialize, Serialize};

/// Smallest piece edge, in pixels, produced for tiny or empty canvases.
pub const MIN_PIECE_PX: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridShape {
    pub rows: u32,
    pub cols: u32,
}

impl GridShape {
    /// Zero rows or columns are raised to one.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    pub fn piece_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn id_of(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    pub fn label(&self) -> String {
        format!("{} pieces ({}x{})", self.piece_count(), self.rows, self.cols)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn grid(self) -> GridShape {
        match self {
            Difficulty::Easy => GridShape::new(3, 4),
            Difficulty::Medium => GridShape::new(4, 5),
            Difficulty::Hard => GridShape::new(6, 7),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
    }

    /// Unknown labels fall back to easy.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown difficulty: {value}"))
    }
}

/// Backing-store size of the board surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn from_css(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0).floor() as u32,
            height: height.max(0.0).floor() as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Piece {
    id: usize,
    row: u32,
    col: u32,
    correct_x: f32,
    correct_y: f32,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) locked: bool,
}

impl Piece {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn correct_x(&self) -> f32 {
        self.correct_x
    }

    pub fn correct_y(&self) -> f32 {
        self.correct_y
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Offset from the home position, `(x - correct_x, y - correct_y)`.
    pub fn displacement(&self) -> (f32, f32) {
        (self.x - self.correct_x, self.y - self.correct_y)
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, px: f32, py: f32, width: f32, height: f32) -> bool {
        px >= self.x && px <= self.x + width && py >= self.y && py <= self.y + height
    }

    pub(crate) fn snap_home(&mut self) {
        self.x = self.correct_x;
        self.y = self.correct_y;
    }
}

#[derive(Clone, Debug)]
pub struct GridLayout {
    pub grid: GridShape,
    pub canvas: CanvasSize,
    pub piece_width: f32,
    pub piece_height: f32,
    pub pieces: Vec<Piece>,
}

/// Piece edge lengths for a canvas and grid, never smaller than [`MIN_PIECE_PX`].
pub fn piece_size(canvas: CanvasSize, grid: GridShape) -> (f32, f32) {
    let width = (canvas.width / grid.cols.max(1)) as f32;
    let height = (canvas.height / grid.rows.max(1)) as f32;
    (width.max(MIN_PIECE_PX), height.max(MIN_PIECE_PX))
}

/// Slices the board into `rows * cols` pieces in row-major id order.
///
/// Every piece starts at the origin and unlocked; the scrambler places them.
pub fn create_pieces(canvas: CanvasSize, grid: GridShape) -> GridLayout {
    let grid = GridShape::new(grid.rows, grid.cols);
    let (piece_width, piece_height) = piece_size(canvas, grid);
    let mut pieces = Vec::with_capacity(grid.piece_count());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            pieces.push(Piece {
                id: row as usize * grid.cols as usize + col as usize,
                row,
                col,
                correct_x: col as f32 * piece_width,
                correct_y: row as f32 * piece_height,
                x: 0.0,
                y: 0.0,
                locked: false,
            });
        }
    }
    GridLayout {
        grid,
        canvas,
        piece_width,
        piece_height,
        pieces,
    }
}
