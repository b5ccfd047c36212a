pub mod alignment;
pub mod catalog;
pub mod confetti;
pub mod controller;
pub mod drag;
pub mod error;
pub mod grid;
pub mod rules;
pub mod scramble;
pub mod session;
pub mod store;
pub mod timer;

pub use alignment::{compute_global_offset, is_piece_aligned, median, GlobalOffset};
pub use catalog::{optimize_image_url, PuzzleCatalog, PuzzleDescriptor, WidgetConfig};
pub use confetti::{ConfettiBurst, ConfettiParticle};
pub use controller::{BoardStats, CompletionReport, PuzzleController, PuzzleEvent};
pub use drag::{client_to_canvas, BoardRect, DragController, DragOutcome, PointerId, PointerInput, PointerPhase};
pub use error::{CatalogError, PuzzleError, StoreError};
pub use grid::{create_pieces, CanvasSize, Difficulty, GridLayout, GridShape, Piece};
pub use rules::AlignmentRules;
pub use session::PuzzleSession;
pub use store::{KeyValueStore, MemoryStore};
pub use timer::{format_best, format_clock, PuzzleTimer};
