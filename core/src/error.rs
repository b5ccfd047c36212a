use thiserror::Error;

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("failed to load puzzle image {src}: {reason}")]
    ImageLoad { src: String, reason: String },
    #[error("puzzle is not ready (image or pieces missing)")]
    NotReady,
    #[error("puzzle was not ready after {waited_ms} ms")]
    ReadyTimeout { waited_ms: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write failed for {key}: {reason}")]
    Write { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed puzzle json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("puzzle catalog has no entries")]
    Empty,
}
