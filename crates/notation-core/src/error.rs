//! Error types for board construction and game reconstruction.

use thiserror::Error;

use crate::board::FigureColor;

/// Invalid input while building a snapshot.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("Square ({row}, {col}) is outside the board")]
    SquareOutOfBounds { row: i32, col: i32 },

    #[error("Square ({row}, {col}) given more than once")]
    DuplicateSquare { row: u8, col: u8 },

    #[error("Snapshot has {0} squares, expected 64")]
    MissingSquares(usize),

    #[error("Invalid square name: {0}")]
    InvalidSquareName(String),
}

/// Fatal failures. Any of these aborts the reconstruction of the whole game.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconstructionError {
    #[error("Self repair failed at snapshot {snapshot}")]
    SelfRepairFailed { snapshot: usize },

    #[error("Position of capture not found at snapshot {snapshot}")]
    CaptureNotFound { snapshot: usize },

    #[error("King not found on board: {color:?}")]
    KingNotFound { color: FigureColor },

    #[error("Board extraction failed for image {index}: {message}")]
    Extraction { index: usize, message: String },
}
