//! Tuning constants shared by the reconstruction stages.

/// Minimum change in square intensity that marks the landing square of a
/// capture (attacker replaces victim, so occupancy does not change).
pub const PIECE_INTENSITY_THRESHOLD: f64 = 20.0;

/// Squares brighter than this hold a white piece.
pub const WHITE_PIECE_INTENSITY_THRESHOLD: f64 = 100.0;

/// Squares darker than this hold a black piece.
pub const BLACK_PIECE_INTENSITY_THRESHOLD: f64 = 30.0;

/// Ranked guesses requested per square when assigning a mid-game position.
pub const DEFAULT_TOP_K: usize = 5;

/// Landing rows a castling king or rook can end up on.
pub const CASTLE_LANDING_ROWS: [u8; 4] = [2, 3, 5, 6];
