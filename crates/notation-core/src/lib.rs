//! Board-state reconstruction and notation generation.
//!
//! Takes an ordered series of board snapshots (one photograph per ply, each
//! reduced to per-square occupancy plus an optional piece identity) and
//! works out which move happened between every consecutive pair. Noisy
//! snapshots are repaired with geometric heuristics, special moves are
//! classified, and every ply ends up as a token in a two-column transcript.
//! The entry point is [`game::Game`].

pub mod board;
pub mod check;
pub mod classifier;
pub mod constants;
pub mod diff;
pub mod error;
pub mod game;
pub mod moves;
pub mod notation;
pub mod patterns;
pub mod repair;
pub mod setup;

pub use board::{BoardSnapshot, Figure, FigureColor, FigureType, Position, Square, SquareColor};
pub use classifier::PieceClassifier;
pub use error::{BoardError, ReconstructionError};
pub use game::Game;
pub use notation::{GlyphStyle, Transcript};
