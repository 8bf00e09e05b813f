//! Identities for the first real snapshot of a game.
//!
//! A game photographed from move one gets the canonical layout. A game
//! joined mid-way asks the classifier about every occupied square and keeps
//! the guesses within the number of pieces each side can own.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::board::{BoardSnapshot, Figure, FigureColor, FigureType, Position, BOARD_SIZE};
use crate::classifier::PieceClassifier;
use crate::constants::{BLACK_PIECE_INTENSITY_THRESHOLD, WHITE_PIECE_INTENSITY_THRESHOLD};

/// Back rank from file a to file h.
const BACK_RANK: [FigureType; 8] = [
    FigureType::Rook,
    FigureType::Knight,
    FigureType::Bishop,
    FigureType::Queen,
    FigureType::King,
    FigureType::Bishop,
    FigureType::Knight,
    FigureType::Rook,
];

const EDGE_COLS: [u8; 2] = [0, 7];

/// Every file has its four starting squares occupied.
pub fn is_game_from_beginning(board: &BoardSnapshot) -> bool {
    Position::all()
        .filter(|pos| matches!(pos.col(), 0 | 1 | 6 | 7))
        .all(|pos| board.is_occupied(pos))
}

/// Write the standard starting position onto `board`. Squares outside the
/// four starting ranks get no identity.
pub fn assign_from_beginning(board: &mut BoardSnapshot) {
    for pos in Position::all() {
        let figure = match pos.col() {
            0 => Figure::new(BACK_RANK[pos.row() as usize], FigureColor::White),
            1 => Figure::new(FigureType::Pawn, FigureColor::White),
            6 => Figure::new(FigureType::Pawn, FigureColor::Black),
            7 => Figure::new(BACK_RANK[pos.row() as usize], FigureColor::Black),
            _ => Figure::EMPTY,
        };
        board.set_figure(pos, figure);
    }
}

/// How many more pieces of each identity may still be assigned.
#[derive(Debug, Clone)]
pub struct PieceBudget {
    remaining: HashMap<Figure, u8>,
}

impl PieceBudget {
    /// A full set for both sides.
    pub fn full() -> Self {
        let per_side = [
            (FigureType::King, 1),
            (FigureType::Queen, 1),
            (FigureType::Rook, 2),
            (FigureType::Bishop, 2),
            (FigureType::Knight, 2),
            (FigureType::Pawn, 8),
        ];
        let remaining = [FigureColor::White, FigureColor::Black]
            .into_iter()
            .flat_map(|color| {
                per_side
                    .iter()
                    .map(move |&(kind, count)| (Figure::new(kind, color), count))
            })
            .collect();
        Self { remaining }
    }

    pub fn remaining(&self, figure: Figure) -> u8 {
        self.remaining.get(&figure).copied().unwrap_or(0)
    }

    /// Take one `figure` out of the budget. Returns false when none are left.
    pub fn take(&mut self, figure: Figure) -> bool {
        match self.remaining.get_mut(&figure) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Default for PieceBudget {
    fn default() -> Self {
        Self::full()
    }
}

/// Bright squares hold white pieces, dark ones black; in between the
/// classifier's colour stands.
fn color_from_intensity(intensity: f64, predicted: FigureColor) -> FigureColor {
    if intensity > WHITE_PIECE_INTENSITY_THRESHOLD {
        FigureColor::White
    } else if intensity < BLACK_PIECE_INTENSITY_THRESHOLD {
        FigureColor::Black
    } else {
        predicted
    }
}

/// Occupied squares in assignment order: both back ranks first, then the
/// middle of the board, each row-major.
fn assignment_order(board: &BoardSnapshot) -> Vec<(Position, bool)> {
    let edges = Position::all()
        .filter(|pos| EDGE_COLS.contains(&pos.col()))
        .map(|pos| (pos, true));
    let middle = Position::all()
        .filter(|pos| (1..BOARD_SIZE - 1).contains(&pos.col()))
        .map(|pos| (pos, false));
    edges
        .chain(middle)
        .filter(|&(pos, _)| board.is_occupied(pos))
        .collect()
}

/// Identify every occupied square from the classifier's top `k` guesses.
/// Squares where no guess fits the budget are treated as misdetections and
/// cleared.
pub async fn assign_from_classifier<C: PieceClassifier>(
    board: &mut BoardSnapshot,
    classifier: &C,
    k: usize,
) {
    let mut budget = PieceBudget::full();
    let mut cleared = 0usize;

    for (pos, on_edge) in assignment_order(board) {
        let guesses = match board.square(pos).region() {
            Some(region) => classifier.predict_top_k(region, k).await,
            None => Vec::new(),
        };

        let accepted = guesses.into_iter().find(|guess| {
            let skipped = if on_edge {
                guess.kind == FigureType::Pawn
            } else {
                guess.is_empty()
            };
            !skipped && budget.remaining(*guess) > 0
        });

        match accepted {
            Some(guess) => {
                budget.take(guess);
                let color = color_from_intensity(board.square(pos).intensity(), guess.color);
                board.set_figure(pos, Figure::new(guess.kind, color));
            }
            None => {
                debug!(square = %pos, "No usable guess, clearing square");
                board.clear_square(pos);
                cleared += 1;
            }
        }
    }

    info!(
        pieces = board.occupied_count(),
        cleared, "Assigned mid-game starting position"
    );
}
