//! Piece-identity classification capability and its wire label codec.
//!
//! The reconstruction engine never talks to a model directly; it is handed a
//! [`PieceClassifier`] and asks it about the image crop of a single square.

use std::collections::HashMap;
use std::future::Future;

use crate::board::{Figure, FigureColor, FigureType};

/// Identifies the piece shown in the image crop of one square.
///
/// Implementations must not fail: transport or decoding problems are reported
/// as `Figure::EMPTY` / an empty guess list.
pub trait PieceClassifier: Send + Sync {
    /// Single best guess.
    fn predict_label(&self, region: &[u8]) -> impl Future<Output = Figure> + Send;

    /// Up to `k` guesses, most confident first.
    fn predict_top_k(&self, region: &[u8], k: usize) -> impl Future<Output = Vec<Figure>> + Send;
}

/// Labels in the order of the classification model's score vector.
pub const SCORE_LABELS: [&str; 13] = [
    "b_king", "w_rook", "w_king", "b_bishop", "w_pawn", "w_knight", "w_bishop", "b_rook",
    "b_knight", "b_pawn", "empty", "b_queen", "w_queen",
];

/// Parse a `"{color}_{type}"` label such as `"w_pawn"`. `"empty"` and
/// anything unrecognised map to `Figure::EMPTY`.
pub fn parse_label(label: &str) -> Figure {
    let Some((color, kind)) = label.trim().split_once('_') else {
        return Figure::EMPTY;
    };
    let color = match color {
        "w" => FigureColor::White,
        "b" => FigureColor::Black,
        _ => return Figure::EMPTY,
    };
    let kind = match kind {
        "pawn" => FigureType::Pawn,
        "rook" => FigureType::Rook,
        "knight" => FigureType::Knight,
        "bishop" => FigureType::Bishop,
        "queen" => FigureType::Queen,
        "king" => FigureType::King,
        _ => return Figure::EMPTY,
    };
    Figure::new(kind, color)
}

/// Inverse of [`parse_label`].
pub fn format_label(figure: Figure) -> String {
    let color = match figure.color {
        FigureColor::White => "w",
        FigureColor::Black => "b",
        FigureColor::Empty => return "empty".to_string(),
    };
    let kind = match figure.kind {
        FigureType::Pawn => "pawn",
        FigureType::Rook => "rook",
        FigureType::Knight => "knight",
        FigureType::Bishop => "bishop",
        FigureType::Queen => "queen",
        FigureType::King => "king",
        FigureType::Empty => return "empty".to_string(),
    };
    format!("{color}_{kind}")
}

/// Rank a model score vector and return the `k` best labels as figures.
/// Indices past the known label table decode as empty.
pub fn top_k_from_scores(scores: &[f32], k: usize) -> Vec<Figure> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(k)
        .map(|(index, _)| {
            SCORE_LABELS
                .get(index)
                .map_or(Figure::EMPTY, |label| parse_label(label))
        })
        .collect()
}

/// Answers from a fixed table keyed by image crop. Used to replay games whose
/// crops were labelled offline, and as a deterministic stand-in for the model.
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    guesses: HashMap<Vec<u8>, Vec<Figure>>,
}

impl StaticClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register ranked guesses for a crop, most confident first.
    pub fn with_guesses(mut self, region: impl Into<Vec<u8>>, guesses: Vec<Figure>) -> Self {
        self.guesses.insert(region.into(), guesses);
        self
    }
}

impl PieceClassifier for StaticClassifier {
    async fn predict_label(&self, region: &[u8]) -> Figure {
        self.guesses
            .get(region)
            .and_then(|guesses| guesses.first().copied())
            .unwrap_or(Figure::EMPTY)
    }

    async fn predict_top_k(&self, region: &[u8], k: usize) -> Vec<Figure> {
        self.guesses
            .get(region)
            .map(|guesses| guesses.iter().take(k).copied().collect())
            .unwrap_or_default()
    }
}
