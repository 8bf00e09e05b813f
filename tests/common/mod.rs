//! Shared helpers: scripted games played through shakmaty and turned into the
//! snapshots a camera over the board would produce.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{routing::post, Extension, Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine};
use notation_core::classifier::{format_label, SCORE_LABELS};
use notation_core::{BoardSnapshot, Figure, FigureColor, FigureType, Position, Square};
use reqwest::Client;
use serde_json::{json, Value};
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, File, Piece, Position as _, Rank, Role};

pub const WHITE_INTENSITY: f64 = 150.0;
pub const BLACK_INTENSITY: f64 = 20.0;
pub const EMPTY_INTENSITY: f64 = 60.0;

// ---------------------------------------------------------------------------
// Scripted games
// ---------------------------------------------------------------------------

/// Every position of a game, the starting position first.
pub fn play_script(moves: &[&str]) -> Vec<Chess> {
    let mut pos = Chess::default();
    let mut positions = vec![pos.clone()];
    for san in moves {
        let parsed: SanPlus = san.parse().unwrap_or_else(|_| panic!("invalid SAN: {san}"));
        let mv = parsed
            .san
            .to_move(&pos)
            .unwrap_or_else(|_| panic!("illegal move: {san}"));
        pos.play_unchecked(mv);
        positions.push(pos.clone());
    }
    positions
}

/// Replay engine output (letter style) from the starting position, checking
/// that every token is legal and that check marks agree with the rules.
pub fn replay_letters(tokens: &[String]) -> Chess {
    let mut pos = Chess::default();
    for token in tokens {
        let parsed: SanPlus = token.parse().unwrap_or_else(|_| panic!("invalid SAN: {token}"));
        let mv = parsed
            .san
            .to_move(&pos)
            .unwrap_or_else(|_| panic!("illegal move: {token}"));
        pos.play_unchecked(mv);
        assert_eq!(pos.is_check(), token.ends_with('+'), "check mark on {token}");
    }
    pos
}

pub fn figure_of(piece: Piece) -> Figure {
    let kind = match piece.role {
        Role::Pawn => FigureType::Pawn,
        Role::Knight => FigureType::Knight,
        Role::Bishop => FigureType::Bishop,
        Role::Rook => FigureType::Rook,
        Role::Queen => FigureType::Queen,
        Role::King => FigureType::King,
    };
    let color = match piece.color {
        Color::White => FigureColor::White,
        Color::Black => FigureColor::Black,
    };
    Figure::new(kind, color)
}

pub fn figure_at(pos: &Chess, at: Position) -> Option<Figure> {
    let square = shakmaty::Square::from_coords(File::new(at.row() as u32), Rank::new(at.col() as u32));
    pos.board().piece_at(square).map(figure_of)
}

pub fn intensity_of(occupant: Option<Figure>) -> f64 {
    match occupant.map(|f| f.color) {
        Some(FigureColor::White) => WHITE_INTENSITY,
        Some(FigureColor::Black) => BLACK_INTENSITY,
        _ => EMPTY_INTENSITY,
    }
}

/// One snapshot of `pos`. Every square's crop is its name (`b"e4"`).
/// `labelled` also records each piece's identity, as if already classified.
pub fn snapshot_of(pos: &Chess, labelled: bool) -> BoardSnapshot {
    BoardSnapshot::from_squares(Position::all().map(|at| {
        let occupant = figure_at(pos, at);
        let square = Square::new(at, occupant.is_some(), intensity_of(occupant))
            .with_region(at.to_string().into_bytes());
        match occupant {
            Some(figure) if labelled => square.with_figure(figure),
            _ => square,
        }
    }))
    .unwrap()
}

/// The empty reference board followed by one snapshot per position.
pub fn game_snapshots(positions: &[Chess], labelled: bool) -> Vec<BoardSnapshot> {
    std::iter::once(BoardSnapshot::empty())
        .chain(positions.iter().map(|pos| snapshot_of(pos, labelled)))
        .collect()
}

/// Identity of every occupied square of `pos`, keyed by square name.
pub fn identities(pos: &Chess) -> HashMap<String, Figure> {
    Position::all()
        .filter_map(|at| figure_at(pos, at).map(|figure| (at.to_string(), figure)))
        .collect()
}

// ---------------------------------------------------------------------------
// HTTP payloads
// ---------------------------------------------------------------------------

/// Snapshot JSON as accepted by `POST /api/notation`; `None` is the empty
/// reference board.
pub fn snapshot_json(pos: Option<&Chess>, labelled: bool) -> Value {
    let squares: Vec<Value> = Position::all()
        .map(|at| {
            let occupant = pos.and_then(|pos| figure_at(pos, at));
            let mut square = json!({
                "row": at.row(),
                "col": at.col(),
                "occupied": occupant.is_some(),
                "intensity": intensity_of(occupant),
                "image": STANDARD.encode(at.to_string()),
            });
            if let (Some(figure), true) = (occupant, labelled) {
                square["figure"] = json!(format_label(figure));
            }
            square
        })
        .collect();
    json!({ "squares": squares })
}

pub fn game_payload(positions: &[Chess], labelled: bool) -> Vec<Value> {
    std::iter::once(snapshot_json(None, labelled))
        .chain(positions.iter().map(|pos| snapshot_json(Some(pos), labelled)))
        .collect()
}

// ---------------------------------------------------------------------------
// In-process servers
// ---------------------------------------------------------------------------

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A stand-in for the classification service. Crops are square names; the
/// answer is looked up in `labels` (unknown squares are empty). Returns the
/// prediction endpoint URL.
pub async fn spawn_mock_classifier(labels: HashMap<String, Figure>) -> String {
    async fn predict(
        Extension(labels): Extension<Arc<HashMap<String, Figure>>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let crop = body["Base64Image"]
            .as_str()
            .and_then(|b64| STANDARD.decode(b64).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .unwrap_or_default();
        let label = format_label(labels.get(&crop).copied().unwrap_or(Figure::EMPTY));
        let score: Vec<f32> = SCORE_LABELS
            .iter()
            .map(|l| if *l == label { 0.9 } else { 0.01 })
            .collect();
        Json(json!({ "predictedLabel": label, "score": score }))
    }

    let router = Router::new()
        .route("/predict", post(predict))
        .layer(Extension(Arc::new(labels)));
    format!("{}/predict", spawn(router).await)
}
