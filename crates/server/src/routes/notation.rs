use axum::{extract::rejection::JsonRejection, Extension, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use notation_core::classifier::parse_label;
use notation_core::{
    BoardError, BoardSnapshot, Game, GlyphStyle, PieceClassifier, Position, Square,
};
use serde::{Deserialize, Serialize};

use crate::clients::classifier::HttpClassifier;
use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotationRequest {
    pub snapshots: Vec<SnapshotPayload>,
    #[serde(default)]
    pub from_beginning: Option<bool>,
    #[serde(default)]
    pub style: Option<GlyphStyle>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SnapshotPayload {
    pub squares: Vec<SquarePayload>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SquarePayload {
    pub row: i32,
    pub col: i32,
    pub occupied: bool,
    #[serde(default)]
    pub intensity: f64,
    /// Classifier label such as `"w_pawn"`, when already known.
    #[serde(default)]
    pub figure: Option<String>,
    /// Base64 image crop of the square.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NotationResponse {
    pub moves: Vec<String>,
    pub transcript: String,
    pub movetext: String,
}

impl SquarePayload {
    fn into_square(self) -> Result<Square, AppError> {
        let position = Position::from_signed(self.row, self.col).ok_or(
            BoardError::SquareOutOfBounds {
                row: self.row,
                col: self.col,
            },
        )?;
        let mut square = Square::new(position, self.occupied, self.intensity);
        if let Some(label) = &self.figure {
            square = square.with_figure(parse_label(label));
        }
        if let Some(image) = &self.image {
            let crop = STANDARD
                .decode(image)
                .map_err(|e| AppError::BadRequest(format!("Invalid image for {position}: {e}")))?;
            square = square.with_region(crop);
        }
        Ok(square)
    }
}

impl SnapshotPayload {
    pub fn into_snapshot(self) -> Result<BoardSnapshot, AppError> {
        let squares = self
            .squares
            .into_iter()
            .map(SquarePayload::into_square)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoardSnapshot::from_squares(squares)?)
    }
}

/// Run the whole engine over one request's snapshots.
pub async fn transcribe<C: PieceClassifier>(
    request: NotationRequest,
    classifier: C,
    default_style: GlyphStyle,
    top_k: usize,
) -> Result<NotationResponse, AppError> {
    let snapshots = request
        .snapshots
        .into_iter()
        .map(SnapshotPayload::into_snapshot)
        .collect::<Result<Vec<_>, _>>()?;

    let mut game = Game::new(classifier)
        .with_style(request.style.unwrap_or(default_style))
        .with_top_k(top_k);
    game.load(snapshots);
    let transcript = game.generate_notation(request.from_beginning).await?;

    Ok(NotationResponse {
        moves: game.transcript().moves().to_vec(),
        transcript,
        movetext: game.transcript().movetext(),
    })
}

/// POST /api/notation
pub async fn generate_notation(
    Extension(config): Extension<Config>,
    Extension(classifier): Extension<HttpClassifier>,
    payload: Result<Json<NotationRequest>, JsonRejection>,
) -> Result<Json<NotationResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!(snapshots = request.snapshots.len(), "Generating notation");

    let response = transcribe(
        request,
        classifier,
        config.notation_style,
        config.classifier_top_k,
    )
    .await?;
    Ok(Json(response))
}
