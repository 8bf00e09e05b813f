use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notation_core::{BoardError, ReconstructionError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Reconstruction(#[from] ReconstructionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Board(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Reconstruction(e) => {
                tracing::warn!("Reconstruction failed: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Could not reconstruct the game from the given photos".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
