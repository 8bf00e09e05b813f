//! HTTP adapter for the piece classification service.
//!
//! The service takes one base64-encoded square crop per request and answers
//! with its best label and the raw score vector over all labels.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use notation_core::classifier::{parse_label, top_k_from_scores, PieceClassifier};
use notation_core::Figure;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct PredictionRequest<'a> {
    #[serde(rename = "Base64Image")]
    base64_image: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionResponse {
    predicted_label: Option<String>,
    score: Option<Vec<f32>>,
}

/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("BoardNotation/1.0")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn predict(&self, region: &[u8]) -> Result<PredictionResponse, String> {
        let encoded = STANDARD.encode(region);
        let resp = self
            .client
            .post(&self.url)
            .json(&PredictionRequest {
                base64_image: &encoded,
            })
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        resp.json::<PredictionResponse>()
            .await
            .map_err(|e| format!("Body parse error: {e}"))
    }
}

impl PieceClassifier for HttpClassifier {
    async fn predict_label(&self, region: &[u8]) -> Figure {
        match self.predict(region).await {
            Ok(PredictionResponse {
                predicted_label: Some(label),
                ..
            }) => parse_label(&label),
            Ok(_) => {
                tracing::warn!("Classifier response has no predictedLabel");
                Figure::EMPTY
            }
            Err(e) => {
                tracing::warn!("Piece prediction failed: {e}");
                Figure::EMPTY
            }
        }
    }

    async fn predict_top_k(&self, region: &[u8], k: usize) -> Vec<Figure> {
        match self.predict(region).await {
            Ok(PredictionResponse {
                score: Some(scores),
                ..
            }) => top_k_from_scores(&scores, k),
            Ok(_) => {
                tracing::warn!("Classifier response has no score array");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Top-k prediction failed: {e}");
                Vec::new()
            }
        }
    }
}
