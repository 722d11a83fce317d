//! Keyword-based stand-in for the prediction service
//!
//! Speaks the same `POST /predict` contract as the real model server so the
//! API and CLI can be exercised without one. Scores come from a small
//! lexicon and carry no real signal.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use tokio::net::TcpListener;
use tracing::{debug, info};

const TOXIC_PATTERNS: &[&str] = &[
    "hate", "stupid", "idiot", "dumb", "kill", "die", "worst", "terrible", "awful", "sucks",
    "garbage", "trash", "shit", "fuck", "damn", "asshole", "bastard", "bitch", "moron", "loser",
];

/// Which of the two payload shapes the mock answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// `{"prediction": 0|1, "confidence": x}`
    #[default]
    Prediction,
    /// `{"is_toxic": bool, "confidence": x}`
    IsToxic,
}

impl FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prediction" => Ok(Self::Prediction),
            "is-toxic" | "is_toxic" => Ok(Self::IsToxic),
            other => Err(format!(
                "unknown shape '{}', expected 'prediction' or 'is-toxic'",
                other
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    #[serde(default)]
    comment: String,
}

/// Lexicon score in [0, 0.95]
pub fn toxicity_score(text: &str) -> f64 {
    let text_lower = text.to_lowercase();
    let matches = TOXIC_PATTERNS
        .iter()
        .filter(|pattern| text_lower.contains(**pattern))
        .count() as f64;

    (matches * 0.35).clamp(0.0, 0.95)
}

/// Build the payload the mock returns for `comment`
pub fn mock_prediction(comment: &str, shape: ResponseShape) -> Value {
    let score = toxicity_score(comment);
    let is_toxic = score > 0.5;
    let confidence = if is_toxic { score } else { 1.0 - score };

    match shape {
        ResponseShape::Prediction => json!({
            "prediction": u8::from(is_toxic),
            "confidence": confidence,
        }),
        ResponseShape::IsToxic => json!({
            "is_toxic": is_toxic,
            "confidence": confidence,
        }),
    }
}

async fn predict(
    State(shape): State<ResponseShape>,
    Json(req): Json<PredictRequest>,
) -> Json<Value> {
    let payload = mock_prediction(&req.comment, shape);
    debug!("Mock prediction for {} chars: {}", req.comment.len(), payload);
    Json(payload)
}

/// Router exposing `POST /predict`
pub fn mock_model_router(shape: ResponseShape) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .with_state(shape)
}

/// Serve the mock on an already bound listener until the task is dropped
pub async fn serve_mock_model(listener: TcpListener, shape: ResponseShape) -> anyhow::Result<()> {
    info!(
        "Mock prediction service listening on http://{}/predict ({:?} shape)",
        listener.local_addr()?,
        shape
    );
    axum::serve(listener, mock_model_router(shape)).await?;
    Ok(())
}
