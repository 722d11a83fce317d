use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use toxiscan_core::{ClassificationRecord, Error, ErrorKind};
use tracing::error;

// ============================================================================
// Health endpoints
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics_handle {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

// ============================================================================
// Classification endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub comment: String,
}

pub async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Json<ClassificationRecord>, AppError> {
    let Json(req) = payload?;
    let record = state.orchestrator.submit(&req.comment).await?;
    Ok(Json(record))
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let orchestrator = &state.orchestrator;
    Json(json!({
        "state": orchestrator.state(),
        "history_len": orchestrator.history_len(),
        "metrics": orchestrator.metrics(),
    }))
}

// ============================================================================
// History endpoints
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let records = match query.limit {
        Some(limit) => state.orchestrator.recent(limit),
        None => state.orchestrator.history(),
    };
    Json(records)
}

pub async fn clear_history(State(state): State<AppState>) -> impl IntoResponse {
    state.orchestrator.clear_history().await;
    Json(json!({ "status": "cleared" }))
}

// ============================================================================
// Errors
// ============================================================================

/// Classification failure rendered for the web UI
#[derive(Debug)]
pub struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(Error::invalid_request(rejection.body_text()))
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::EmptyComment | ErrorKind::TooLong | ErrorKind::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Busy => StatusCode::CONFLICT,
            ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::UpstreamError | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Classification request failed: {}", self.0);
        }

        let body = json!({
            "error": {
                "message": self.0.user_message(),
                "kind": self.0.kind(),
            }
        });

        (status, Json(body)).into_response()
    }
}
