use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::api::{
    state::AppState,
    types::{ErrorResponse, HealthResponse},
};
use crate::services::ModelInfo;

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: true,
        model_format: state.detector.info().format,
        uptime_secs: state.metrics.uptime_seconds(),
        timestamp: Utc::now(),
    })
}

/// GET /healthz -- is the process alive?
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /readyz -- the listener only binds after the model loaded
pub async fn readiness_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /model
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.detector.info())
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not Found".to_string(),
        }),
    )
}
