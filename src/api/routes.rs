use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Scoring
        .route("/predict", post(handlers::predict))
        // Model / system endpoints
        .route("/model", get(handlers::model_info))
        .route("/health", get(handlers::health_handler))
        .route("/healthz", get(handlers::liveness_handler))
        .route("/readyz", get(handlers::readiness_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .fallback(handlers::not_found)
        // Add state and layers
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
