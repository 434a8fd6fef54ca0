use axum::{body::Bytes, extract::State, Json};
use tracing::{debug, error};

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{Prediction, TransactionFeatures};

/// POST /predict
///
/// The body is decoded by hand rather than through `Json<T>` so that every
/// invalid field is reported, whatever the request content type.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<Prediction>, ApiError> {
    state.metrics.inc_requests();

    let features = TransactionFeatures::from_json_bytes(&body).map_err(|e| {
        state.metrics.inc_validation_failures();
        debug!("rejected predict request: {}", e);
        ApiError::from(e)
    })?;

    let prediction = state.detector.predict(&features).map_err(|e| {
        state.metrics.inc_inference_errors();
        error!("inference failed: {}", e);
        ApiError::Inference(e.to_string())
    })?;

    state.metrics.record_prediction(prediction.is_fraudulent);
    Ok(Json(prediction))
}
