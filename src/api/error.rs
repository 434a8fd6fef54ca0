use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::types::{ErrorResponse, ValidationErrorResponse};
use crate::domain::ValidationErrors;

/// Handler failures and the status codes they map to.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or non-coercible request fields
    Validation(ValidationErrors),
    /// Forward pass failed
    Inference(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse { detail: errors.0 }),
            )
                .into_response(),
            ApiError::Inference(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { detail }),
            )
                .into_response(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}
