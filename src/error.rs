//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Service error taxonomy.
///
/// Every failure is either a permanent startup condition (`ArtifactNotFound`,
/// `SchemaMismatch` at load) or a request the caller must fix and resend.
/// There are no retries anywhere.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required on-disk artifact is missing. Fatal at startup: the service
    /// enters `Unavailable` and never leaves it.
    #[error("ArtifactNotFound: {0}")]
    ArtifactNotFound(String),

    /// Preprocessor output and model input have drifted apart. A deploy-time
    /// configuration bug, not recoverable per request.
    #[error("SchemaMismatch: {0}")]
    SchemaMismatch(String),

    /// Bad request input, rejected before any model work. Names the
    /// offending field.
    #[error("ValidationError: {0}")]
    Validation(String),

    /// Model artifacts are not loaded.
    #[error("ServiceUnavailable: {0}")]
    Unavailable(String),

    /// Anything else that went wrong while serving a request.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::ArtifactNotFound(msg) => {
                tracing::error!("Artifact missing: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Model not loaded. Train and save the model first.".to_string(),
                )
            }
            AppError::SchemaMismatch(msg) => {
                tracing::error!("Schema mismatch: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Prediction failed: SchemaMismatch: {}", msg),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Prediction failed: {}", msg),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
