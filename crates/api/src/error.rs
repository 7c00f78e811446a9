//! API Error Mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inference_engine::{InferenceError, PipelineError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Pipeline failure for this request
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Model or normalizer failed to load at startup
    #[error("Prediction service unavailable: model or scaler not loaded")]
    Unavailable,
    /// Worker task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Validation(_))
            | ApiError::Pipeline(PipelineError::Feature(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Inference(InferenceError::BatcherClosed))
            | ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(PipelineError::Inference(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Metric label for this error
    pub fn kind(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "invalid_input",
            StatusCode::SERVICE_UNAVAILABLE => "unavailable",
            _ => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Prediction failed: {}", self);
        } else {
            warn!("Rejected prediction request: {}", self);
        }
        metrics::counter!("rul_prediction_errors_total", "kind" => self.kind()).increment(1);

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
