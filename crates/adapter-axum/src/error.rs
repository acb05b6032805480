//! Axum-specific error types and mappings.
//!
//! Maps [`AdapterError`] and [`WorkflowError`] to HTTP status codes and a
//! JSON body of the form `{"error": ..., "status": ...}`.

use adapter_core::{AdapterError, WorkflowError, WorkflowStage};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required form field is missing or has the wrong shape.
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// A speech engine or other external service is down.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The voice-to-voice workflow stopped at `stage`.
    #[error("{message}")]
    Workflow {
        message: String,
        status: StatusCode,
        stage: WorkflowStage,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Workflow { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Workflow { message, stage, .. } => json!({
                "error": message,
                "status": status.as_u16(),
                "type": "WORKFLOW_STAGE_FAILED",
                "stage": stage,
            }),
            Self::BadRequest(msg)
            | Self::UnprocessableEntity(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => json!({
                "error": msg,
                "status": status.as_u16(),
            }),
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        (status, axum::Json(body)).into_response()
    }
}

impl From<AdapterError> for HttpError {
    fn from(err: AdapterError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::BadRequest(message),
            503 => Self::ServiceUnavailable(message),
            _ => Self::Internal(message),
        }
    }
}

impl From<WorkflowError> for HttpError {
    fn from(err: WorkflowError) -> Self {
        Self::Workflow {
            status: StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            stage: err.stage,
            message: err.message,
        }
    }
}
