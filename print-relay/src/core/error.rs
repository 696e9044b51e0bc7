//! Relay error handling
//!
//! One error enum per failure class from the print pipeline, each
//! mapped to an HTTP status and a structured JSON body. A failed
//! request never leaks a partial receipt buffer; the response is always
//! a complete error document.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::printing::RenderError;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Referenced order does not exist upstream
    #[error("order not found: {0}")]
    NotFound(String),

    /// Snapshot source unreachable or timed out; single attempt, no
    /// silent retry
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// Malformed snapshot - an upstream data contract violation
    #[error("render defect: {0}")]
    Render(String),

    /// Every delivery strategy failed; the rendered buffer is still
    /// retrievable through /receipt without re-rendering
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Invalid print instruction
    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
            ServerError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "render_defect"),
            ServerError::Delivery(_) => (StatusCode::BAD_GATEWAY, "delivery_failure"),
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ServerError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for ServerError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound(msg) => ServerError::NotFound(msg),
            UpstreamError::Unavailable(msg) => ServerError::Upstream(msg),
            UpstreamError::Contract(msg) => ServerError::Render(msg),
        }
    }
}

impl From<RenderError> for ServerError {
    fn from(err: RenderError) -> Self {
        ServerError::Render(err.to_string())
    }
}

impl From<pos_printer::PrintError> for ServerError {
    fn from(err: pos_printer::PrintError) -> Self {
        ServerError::Delivery(err.to_string())
    }
}

/// Handler result type
pub type Result<T> = std::result::Result<T, ServerError>;
