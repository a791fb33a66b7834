//! Error types for herdbook-ui

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use herdbook_common::lot::LotError;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Section exists in the menu but has no implementation (501)
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// herdbook-common error
    #[error(transparent)]
    Common(#[from] herdbook_common::Error),
}

impl From<LotError> for ApiError {
    fn from(err: LotError) -> Self {
        ApiError::Common(err.into())
    }
}

fn classify(err: &herdbook_common::Error) -> (StatusCode, &'static str) {
    use herdbook_common::Error;

    match err {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        Error::Spreadsheet(_) => (StatusCode::BAD_REQUEST, "SPREADSHEET_ERROR"),
        Error::MissingColumns(_) => (StatusCode::BAD_REQUEST, "MISSING_COLUMNS"),
        Error::InvalidRow { .. } => (StatusCode::BAD_REQUEST, "INVALID_ROW"),
        Error::Lot(LotError::EmptyLabel) => (StatusCode::BAD_REQUEST, "EMPTY_LABEL"),
        Error::Lot(LotError::SealNotFound(_)) => (StatusCode::NOT_FOUND, "SEAL_NOT_FOUND"),
        Error::Lot(LotError::InvalidTransition { .. }) => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        Error::Io(_) | Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Common(ref err) => {
                let (status, code) = classify(err);
                (status, code, err.to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(code = error_code, "{}", message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
