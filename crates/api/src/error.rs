//! API error types with HTTP response mapping.

use aggregator::AggregateError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ErrorKind;
use journey::JourneyError;
use repository::RepositoryError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Journey(#[from] JourneyError),
}

impl ApiError {
    /// Returns the failure category, used to pick the HTTP status.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Aggregate(e) => e.kind(),
            ApiError::Repository(e) => e.kind(),
            ApiError::Journey(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "internal server error");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
