//! Unified error handling for the ordering API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::queries::QueryError;

/// Application-level error type for the ordering API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Query against the ordering store failed.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Query(QueryError::Database(_) | QueryError::DataCorruption(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Ordering request error"
            );
        }

        let status = match &self {
            Self::Query(QueryError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Query(QueryError::NotFound(_)) => "Not found".to_string(),
            Self::Query(_) => "Internal server error".to_string(),
            Self::Unauthorized(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}
