//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Body could not be decoded into a person (422)
    Decode(String),
    /// Body decoded but a required field is empty (400)
    Validation(String),
    /// The `id` query parameter is missing or not an integer (404)
    InvalidId(String),
    /// Failure while reading a single record; `NotFound` maps to 404
    Lookup(RepositoryError),
    /// Any other repository or logic failure (500)
    Repository(RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidId(_) => StatusCode::NOT_FOUND,
            AppError::Lookup(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Lookup(_) | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Decode(msg) => ApiError::new("DECODE_ERROR", msg),
            AppError::Validation(msg) => ApiError::new("VALIDATION_ERROR", msg),
            AppError::InvalidId(msg) => ApiError::new("INVALID_ID", msg),
            AppError::Lookup(e) | AppError::Repository(e) => {
                let code = match &e {
                    RepositoryError::NotFound { .. } => "NOT_FOUND",
                    RepositoryError::TimeoutError { .. } => "TIMEOUT",
                    RepositoryError::Cancelled { .. } => "CANCELLED",
                    _ => "REPOSITORY_ERROR",
                };
                let api = ApiError::new(code, e.to_string());
                match e.context().operation.as_deref() {
                    Some(op) => api.with_details(format!("operation={}", op)),
                    None => api,
                }
            }
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code = %error.code, "{}", error.message);
        } else {
            tracing::warn!(status = status.as_u16(), code = %error.code, "{}", error.message);
        }

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_404_only_on_lookup() {
        let lookup = AppError::Lookup(RepositoryError::not_found("person not found"));
        assert_eq!(lookup.status(), StatusCode::NOT_FOUND);

        let delete = AppError::from(RepositoryError::not_found("person not found"));
        assert_eq!(delete.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_lookup_storage_failure_is_500() {
        let err = AppError::Lookup(RepositoryError::query("no such table: Person"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::InvalidId("abc".into()).status(), StatusCode::NOT_FOUND);
    }
}
