//! HTTP-facing errors
//!
//! Every failure is logged with its details and answered with a generic
//! body, so storage messages never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use finova_store::StorageError;

/// Errors returned by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code sent to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self.status() {
            StatusCode::CONFLICT => "Conflict",
            _ => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_conflict_maps_to_409() {
        let err = AppError::from(StorageError::conflict("username taken"));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_read_maps_to_500_without_details() {
        let err = AppError::from(StorageError::read("relation \"users\" does not exist"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn internal_error_hides_details() {
        let err = AppError::Internal("key file unreadable".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }
}
