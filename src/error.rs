use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Replace a storage failure with an endpoint-specific public message,
    /// logging the underlying error. Validation and not-found pass through.
    pub fn or_internal(self, public: &'static str) -> Self {
        match self {
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                ApiError::Internal(public)
            }
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_internal_masks_storage_errors() {
        let err = ApiError::Storage(anyhow::anyhow!("connection refused")).or_internal("Failed");
        match err {
            ApiError::Internal(msg) => assert_eq!(msg, "Failed"),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn or_internal_passes_client_errors_through() {
        let err = ApiError::Validation("All fields are required".into()).or_internal("Failed");
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "All fields are required"),
            other => panic!("expected Validation, got {other:?}"),
        }

        let err = ApiError::NotFound("Submission not found").or_internal("Failed");
        assert!(matches!(err, ApiError::NotFound("Submission not found")));
    }
}
