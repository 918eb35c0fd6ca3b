//! services/api/src/web/error.rs
//!
//! Request-level error type. Converts the core `PortError` taxonomy into
//! `{"error": msg}` JSON responses with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leximate_core::ports::PortError;
use serde::Serialize;
use tracing::error;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// An HTTP error with a status code and a user-facing message.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<PortError> for HttpError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Invalid(msg) => Self::bad_request(msg),
            PortError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            PortError::Forbidden => Self::new(StatusCode::FORBIDDEN, "Not authorized"),
            PortError::NotFound(msg) => Self::not_found(msg),
            PortError::Upstream(msg) => {
                error!("Upstream service failure: {}", msg);
                Self::new(StatusCode::BAD_GATEWAY, "Upstream service failed")
            }
            PortError::Unexpected(msg) => {
                error!("Unexpected error: {}", msg);
                Self::internal("An unexpected error occurred")
            }
        }
    }
}

/// A convenience alias for handler results.
pub type HttpResult<T> = Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_statuses() {
        let cases = [
            (PortError::Invalid("x".into()), StatusCode::BAD_REQUEST),
            (PortError::Unauthorized, StatusCode::UNAUTHORIZED),
            (PortError::Forbidden, StatusCode::FORBIDDEN),
            (PortError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (PortError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
            (
                PortError::Unexpected("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status, status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = HttpError::from(PortError::Unexpected("connection refused".into()));
        assert!(!err.message.contains("connection refused"));
    }
}
