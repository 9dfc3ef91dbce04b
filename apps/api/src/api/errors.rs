use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::errors::DomainError;

/// API error type with HTTP status code and message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a 401 Unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a 403 Forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Creates a 502 Bad Gateway error
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    /// Creates a 500 Internal Server Error
    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_)
            | DomainError::CurrencyMismatch { .. }
            | DomainError::NonPositiveAmount(_) => Self::bad_request(err.to_string()),
            DomainError::NotFound { .. } => Self::not_found(err.to_string()),
            DomainError::Conflict(_)
            | DomainError::InsufficientStock { .. }
            | DomainError::InvalidTransition { .. } => Self::conflict(err.to_string()),
            DomainError::PaymentGateway(ref detail) => {
                tracing::warn!(error = %detail, "Payment gateway call failed");
                Self::bad_gateway("Payment gateway unavailable")
            }
            DomainError::Storage(ref detail) => {
                tracing::error!(error = %detail, "Storage failure");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("Order", "x"), StatusCode::NOT_FOUND),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (
                DomainError::InsufficientStock {
                    sku: "A".to_string(),
                    requested: 2,
                    available: 1,
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::PaymentGateway("timeout".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DomainError::Storage("pool closed".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn storage_detail_is_not_exposed() {
        let err = ApiError::from(DomainError::Storage("password=hunter2".to_string()));
        assert_eq!(err.message, "Internal server error");
    }
}
