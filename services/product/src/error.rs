//! Product service errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_common::PlatformError;
use serde::Serialize;
use thiserror::Error;
use tonic::Status;
use tracing::error;
use uuid::Uuid;

/// Errors from the product API.
#[derive(Error, Debug)]
pub enum ProductError {
    /// Request body failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No product with this id
    #[error("Product not found")]
    ProductNotFound,

    /// Catalogue or ledger failure
    #[error("Store error: {0}")]
    Store(#[from] PlatformError),
}

impl ProductError {
    /// Stable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Store(PlatformError::InvalidInput(_)) => {
                "VALIDATION_FAILED"
            }
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::Store(e) if e.is_retryable() => "SERVICE_UNAVAILABLE",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Store(PlatformError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::ProductNotFound => StatusCode::NOT_FOUND,
            Self::Store(e) if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Store details are replaced.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(PlatformError::InvalidInput(msg)) => msg.clone(),
            Self::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Structured error body with correlation ID
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code
    pub error: &'static str,
    /// Sanitized message
    pub message: String,
    /// Correlation ID for tracing
    pub correlation_id: Uuid,
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let correlation_id = Uuid::new_v4();
        let status = self.status();
        if status.is_server_error() {
            error!(%correlation_id, error = %self, "product request failed");
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.public_message(),
            correlation_id,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProductError> for Status {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg)
            | ProductError::Store(PlatformError::InvalidInput(msg)) => Status::invalid_argument(msg),
            ProductError::ProductNotFound => Status::not_found("product not found"),
            ProductError::Store(e) if e.is_retryable() => {
                Status::unavailable("product store unavailable")
            }
            ProductError::Store(e) => {
                error!(error = %e, "product rpc failed");
                Status::internal("internal error")
            }
        }
    }
}
