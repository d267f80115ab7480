//! User service errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_common::PlatformError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::catalog::CatalogError;

/// Errors from the user API.
#[derive(Error, Debug)]
pub enum UserError {
    /// Request body failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller has no profile yet
    #[error("User profile not found")]
    ProfileNotFound,

    /// The caller already has a profile
    #[error("User profile already exists")]
    ProfileExists,

    /// The product service does not know this product
    #[error("Product not found")]
    ProductNotFound,

    /// Product service call failed or was refused
    #[error("Catalogue error: {0}")]
    Catalog(#[from] CatalogError),

    /// Profile store failure
    #[error("Store error: {0}")]
    Store(#[from] PlatformError),
}

impl UserError {
    /// Stable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::Catalog(CatalogError::Refused(_)) => "VALIDATION_FAILED",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::ProfileExists => "PROFILE_EXISTS",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::Catalog(e) if e.is_unavailable() => "PRODUCT_SERVICE_UNAVAILABLE",
            Self::Store(e) if e.is_retryable() => "SERVICE_UNAVAILABLE",
            Self::Catalog(_) | Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Catalog(CatalogError::Refused(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::ProfileNotFound | Self::ProductNotFound => StatusCode::NOT_FOUND,
            Self::ProfileExists => StatusCode::CONFLICT,
            Self::Catalog(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(e) if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Catalog(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Transport and store details are replaced.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::Refused(msg)) => msg.clone(),
            Self::Catalog(e) if e.is_unavailable() => "Product service unavailable".to_string(),
            Self::Catalog(_) | Self::Store(_) => "Internal server error".to_string(),
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

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let correlation_id = Uuid::new_v4();
        let status = self.status();
        if status.is_server_error() {
            error!(%correlation_id, error = %self, "user request failed");
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.public_message(),
            correlation_id,
        };
        (status, Json(body)).into_response()
    }
}
