//! Auth service errors and their HTTP/gRPC rendering.
//!
//! Messages sent to callers are fixed strings; store and signing details
//! only reach the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_common::PlatformError;
use serde::Serialize;
use thiserror::Error;
use tonic::Status;
use tracing::error;
use uuid::Uuid;

/// Errors from the auth API.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Request body failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Refresh credential refused, or its subject no longer exists
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// No user with this id
    #[error("User not found")]
    UserNotFound,

    /// User store failure
    #[error("User store error: {0}")]
    Store(#[from] PlatformError),

    /// Signing or hashing failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Internal(format!("JWT encoding error: {err}"))
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Internal(format!("password hashing error: {err}"))
    }
}

impl AuthError {
    /// Stable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "AUTH_REFRESH_INVALID",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Store(e) if e.is_retryable() => "SERVICE_UNAVAILABLE",
            Self::Store(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Store(e) if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Internal details are replaced.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Internal(_) => "Internal server error".to_string(),
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

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let correlation_id = Uuid::new_v4();
        let status = self.status();
        if status.is_server_error() {
            error!(%correlation_id, error = %self, "auth request failed");
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.public_message(),
            correlation_id,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Status::invalid_argument(msg),
            AuthError::UserNotFound => Status::not_found("user not found"),
            AuthError::Store(e) if e.is_retryable() => {
                Status::unavailable("user store unavailable")
            }
            other => {
                error!(error = %other, "auth rpc failed");
                Status::internal("internal error")
            }
        }
    }
}
