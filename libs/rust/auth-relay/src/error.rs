//! Relay lifecycle errors and the HTTP rejection taxonomy.
//!
//! Rejection bodies carry a code, a short message and a correlation id.
//! Nothing from the downstream status, the credential or the resolver's
//! internals is ever copied into them.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_common::{InvalidReason, UnavailableCause};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors from opening the relay channel.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The configured endpoint is not a usable gRPC URI
    #[error("Invalid auth endpoint: {reason}")]
    InvalidEndpoint {
        /// Parser message
        reason: String,
    },

    /// `open()` called on an open channel
    #[error("Relay channel is already open")]
    AlreadyOpen,
}

/// Why the gate refused a request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No usable `Authorization: Bearer` header
    #[error("bearer credential missing")]
    NoToken,

    /// The issuer refused the credential
    #[error("credential rejected: {0}")]
    Invalid(InvalidReason),

    /// The issuer could not be consulted
    #[error("auth service unavailable: {0}")]
    Unavailable(UnavailableCause),
}

/// Error codes for gate responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No credential presented
    TokenMissing,
    /// Credential refused
    TokenInvalid,
    /// Issuer unreachable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenMissing => "AUTH_TOKEN_MISSING",
            Self::TokenInvalid => "AUTH_TOKEN_INVALID",
            Self::ServiceUnavailable => "AUTH_SERVICE_UNAVAILABLE",
        }
    }
}

impl GateRejection {
    /// Error code for this rejection.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoToken => ErrorCode::TokenMissing,
            Self::Invalid(_) => ErrorCode::TokenInvalid,
            Self::Unavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }

    /// HTTP status: 401, 403 or 503.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoToken => StatusCode::UNAUTHORIZED,
            Self::Invalid(_) => StatusCode::FORBIDDEN,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Caller-facing message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NoToken => "Authorization bearer token is required",
            Self::Invalid(reason) => reason.message(),
            Self::Unavailable(_) => "Authentication service unavailable, try again later",
        }
    }

    /// Builds the response with a known correlation id.
    #[must_use]
    pub fn to_response(&self, correlation_id: Uuid) -> Response {
        let body = ErrorBody {
            error: self.code().as_str(),
            message: self.message(),
            correlation_id,
        };

        let mut response = (self.status(), Json(body)).into_response();
        if matches!(self, Self::NoToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        self.to_response(Uuid::new_v4())
    }
}

/// JSON body of every gate rejection.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error code
    pub error: &'static str,
    /// Short human-readable text
    pub message: &'static str,
    /// Correlation id, also present in the rejection log event
    pub correlation_id: Uuid,
}
