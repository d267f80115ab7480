//! Centralized error type for the collaborators behind the services.
//!
//! Stores (users, catalogue) and other opaque collaborators report failures
//! with `PlatformError`, classified as retryable or not.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// gRPC error occurred
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    /// Service is temporarily unavailable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout occurred
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// Check if this error is retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// let err = PlatformError::unavailable("user store");
    /// assert!(err.is_retryable());
    ///
    /// let err = PlatformError::NotFound("user".to_string());
    /// assert!(!err.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) => true,
            Self::Grpc(status) => matches!(
                status.code(),
                tonic::Code::Unavailable | tonic::Code::DeadlineExceeded
            ),
            _ => false,
        }
    }

    /// Create an unavailable error with the given message.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a conflict error with the given message.
    #[must_use]
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error with the given message.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PlatformError::unavailable("store").is_retryable());
        assert!(PlatformError::Timeout("store".to_string()).is_retryable());
        assert!(PlatformError::Grpc(tonic::Status::unavailable("down")).is_retryable());
        assert!(PlatformError::Grpc(tonic::Status::deadline_exceeded("slow")).is_retryable());
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!PlatformError::NotFound("user".to_string()).is_retryable());
        assert!(!PlatformError::conflict("email").is_retryable());
        assert!(!PlatformError::invalid_input("id").is_retryable());
        assert!(!PlatformError::internal("bug").is_retryable());
        assert!(!PlatformError::Grpc(tonic::Status::permission_denied("no")).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = PlatformError::conflict("email already registered");
        assert_eq!(err.to_string(), "Conflict: email already registered");
    }
}
