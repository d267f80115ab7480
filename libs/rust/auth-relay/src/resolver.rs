//! The seam between the gate and whatever verifies credentials.

use async_trait::async_trait;
use rust_common::VerificationOutcome;

/// Turns an opaque bearer credential into a [`VerificationOutcome`].
///
/// Implementations never fail: every problem is expressed as an
/// `Invalid` or `ServiceUnavailable` outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolves a credential. Called at most once per request.
    async fn resolve(&self, credential: &str) -> VerificationOutcome;
}
