//! Prometheus metrics for the auth service.

use prometheus::{IntCounterVec, Opts, Registry};
use rust_common::VerificationOutcome;

use crate::jwt::TokenKind;

/// Issuance and validation counters.
#[derive(Clone)]
pub struct AuthMetrics {
    validations: IntCounterVec,
    tokens_issued: IntCounterVec,
}

impl AuthMetrics {
    /// Creates the metrics and registers them on `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self::detached()?;
        registry.register(Box::new(metrics.validations.clone()))?;
        registry.register(Box::new(metrics.tokens_issued.clone()))?;
        Ok(metrics)
    }

    /// Creates metrics that are not exported anywhere.
    pub fn detached() -> Result<Self, prometheus::Error> {
        let validations = IntCounterVec::new(
            Opts::new("validations_total", "Credential validations by result")
                .namespace("auth_service"),
            &["token_type", "result"],
        )?;
        let tokens_issued = IntCounterVec::new(
            Opts::new("tokens_issued_total", "Credentials issued").namespace("auth_service"),
            &["token_type"],
        )?;

        Ok(Self {
            validations,
            tokens_issued,
        })
    }

    /// Records a verification.
    pub fn record_validation(&self, kind: TokenKind, outcome: &VerificationOutcome) {
        let result = match outcome {
            VerificationOutcome::Valid(_) => "valid",
            VerificationOutcome::Invalid(reason) => reason.as_str(),
            VerificationOutcome::ServiceUnavailable(cause) => cause.as_str(),
        };
        self.validations
            .with_label_values(&[kind.as_str(), result])
            .inc();
    }

    /// Records an issuance.
    pub fn record_issued(&self, kind: TokenKind) {
        self.tokens_issued.with_label_values(&[kind.as_str()]).inc();
    }

    /// Current validation count.
    #[must_use]
    pub fn validation_count(&self, kind: TokenKind, result: &str) -> u64 {
        self.validations
            .with_label_values(&[kind.as_str(), result])
            .get()
    }

    /// Current issuance count.
    #[must_use]
    pub fn issued_count(&self, kind: TokenKind) -> u64 {
        self.tokens_issued.with_label_values(&[kind.as_str()]).get()
    }
}
