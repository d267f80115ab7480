//! Prometheus metrics for relay outcomes.

use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use rust_common::VerificationOutcome;

/// Relay metrics, registered on an injected registry.
#[derive(Clone)]
pub struct RelayMetrics {
    outcomes: IntCounterVec,
    latency: HistogramVec,
}

impl RelayMetrics {
    /// Creates the metrics and registers them on `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self::detached()?;
        registry.register(Box::new(metrics.outcomes.clone()))?;
        registry.register(Box::new(metrics.latency.clone()))?;
        Ok(metrics)
    }

    /// Creates metrics that are not exported anywhere.
    pub fn detached() -> Result<Self, prometheus::Error> {
        let outcomes = IntCounterVec::new(
            Opts::new("outcomes_total", "Credential resolutions by outcome")
                .namespace("auth_relay"),
            &["outcome", "code"],
        )?;

        let latency = HistogramVec::new(
            HistogramOpts::new(
                "resolve_latency_seconds",
                "Time spent resolving a credential, including the RPC",
            )
            .namespace("auth_relay")
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["outcome"],
        )?;

        Ok(Self { outcomes, latency })
    }

    /// Records one resolution.
    pub fn observe(&self, outcome: &VerificationOutcome, elapsed: Duration) {
        let kind = outcome.kind();
        self.outcomes
            .with_label_values(&[kind, outcome_code(outcome)])
            .inc();
        self.latency
            .with_label_values(&[kind])
            .observe(elapsed.as_secs_f64());
    }

    /// Current value of the outcome counter.
    #[must_use]
    pub fn outcome_count(&self, outcome: &str, code: &str) -> u64 {
        self.outcomes.with_label_values(&[outcome, code]).get()
    }
}

/// `code` label: the invalid reason or unavailable cause, `ok` when valid.
fn outcome_code(outcome: &VerificationOutcome) -> &'static str {
    match outcome {
        VerificationOutcome::Valid(_) => "ok",
        VerificationOutcome::Invalid(reason) => reason.as_str(),
        VerificationOutcome::ServiceUnavailable(cause) => cause.as_str(),
    }
}
