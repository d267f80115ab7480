//! gRPC client that forwards bearer credentials to the auth service.
//!
//! The channel is opened explicitly at startup and closed at shutdown. In
//! between, calls clone the shared client out of an `ArcSwapOption` and
//! never take a lock; tonic multiplexes them over one HTTP/2 connection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_common::proto::auth::v1::{
    auth_service_client::AuthServiceClient, ValidateTokenRequest, ValidateTokenResponse,
};
use rust_common::{Identity, InvalidReason, UnavailableCause, VerificationOutcome};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::metrics::RelayMetrics;
use crate::resolver::CredentialResolver;

const VALIDATE_TOKEN: &str = "auth.v1.AuthService/ValidateToken";

/// Relay to `auth.v1.AuthService/ValidateToken`.
pub struct TokenRelayClient {
    config: RelayConfig,
    client: ArcSwapOption<AuthServiceClient<Channel>>,
    /// Serializes `open`/`close`; `resolve` never touches it.
    lifecycle: Mutex<()>,
    metrics: RelayMetrics,
}

impl TokenRelayClient {
    /// Creates a closed relay. Call [`open`](Self::open) before serving.
    #[must_use]
    pub fn new(config: RelayConfig, metrics: RelayMetrics) -> Self {
        Self {
            config,
            client: ArcSwapOption::empty(),
            lifecycle: Mutex::new(()),
            metrics,
        }
    }

    /// Opens the channel.
    ///
    /// The connection itself is established lazily on the first call, so an
    /// auth service that is down at startup shows up as `ServiceUnavailable`
    /// outcomes rather than a boot failure. Must run inside a tokio runtime.
    pub fn open(&self) -> Result<(), RelayError> {
        let _guard = self.lifecycle.lock();
        if self.client.load().is_some() {
            return Err(RelayError::AlreadyOpen);
        }

        self.config
            .validate()
            .map_err(|e| RelayError::InvalidEndpoint {
                reason: e.to_string(),
            })?;

        let endpoint = Endpoint::from_shared(self.config.endpoint_uri())
            .map_err(|e| RelayError::InvalidEndpoint {
                reason: e.to_string(),
            })?
            .connect_timeout(self.config.connect_timeout);

        let channel = endpoint.connect_lazy();
        self.client
            .store(Some(Arc::new(AuthServiceClient::new(channel))));

        info!(
            endpoint = %self.config.endpoint,
            deadline = ?self.config.deadline,
            "auth relay channel opened"
        );
        Ok(())
    }

    /// Releases the channel. Returns `false` if it was not open.
    ///
    /// Calls already in flight keep their own handle and finish normally;
    /// later calls see `NotInitialized`.
    pub fn close(&self) -> bool {
        let _guard = self.lifecycle.lock();
        let was_open = self.client.swap(None).is_some();
        if was_open {
            info!(endpoint = %self.config.endpoint, "auth relay channel closed");
        }
        was_open
    }

    /// Whether `open` has been called without a matching `close`.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.client.load().is_some()
    }

    /// Forwards `credential` to the auth service and classifies the answer.
    pub async fn resolve(&self, credential: &str) -> VerificationOutcome {
        let started = Instant::now();

        let outcome = match self.client.load_full() {
            Some(client) => self.call((*client).clone(), credential).await,
            None => VerificationOutcome::ServiceUnavailable(UnavailableCause::NotInitialized),
        };

        self.report(&outcome, started.elapsed());
        outcome
    }

    async fn call(
        &self,
        mut client: AuthServiceClient<Channel>,
        credential: &str,
    ) -> VerificationOutcome {
        let deadline = self.config.deadline;
        let mut request = Request::new(ValidateTokenRequest {
            token: credential.to_owned(),
        });
        request.set_timeout(deadline);

        match tokio::time::timeout(deadline, client.validate_token(request)).await {
            Err(_) => VerificationOutcome::ServiceUnavailable(UnavailableCause::DeadlineExceeded),
            Ok(Err(status)) => VerificationOutcome::ServiceUnavailable(cause_from_status(&status)),
            Ok(Ok(response)) => outcome_from_response(response.into_inner()),
        }
    }

    fn report(&self, outcome: &VerificationOutcome, elapsed: Duration) {
        self.metrics.observe(outcome, elapsed);

        let elapsed_ms = elapsed.as_millis() as u64;
        match outcome {
            VerificationOutcome::Valid(identity) => debug!(
                method = VALIDATE_TOKEN,
                user_id = identity.user_id(),
                elapsed_ms,
                "credential resolved"
            ),
            VerificationOutcome::Invalid(reason) => warn!(
                method = VALIDATE_TOKEN,
                reason = reason.as_str(),
                elapsed_ms,
                "credential rejected by auth service"
            ),
            VerificationOutcome::ServiceUnavailable(cause) => error!(
                method = VALIDATE_TOKEN,
                cause = cause.as_str(),
                grpc_code = ?cause.grpc_code(),
                elapsed_ms,
                "auth service unavailable"
            ),
        }
    }
}

#[async_trait]
impl CredentialResolver for TokenRelayClient {
    async fn resolve(&self, credential: &str) -> VerificationOutcome {
        Self::resolve(self, credential).await
    }
}

fn cause_from_status(status: &Status) -> UnavailableCause {
    match status.code() {
        Code::DeadlineExceeded => UnavailableCause::DeadlineExceeded,
        code => UnavailableCause::Transport(code),
    }
}

fn outcome_from_response(response: ValidateTokenResponse) -> VerificationOutcome {
    if !response.valid {
        debug!(issuer_error = %response.error, "auth service answered valid=false");
        return VerificationOutcome::Invalid(InvalidReason::Rejected);
    }

    match Identity::new(response.user_id, response.email, response.username) {
        Ok(identity) => VerificationOutcome::Valid(identity),
        Err(e) => {
            warn!(field = e.field, "auth service answered valid=true with an incomplete identity");
            VerificationOutcome::Invalid(InvalidReason::IncompleteIdentity)
        }
    }
}
