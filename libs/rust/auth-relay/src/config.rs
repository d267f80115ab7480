//! Relay channel configuration.

use std::time::Duration;

use rust_common::config::{
    parse_duration_env, parse_url_env, validate_grpc_endpoint, ConfigError,
};
use url::Url;

const DEFAULT_ENDPOINT: &str = "http://localhost:50051";
const DEFAULT_DEADLINE: Duration = Duration::from_secs(2);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Where the auth service lives and how long a call may take.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// gRPC endpoint of the auth service
    pub endpoint: Url,
    /// Upper bound for a single `ValidateToken` call
    pub deadline: Duration,
    /// Upper bound for establishing the HTTP/2 connection
    pub connect_timeout: Duration,
}

impl RelayConfig {
    /// Config for `endpoint` with the default 2s deadline and 1s connect timeout.
    #[must_use]
    pub const fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            deadline: DEFAULT_DEADLINE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Reads `AUTH_GRPC_URL`, `AUTH_GRPC_DEADLINE` and `AUTH_GRPC_CONNECT_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            endpoint: parse_url_env("AUTH_GRPC_URL", DEFAULT_ENDPOINT)?,
            deadline: parse_duration_env("AUTH_GRPC_DEADLINE", DEFAULT_DEADLINE)?,
            connect_timeout: parse_duration_env(
                "AUTH_GRPC_CONNECT_TIMEOUT",
                DEFAULT_CONNECT_TIMEOUT,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_grpc_endpoint("AUTH_GRPC_URL", &self.endpoint)?;
        if self.deadline.is_zero() {
            return Err(ConfigError::ZeroDuration("AUTH_GRPC_DEADLINE"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("AUTH_GRPC_CONNECT_TIMEOUT"));
        }
        Ok(())
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the per-call deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Endpoint as the string tonic expects, without a trailing slash.
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        self.endpoint.as_str().trim_end_matches('/').to_string()
    }
}
