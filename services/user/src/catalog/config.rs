//! Product channel configuration.

use std::time::Duration;

use rust_common::config::{
    parse_duration_env, parse_url_env, validate_grpc_endpoint, ConfigError,
};
use url::Url;

const DEFAULT_ENDPOINT: &str = "http://localhost:50053";
const DEFAULT_DEADLINE: Duration = Duration::from_secs(2);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Where the product service lives and how long a call may take.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// gRPC endpoint of the product service
    pub endpoint: Url,
    /// Upper bound for a single call
    pub deadline: Duration,
    /// Upper bound for establishing the HTTP/2 connection
    pub connect_timeout: Duration,
}

impl CatalogConfig {
    /// Config for `endpoint` with the default 2s deadline and 1s connect timeout.
    #[must_use]
    pub const fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            deadline: DEFAULT_DEADLINE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Reads `PRODUCT_GRPC_URL`, `PRODUCT_GRPC_DEADLINE` and
    /// `PRODUCT_GRPC_CONNECT_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            endpoint: parse_url_env("PRODUCT_GRPC_URL", DEFAULT_ENDPOINT)?,
            deadline: parse_duration_env("PRODUCT_GRPC_DEADLINE", DEFAULT_DEADLINE)?,
            connect_timeout: parse_duration_env(
                "PRODUCT_GRPC_CONNECT_TIMEOUT",
                DEFAULT_CONNECT_TIMEOUT,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_grpc_endpoint("PRODUCT_GRPC_URL", &self.endpoint)?;
        if self.deadline.is_zero() {
            return Err(ConfigError::ZeroDuration("PRODUCT_GRPC_DEADLINE"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("PRODUCT_GRPC_CONNECT_TIMEOUT"));
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> CatalogConfig {
        CatalogConfig::new(Url::parse(DEFAULT_ENDPOINT).unwrap())
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = local();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint_uri(), "http://localhost:50053");
    }

    #[test]
    fn test_zero_deadline_rejected() {
        assert!(matches!(
            local().with_deadline(Duration::ZERO).validate(),
            Err(ConfigError::ZeroDuration("PRODUCT_GRPC_DEADLINE"))
        ));
    }

    #[test]
    fn test_tls_endpoint_rejected() {
        let config = CatalogConfig::new(Url::parse("https://product:50053").unwrap());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl { .. })));
    }
}
