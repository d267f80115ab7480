//! Product service configuration.

use std::env;
use std::time::Duration;

use auth_relay::RelayConfig;
use rust_common::config::{parse_duration_env, parse_env, ConfigError};

/// Service configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// gRPC port
    pub grpc_port: u16,
    /// Relay channel to the auth service
    pub relay: RelayConfig,
    /// Upper bound for draining the HTTP server
    pub shutdown_timeout: Duration,
    /// Fallback log filter
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env("PORT", 3002)?,
            grpc_port: parse_env("GRPC_PORT", 50053)?,
            relay: RelayConfig::from_env()?,
            shutdown_timeout: parse_duration_env("SHUTDOWN_TIMEOUT", Duration::from_secs(30))?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_env("LOG_JSON", false)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort("PORT"));
        }
        if self.grpc_port == 0 {
            return Err(ConfigError::InvalidPort("GRPC_PORT"));
        }
        if self.port == self.grpc_port {
            return Err(ConfigError::MustDiffer("PORT", "GRPC_PORT"));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("SHUTDOWN_TIMEOUT"));
        }
        self.relay.validate()
    }

    /// `host:port` for the HTTP listener.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:grpc_port` for the gRPC listener.
    #[must_use]
    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }
}
