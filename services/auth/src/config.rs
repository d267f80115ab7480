//! Auth service configuration.

use std::env;
use std::time::Duration;

use rust_common::config::{parse_duration_env, parse_env, require_env, ConfigError};
use secrecy::{ExposeSecret, SecretString};

const MIN_SECRET_LEN: usize = 32;

/// Signing material and lifetimes for both credential kinds.
#[derive(Debug)]
pub struct TokenSettings {
    /// HS256 secret for access credentials
    pub access_secret: SecretString,
    /// HS256 secret for refresh credentials; must differ from the access one
    pub refresh_secret: SecretString,
    /// Access credential lifetime
    pub access_ttl: Duration,
    /// Refresh credential lifetime
    pub refresh_ttl: Duration,
    /// `iss` claim written and required
    pub issuer: String,
}

impl TokenSettings {
    /// Validates secrets and lifetimes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let access = self.access_secret.expose_secret();
        let refresh = self.refresh_secret.expose_secret();

        for (name, secret) in [("JWT_SECRET", access), ("JWT_REFRESH_SECRET", refresh)] {
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::ParseError {
                    name: name.to_string(),
                    reason: format!("secret must be at least {MIN_SECRET_LEN} bytes"),
                });
            }
        }
        if access == refresh {
            return Err(ConfigError::MustDiffer("JWT_SECRET", "JWT_REFRESH_SECRET"));
        }
        if self.access_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("JWT_EXPIRES_IN"));
        }
        if self.refresh_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("JWT_REFRESH_EXPIRES_IN"));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_ISSUER".to_string()));
        }
        Ok(())
    }
}

/// Service configuration with validation.
#[derive(Debug)]
pub struct Config {
    /// Bind address for both listeners
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// gRPC port
    pub grpc_port: u16,
    /// Token issuance settings
    pub tokens: TokenSettings,
    /// Upper bound for draining both servers
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
            http_port: parse_env("HTTP_PORT", 3001)?,
            grpc_port: parse_env("GRPC_PORT", 50051)?,
            tokens: TokenSettings {
                access_secret: SecretString::from(require_env("JWT_SECRET")?),
                refresh_secret: SecretString::from(require_env("JWT_REFRESH_SECRET")?),
                access_ttl: parse_duration_env("JWT_EXPIRES_IN", Duration::from_secs(15 * 60))?,
                refresh_ttl: parse_duration_env(
                    "JWT_REFRESH_EXPIRES_IN",
                    Duration::from_secs(7 * 24 * 60 * 60),
                )?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "auth-service".to_string()),
            },
            shutdown_timeout: parse_duration_env("SHUTDOWN_TIMEOUT", Duration::from_secs(30))?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_env("LOG_JSON", false)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidPort("HTTP_PORT"));
        }
        if self.grpc_port == 0 {
            return Err(ConfigError::InvalidPort("GRPC_PORT"));
        }
        if self.http_port == self.grpc_port {
            return Err(ConfigError::MustDiffer("HTTP_PORT", "GRPC_PORT"));
        }
        self.tokens.validate()
    }

    /// `host:port` for the HTTP listener.
    #[must_use]
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// `host:port` for the gRPC listener.
    #[must_use]
    pub fn grpc_addr(&self) -> String {
        format!("{}:{}", self.host, self.grpc_port)
    }
}
