//! Typed environment parsing shared by the service configs.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable name
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid port number
    #[error("Invalid port for {0}: must be between 1 and 65535")]
    InvalidPort(&'static str),

    /// A duration that must be positive is zero
    #[error("Invalid duration for {0}: must be greater than 0")]
    ZeroDuration(&'static str),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Two values that must differ are equal
    #[error("{0} and {1} must not be equal")]
    MustDiffer(&'static str, &'static str),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Parse an environment variable with a default value.
pub fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a humantime duration (`15m`, `7d`, `250ms`) with a default value.
pub fn parse_duration_env(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    match env::var(name) {
        Ok(val) => humantime::parse_duration(val.trim()).map_err(|e| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a URL environment variable with a default value.
pub fn parse_url_env(name: &str, default: &str) -> Result<Url, ConfigError> {
    let url_str = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

/// Checks a gRPC client endpoint: plaintext `http` with a host.
///
/// Channels are built without a TLS connector, so `https` is refused here
/// instead of silently connecting in cleartext. Transport encryption is the
/// mesh sidecar's job.
pub fn validate_grpc_endpoint(field: &str, endpoint: &Url) -> Result<(), ConfigError> {
    match endpoint.scheme() {
        "http" => {}
        "https" => {
            return Err(ConfigError::InvalidUrl {
                field: field.to_string(),
                reason: "TLS endpoints are not supported; use http:// through the mesh sidecar"
                    .to_string(),
            })
        }
        other => {
            return Err(ConfigError::InvalidUrl {
                field: field.to_string(),
                reason: format!("unsupported scheme `{other}`"),
            })
        }
    }
    if endpoint.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(())
}

/// Read a variable that has no default.
pub fn require_env(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(ConfigError::MissingRequired(name.to_string())),
    }
}
