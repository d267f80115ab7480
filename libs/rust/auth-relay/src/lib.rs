//! Cross-service authentication relay.
//!
//! A downstream service owns one [`TokenRelayClient`], opens it at startup and
//! closes it at shutdown. The [`gate::authenticate`] middleware extracts the
//! bearer credential, asks a [`CredentialResolver`] about it and turns the
//! [`VerificationOutcome`](rust_common::VerificationOutcome) into either an
//! `Identity` request extension or a 401/403/503 response.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod resolver;

pub use client::TokenRelayClient;
pub use config::RelayConfig;
pub use error::{ErrorCode, GateRejection, RelayError};
pub use gate::{authenticate, extract_bearer, GateState};
pub use metrics::RelayMetrics;
pub use resolver::CredentialResolver;
