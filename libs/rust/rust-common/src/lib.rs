//! Shared library for cross-cutting concerns in the s2s auth services.
//!
//! This crate provides centralized implementations for:
//! - The verified `Identity` and the three-way `VerificationOutcome`
//! - Error types with retryability classification
//! - Typed environment parsing for service configs
//! - Tracing subscriber initialization
//! - Graceful shutdown coordination
//! - Generated `auth.v1` and `product.v1` protobuf/gRPC stubs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod identity;
pub mod shutdown;
pub mod tracing_config;

/// Generated protobuf code for the `auth.v1` and `product.v1` packages.
#[allow(missing_docs)]
pub mod proto {
    pub mod auth {
        pub mod v1 {
            tonic::include_proto!("auth.v1");
        }
    }

    pub mod product {
        pub mod v1 {
            tonic::include_proto!("product.v1");
        }
    }
}

pub use config::ConfigError;
pub use error::PlatformError;
pub use identity::{Identity, IdentityError, InvalidReason, UnavailableCause, VerificationOutcome};
pub use shutdown::{wait_for_signal, ShutdownCoordinator, ShutdownSignal};
pub use tracing_config::{init_tracing, TracingConfig};
