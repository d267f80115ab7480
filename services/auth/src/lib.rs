//! Auth service: the token issuer.
//!
//! Registers users, issues access/refresh JWT pairs and answers
//! `auth.v1.AuthService` so downstream services can verify credentials
//! without holding the signing secret.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod grpc;
pub mod http;
pub mod issuer;
pub mod jwt;
pub mod metrics;
pub mod password;
pub mod service;
pub mod users;

pub use config::{Config, TokenSettings};
pub use error::AuthError;
pub use issuer::{TokenIssuer, TokenPair};
pub use service::AuthService;
