//! User service: profiles and catalogue reads behind the authentication gate.
//!
//! Every `/user` route is gated; the profile a request touches is always the
//! one keyed by the identity the gate resolved. Catalogue reads go to the
//! product service over its own gRPC channel, opened and closed like the
//! auth relay.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod profiles;
pub mod service;

pub use config::Config;
pub use error::UserError;
pub use service::ProfileService;
