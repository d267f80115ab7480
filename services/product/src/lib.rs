//! Product service: a resource service behind the authentication gate.
//!
//! Every HTTP route except `/health` and `/metrics` is gated. Purchases made
//! over HTTP are recorded against the identity the gate resolved through the
//! auth relay, never against anything the caller claims in the request body.
//! The `product.v1` gRPC server serves other services inside the mesh.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod grpc;
pub mod http;
pub mod service;

pub use config::Config;
pub use error::ProductError;
pub use service::ProductService;
