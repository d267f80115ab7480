//! Catalogue reads served by the product service.

mod client;
mod config;

pub use client::ProductCatalogClient;
pub use config::CatalogConfig;

use async_trait::async_trait;
use rust_common::proto::product::v1 as pb;
use serde::Serialize;
use thiserror::Error;
use tonic::Code;

/// A catalogue entry as the product service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Product id
    pub id: String,
    /// Display name
    pub name: String,
    /// Unit price in cents
    pub price_cents: u64,
    /// Free-text description
    pub description: String,
    /// Category
    pub category: String,
}

impl From<pb::Product> for Product {
    fn from(product: pb::Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price_cents: product.price_cents,
            description: product.description,
            category: product.category,
        }
    }
}

/// Why a catalogue read failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The channel was never opened, or has been closed
    #[error("product channel not initialized")]
    NotInitialized,

    /// No answer within the configured deadline
    #[error("product service deadline exceeded")]
    DeadlineExceeded,

    /// The RPC failed with a non-OK status
    #[error("product service call failed: {0:?}")]
    Transport(Code),

    /// The product service answered `success = false`
    #[error("{0}")]
    Refused(String),

    /// `open()` was given an endpoint tonic cannot use
    #[error("Invalid product endpoint: {0}")]
    InvalidEndpoint(String),

    /// `open()` called on an open channel
    #[error("Product channel is already open")]
    AlreadyOpen,
}

impl CatalogError {
    /// Whether the product service could not be consulted at all.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized | Self::DeadlineExceeded | Self::Transport(_)
        )
    }
}

/// Catalogue reads used by the `/user/products` routes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Every product.
    async fn all(&self) -> Result<Vec<Product>, CatalogError>;

    /// One product, or `None` if the product service does not know it.
    async fn by_id(&self, id: &str) -> Result<Option<Product>, CatalogError>;

    /// Products in one category.
    async fn by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError>;
}
