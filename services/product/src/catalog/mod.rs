//! Catalogue and purchase records, and the store seams behind them.

mod memory;

pub use memory::{InMemoryCatalog, InMemoryPurchaseLedger};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_common::PlatformError;
use serde::Serialize;

/// A catalogue entry. Prices are integer cents.
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
    /// Category used for filtering
    pub category: String,
}

/// A recorded purchase. Name and price are copied from the product at
/// purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    /// Purchase id
    pub id: String,
    /// Buyer, taken from the verified identity
    pub user_id: String,
    /// Purchased product
    pub product_id: String,
    /// Product name at purchase time
    pub product_name: String,
    /// Unit price in cents at purchase time
    pub price_cents: u64,
    /// Units bought, at least one
    pub quantity: u32,
    /// `price_cents * quantity`
    pub total_cents: u64,
    /// When the purchase was recorded
    pub purchase_date: DateTime<Utc>,
}

/// Input for [`PurchaseLedger::record`].
#[derive(Debug, Clone)]
pub struct NewPurchase {
    /// Buyer
    pub user_id: String,
    /// Product being bought
    pub product: Product,
    /// Units bought
    pub quantity: u32,
}

/// Read access to the catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, optionally restricted to one category.
    async fn list(&self, category: Option<String>) -> Result<Vec<Product>, PlatformError>;

    /// One product by id.
    async fn find(&self, id: &str) -> Result<Option<Product>, PlatformError>;
}

/// Append-only purchase history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseLedger: Send + Sync {
    /// Records a purchase and returns it.
    async fn record(&self, purchase: NewPurchase) -> Result<Purchase, PlatformError>;

    /// Purchases of one user, newest first.
    async fn for_user(&self, user_id: &str) -> Result<Vec<Purchase>, PlatformError>;
}
