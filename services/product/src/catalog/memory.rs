use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_common::PlatformError;
use uuid::Uuid;

use super::{NewPurchase, Product, ProductStore, Purchase, PurchaseLedger};

const SEED: &[(&str, &str, u64, &str, &str)] = &[
    (
        "p-001",
        "Laptop Pro 15",
        129_999,
        "High-performance laptop with 16GB RAM and 512GB SSD",
        "Electronics",
    ),
    (
        "p-002",
        "Wireless Headphones",
        19_999,
        "Premium noise-cancelling wireless headphones",
        "Electronics",
    ),
    (
        "p-003",
        "Cotton T-Shirt",
        2_999,
        "Comfortable 100% cotton t-shirt",
        "Clothing",
    ),
    (
        "p-004",
        "Denim Jeans",
        7_999,
        "Classic fit denim jeans",
        "Clothing",
    ),
    (
        "p-005",
        "The Great Gatsby",
        1_299,
        "Classic American novel by F. Scott Fitzgerald",
        "Books",
    ),
    (
        "p-006",
        "Rust in Action",
        4_999,
        "Systems programming concepts and techniques",
        "Books",
    ),
    (
        "p-007",
        "Organic Coffee Beans",
        2_499,
        "Premium organic coffee beans, 1kg",
        "Food",
    ),
    (
        "p-008",
        "Dark Chocolate Bar",
        899,
        "70% dark chocolate, 200g",
        "Food",
    ),
    (
        "p-009",
        "Yoga Mat",
        3_499,
        "Non-slip yoga mat with carrying strap",
        "Sports",
    ),
    (
        "p-010",
        "Running Shoes",
        11_999,
        "Lightweight running shoes with cushioned sole",
        "Sports",
    ),
];

/// Process-local catalogue, ordered by id.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<BTreeMap<String, Product>>,
}

impl InMemoryCatalog {
    /// Empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue holding the demo products.
    #[must_use]
    pub fn seeded() -> Self {
        let catalog = Self::new();
        for &(id, name, price_cents, description, category) in SEED {
            catalog.insert(Product {
                id: id.to_string(),
                name: name.to_string(),
                price_cents,
                description: description.to_string(),
                category: category.to_string(),
            });
        }
        catalog
    }

    /// Adds or replaces a product.
    pub fn insert(&self, product: Product) {
        self.products.write().insert(product.id.clone(), product);
    }
}

#[async_trait]
impl ProductStore for InMemoryCatalog {
    async fn list(&self, category: Option<String>) -> Result<Vec<Product>, PlatformError> {
        let products = self.products.read();
        Ok(products
            .values()
            .filter(|p| {
                category
                    .as_deref()
                    .map_or(true, |c| p.category.eq_ignore_ascii_case(c))
            })
            .cloned()
            .collect())
    }

    async fn find(&self, id: &str) -> Result<Option<Product>, PlatformError> {
        Ok(self.products.read().get(id).cloned())
    }
}

/// Process-local purchase history, kept in insertion order.
#[derive(Default)]
pub struct InMemoryPurchaseLedger {
    purchases: RwLock<Vec<Purchase>>,
}

impl InMemoryPurchaseLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PurchaseLedger for InMemoryPurchaseLedger {
    async fn record(&self, purchase: NewPurchase) -> Result<Purchase, PlatformError> {
        let total_cents = purchase
            .product
            .price_cents
            .checked_mul(u64::from(purchase.quantity))
            .ok_or_else(|| PlatformError::invalid_input("purchase total overflows"))?;

        let record = Purchase {
            id: Uuid::new_v4().to_string(),
            user_id: purchase.user_id,
            product_id: purchase.product.id,
            product_name: purchase.product.name,
            price_cents: purchase.product.price_cents,
            quantity: purchase.quantity,
            total_cents,
            purchase_date: Utc::now(),
        };
        self.purchases.write().push(record.clone());
        Ok(record)
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<Purchase>, PlatformError> {
        Ok(self
            .purchases
            .read()
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}
