//! Catalogue reads and purchases on behalf of a user.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::catalog::{NewPurchase, Product, ProductStore, Purchase, PurchaseLedger};
use crate::error::ProductError;

const fn default_quantity() -> u32 {
    1
}

/// `POST /purchases` body.
#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseRequest {
    /// Product to buy
    #[validate(length(min = 1))]
    pub product_id: String,
    /// Units to buy; defaults to one
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: u32,
}

/// Product use cases over a catalogue and a purchase ledger.
pub struct ProductService {
    products: Arc<dyn ProductStore>,
    purchases: Arc<dyn PurchaseLedger>,
}

impl ProductService {
    /// Creates the service.
    pub fn new(products: Arc<dyn ProductStore>, purchases: Arc<dyn PurchaseLedger>) -> Self {
        Self {
            products,
            purchases,
        }
    }

    /// Lists the catalogue, optionally for one category.
    pub async fn list_products(
        &self,
        category: Option<String>,
    ) -> Result<Vec<Product>, ProductError> {
        let category = category.filter(|c| !c.trim().is_empty());
        Ok(self.products.list(category).await?)
    }

    /// One product by id.
    pub async fn product(&self, id: &str) -> Result<Product, ProductError> {
        self.products
            .find(id)
            .await?
            .ok_or(ProductError::ProductNotFound)
    }

    /// Records a purchase for `user_id`.
    pub async fn purchase(
        &self,
        user_id: &str,
        request: PurchaseRequest,
    ) -> Result<Purchase, ProductError> {
        let user_id = require_user_id(user_id)?;
        request.validate().map_err(validation_error)?;

        let product = self.product(request.product_id.trim()).await?;
        let purchase = self
            .purchases
            .record(NewPurchase {
                user_id: user_id.to_string(),
                product,
                quantity: request.quantity,
            })
            .await?;

        info!(
            user_id,
            product_id = %purchase.product_id,
            quantity = purchase.quantity,
            "purchase recorded"
        );
        Ok(purchase)
    }

    /// Purchases of `user_id`, newest first.
    pub async fn purchases_of(&self, user_id: &str) -> Result<Vec<Purchase>, ProductError> {
        let user_id = require_user_id(user_id)?;
        Ok(self.purchases.for_user(user_id).await?)
    }
}

fn require_user_id(user_id: &str) -> Result<&str, ProductError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ProductError::Validation("user id is required".to_string()));
    }
    Ok(user_id)
}

fn validation_error(errors: ValidationErrors) -> ProductError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    ProductError::Validation(format!("invalid fields: {}", fields.join(", ")))
}
