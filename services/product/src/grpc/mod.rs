//! `product.v1.ProductService` server.
//!
//! Missing arguments and unknown products are answered with
//! `success = false`; a non-OK status means the stores are in trouble.

use std::sync::Arc;

use chrono::SecondsFormat;
use rust_common::proto::product::v1 as pb;
use rust_common::proto::product::v1::product_service_server::{self, ProductServiceServer};
use rust_common::PlatformError;
use tonic::{Request, Response, Status};
use tracing::instrument;

use crate::catalog::{Product, Purchase};
use crate::error::ProductError;
use crate::service::{ProductService, PurchaseRequest};

/// gRPC front of the product service.
#[derive(Clone)]
pub struct ProductGrpcService {
    service: Arc<ProductService>,
}

impl ProductGrpcService {
    /// Wraps the service.
    pub fn new(service: Arc<ProductService>) -> Self {
        Self { service }
    }

    /// Tonic server for this service.
    #[must_use]
    pub fn into_server(self) -> ProductServiceServer<Self> {
        ProductServiceServer::new(self)
    }
}

impl From<Product> for pb::Product {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price_cents: product.price_cents,
            description: product.description,
            category: product.category,
        }
    }
}

impl From<Purchase> for pb::Purchase {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            user_id: purchase.user_id,
            product_id: purchase.product_id,
            product_name: purchase.product_name,
            price_cents: purchase.price_cents,
            quantity: purchase.quantity,
            total_cents: purchase.total_cents,
            purchase_date: purchase
                .purchase_date
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Splits an error into a caller-facing refusal or a failed RPC.
fn refusal(err: ProductError) -> Result<String, Status> {
    match err {
        ProductError::Validation(_) | ProductError::ProductNotFound => Ok(err.public_message()),
        ProductError::Store(PlatformError::InvalidInput(msg)) => Ok(msg),
        other => Err(other.into()),
    }
}

#[tonic::async_trait]
impl product_service_server::ProductService for ProductGrpcService {
    #[instrument(skip_all, fields(method = "GetProductById"))]
    async fn get_product_by_id(
        &self,
        request: Request<pb::GetProductByIdRequest>,
    ) -> Result<Response<pb::GetProductByIdResponse>, Status> {
        let product_id = request.into_inner().product_id;
        let product_id = product_id.trim();
        if product_id.is_empty() {
            return Ok(Response::new(pb::GetProductByIdResponse {
                success: false,
                product: None,
                error: "Product ID is required".to_string(),
            }));
        }

        let response = match self.service.product(product_id).await {
            Ok(product) => pb::GetProductByIdResponse {
                success: true,
                product: Some(product.into()),
                error: String::new(),
            },
            Err(err) => pb::GetProductByIdResponse {
                success: false,
                product: None,
                error: refusal(err)?,
            },
        };

        Ok(Response::new(response))
    }

    #[instrument(skip_all, fields(method = "GetAllProducts"))]
    async fn get_all_products(
        &self,
        _request: Request<pb::GetAllProductsRequest>,
    ) -> Result<Response<pb::GetAllProductsResponse>, Status> {
        let products = self.service.list_products(None).await?;

        Ok(Response::new(pb::GetAllProductsResponse {
            success: true,
            products: products.into_iter().map(Into::into).collect(),
            error: String::new(),
        }))
    }

    #[instrument(skip_all, fields(method = "GetProductsByCategory"))]
    async fn get_products_by_category(
        &self,
        request: Request<pb::GetProductsByCategoryRequest>,
    ) -> Result<Response<pb::GetProductsByCategoryResponse>, Status> {
        let category = request.into_inner().category;
        if category.trim().is_empty() {
            return Ok(Response::new(pb::GetProductsByCategoryResponse {
                success: false,
                products: Vec::new(),
                error: "Category is required".to_string(),
            }));
        }

        let products = self.service.list_products(Some(category)).await?;

        Ok(Response::new(pb::GetProductsByCategoryResponse {
            success: true,
            products: products.into_iter().map(Into::into).collect(),
            error: String::new(),
        }))
    }

    #[instrument(skip_all, fields(method = "BuyProduct"))]
    async fn buy_product(
        &self,
        request: Request<pb::BuyProductRequest>,
    ) -> Result<Response<pb::BuyProductResponse>, Status> {
        let request = request.into_inner();
        if request.user_id.trim().is_empty() || request.product_id.trim().is_empty() {
            return Ok(Response::new(pb::BuyProductResponse {
                success: false,
                purchase: None,
                error: "User ID and Product ID are required".to_string(),
            }));
        }

        let purchase = PurchaseRequest {
            product_id: request.product_id,
            quantity: request.quantity.max(1),
        };
        let response = match self.service.purchase(&request.user_id, purchase).await {
            Ok(purchase) => pb::BuyProductResponse {
                success: true,
                purchase: Some(purchase.into()),
                error: String::new(),
            },
            Err(err) => pb::BuyProductResponse {
                success: false,
                purchase: None,
                error: refusal(err)?,
            },
        };

        Ok(Response::new(response))
    }

    #[instrument(skip_all, fields(method = "GetUserPurchases"))]
    async fn get_user_purchases(
        &self,
        request: Request<pb::GetUserPurchasesRequest>,
    ) -> Result<Response<pb::GetUserPurchasesResponse>, Status> {
        let user_id = request.into_inner().user_id;
        if user_id.trim().is_empty() {
            return Ok(Response::new(pb::GetUserPurchasesResponse {
                success: false,
                purchases: Vec::new(),
                error: "User ID is required".to_string(),
            }));
        }

        let purchases = self.service.purchases_of(&user_id).await?;

        Ok(Response::new(pb::GetUserPurchasesResponse {
            success: true,
            purchases: purchases.into_iter().map(Into::into).collect(),
            error: String::new(),
        }))
    }
}
