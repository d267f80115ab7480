//! gRPC client for `product.v1.ProductService`.
//!
//! Same lifecycle as the auth relay: opened explicitly at startup, closed at
//! shutdown, and calls clone the shared client out of an `ArcSwapOption`
//! without taking a lock.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_common::proto::product::v1::product_service_client::ProductServiceClient;
use rust_common::proto::product::v1::{
    GetAllProductsRequest, GetProductByIdRequest, GetProductsByCategoryRequest,
};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Response, Status};
use tracing::{debug, error, info};

use super::{CatalogConfig, CatalogError, Product, ProductCatalog};

/// Client for the product service's catalogue reads.
pub struct ProductCatalogClient {
    config: CatalogConfig,
    client: ArcSwapOption<ProductServiceClient<Channel>>,
    /// Serializes `open`/`close`; calls never touch it.
    lifecycle: Mutex<()>,
}

impl ProductCatalogClient {
    /// Creates a closed client. Call [`open`](Self::open) before serving.
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            config,
            client: ArcSwapOption::empty(),
            lifecycle: Mutex::new(()),
        }
    }

    /// Opens the channel. The connection is established lazily on the first
    /// call. Must run inside a tokio runtime.
    pub fn open(&self) -> Result<(), CatalogError> {
        let _guard = self.lifecycle.lock();
        if self.client.load().is_some() {
            return Err(CatalogError::AlreadyOpen);
        }

        self.config
            .validate()
            .map_err(|e| CatalogError::InvalidEndpoint(e.to_string()))?;

        let endpoint = Endpoint::from_shared(self.config.endpoint_uri())
            .map_err(|e| CatalogError::InvalidEndpoint(e.to_string()))?
            .connect_timeout(self.config.connect_timeout);

        self.client
            .store(Some(Arc::new(ProductServiceClient::new(endpoint.connect_lazy()))));

        info!(
            endpoint = %self.config.endpoint,
            deadline = ?self.config.deadline,
            "product channel opened"
        );
        Ok(())
    }

    /// Releases the channel. Returns `false` if it was not open.
    pub fn close(&self) -> bool {
        let _guard = self.lifecycle.lock();
        let was_open = self.client.swap(None).is_some();
        if was_open {
            info!(endpoint = %self.config.endpoint, "product channel closed");
        }
        was_open
    }

    /// Whether `open` has been called without a matching `close`.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.client.load().is_some()
    }

    fn client(&self) -> Result<ProductServiceClient<Channel>, CatalogError> {
        self.client
            .load_full()
            .map(|client| (*client).clone())
            .ok_or(CatalogError::NotInitialized)
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        request.set_timeout(self.config.deadline);
        request
    }

    async fn bounded<T>(
        &self,
        method: &'static str,
        call: impl Future<Output = Result<Response<T>, Status>>,
    ) -> Result<T, CatalogError> {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.config.deadline, call).await {
            Err(_) => Err(CatalogError::DeadlineExceeded),
            Ok(Err(status)) if status.code() == Code::DeadlineExceeded => {
                Err(CatalogError::DeadlineExceeded)
            }
            Ok(Err(status)) => Err(CatalogError::Transport(status.code())),
            Ok(Ok(response)) => Ok(response.into_inner()),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(method, elapsed_ms, "product call completed"),
            Err(e) => error!(method, error = %e, elapsed_ms, "product call failed"),
        }
        result
    }
}

#[async_trait]
impl ProductCatalog for ProductCatalogClient {
    async fn all(&self) -> Result<Vec<Product>, CatalogError> {
        let mut client = self.client()?;
        let response = self
            .bounded(
                "product.v1.ProductService/GetAllProducts",
                client.get_all_products(self.request(GetAllProductsRequest {})),
            )
            .await?;

        if !response.success {
            return Err(CatalogError::Refused(response.error));
        }
        Ok(response.products.into_iter().map(Product::from).collect())
    }

    async fn by_id(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        let mut client = self.client()?;
        let response = self
            .bounded(
                "product.v1.ProductService/GetProductById",
                client.get_product_by_id(self.request(GetProductByIdRequest {
                    product_id: id.to_owned(),
                })),
            )
            .await?;

        if !response.success {
            debug!(product_id = id, refusal = %response.error, "product lookup refused");
            return Ok(None);
        }
        Ok(response.product.map(Product::from))
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        let mut client = self.client()?;
        let response = self
            .bounded(
                "product.v1.ProductService/GetProductsByCategory",
                client.get_products_by_category(self.request(GetProductsByCategoryRequest {
                    category: category.to_owned(),
                })),
            )
            .await?;

        if !response.success {
            return Err(CatalogError::Refused(response.error));
        }
        Ok(response.products.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn client() -> ProductCatalogClient {
        ProductCatalogClient::new(CatalogConfig::new(Url::parse("http://127.0.0.1:1").unwrap()))
    }

    #[tokio::test]
    async fn test_open_close_cycle() {
        let client = client();
        assert!(!client.is_open());
        client.open().unwrap();
        assert!(client.is_open());
        assert_eq!(client.open().unwrap_err(), CatalogError::AlreadyOpen);
        assert!(client.close());
        assert!(!client.close());
    }

    #[tokio::test]
    async fn test_closed_client_does_not_call() {
        let client = client();
        assert_eq!(client.all().await.unwrap_err(), CatalogError::NotInitialized);
        assert_eq!(client.by_id("p-001").await.unwrap_err(), CatalogError::NotInitialized);
    }

    #[tokio::test]
    async fn test_tls_endpoint_refused_at_open() {
        let client = ProductCatalogClient::new(CatalogConfig::new(
            Url::parse("https://product:50053").unwrap(),
        ));
        assert!(matches!(client.open(), Err(CatalogError::InvalidEndpoint(_))));
        assert!(!client.is_open());
    }
}
