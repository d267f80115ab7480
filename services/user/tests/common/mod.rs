#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth_relay::CredentialResolver;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use product_service::catalog::{InMemoryCatalog, InMemoryPurchaseLedger};
use product_service::grpc::ProductGrpcService;
use product_service::ProductService;
use prometheus::Registry;
use rust_common::{Identity, VerificationOutcome};
use serde_json::Value;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tower::ServiceExt;
use url::Url;
use user_service::catalog::{
    CatalogConfig, CatalogError, Product, ProductCatalog, ProductCatalogClient,
};
use user_service::profiles::InMemoryProfileStore;
use user_service::{http, ProfileService};

/// Resolver that answers every credential the same way and counts calls.
pub struct StubResolver {
    outcome: VerificationOutcome,
    calls: AtomicUsize,
}

impl StubResolver {
    pub fn new(outcome: VerificationOutcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn valid(user_id: &str) -> Arc<Self> {
        Self::new(VerificationOutcome::Valid(identity(user_id)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialResolver for StubResolver {
    async fn resolve(&self, _credential: &str) -> VerificationOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

pub fn identity(user_id: &str) -> Identity {
    Identity::new(user_id, format!("{user_id}@example.com"), user_id).unwrap()
}

/// Catalogue with two fixed products, or one that is always down.
pub struct StubCatalog {
    down: bool,
    calls: AtomicUsize,
}

impl StubCatalog {
    pub fn up() -> Arc<Self> {
        Arc::new(Self {
            down: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn down() -> Arc<Self> {
        Arc::new(Self {
            down: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn products(&self) -> Result<Vec<Product>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(CatalogError::Transport(tonic::Code::Unavailable));
        }
        Ok(vec![
            product("p-001", "Laptop Pro 15", "Electronics"),
            product("p-005", "The Great Gatsby", "Books"),
        ])
    }
}

fn product(id: &str, name: &str, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price_cents: 1_000,
        description: String::new(),
        category: category.to_string(),
    }
}

#[async_trait]
impl ProductCatalog for StubCatalog {
    async fn all(&self) -> Result<Vec<Product>, CatalogError> {
        self.products()
    }

    async fn by_id(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.products()?.into_iter().find(|p| p.id == id))
    }

    async fn by_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products()?
            .into_iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .collect())
    }
}

pub fn app_with(
    resolver: Arc<dyn CredentialResolver>,
    catalog: Arc<dyn ProductCatalog>,
) -> Router {
    let service = Arc::new(ProfileService::new(
        Arc::new(InMemoryProfileStore::new()),
        catalog,
    ));
    http::router(service, resolver, Registry::new())
}

pub fn app(resolver: Arc<dyn CredentialResolver>) -> Router {
    app_with(resolver, StubCatalog::up())
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}

/// Serves the real product gRPC server over a seeded catalogue.
pub async fn spawn_product_server() -> SocketAddr {
    let service = Arc::new(ProductService::new(
        Arc::new(InMemoryCatalog::seeded()),
        Arc::new(InMemoryPurchaseLedger::new()),
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gRPC port");
    let addr = listener.local_addr().unwrap();
    let incoming = TcpListenerStream::new(listener);
    let server = ProductGrpcService::new(service).into_server();

    tokio::spawn(async move {
        Server::builder()
            .add_service(server)
            .serve_with_incoming(incoming)
            .await
            .expect("start product gRPC server");
    });

    addr
}

pub fn catalog_config(addr: SocketAddr) -> CatalogConfig {
    CatalogConfig::new(Url::parse(&format!("http://{addr}")).unwrap())
        .with_deadline(Duration::from_secs(2))
        .with_connect_timeout(Duration::from_millis(500))
}

/// An opened client for the product server at `addr`.
pub fn open_catalog(addr: SocketAddr) -> Arc<ProductCatalogClient> {
    let client = Arc::new(ProductCatalogClient::new(catalog_config(addr)));
    client.open().unwrap();
    client
}
