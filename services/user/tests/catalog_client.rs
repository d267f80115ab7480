//! Catalogue client against the real product gRPC server.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use common::{
    app_with, catalog_config, get, open_catalog, send, spawn_product_server, StubResolver,
};
use user_service::catalog::{CatalogError, ProductCatalog, ProductCatalogClient};

#[tokio::test]
async fn reads_the_seeded_catalogue() {
    let catalog = open_catalog(spawn_product_server().await);

    let all = catalog.all().await.unwrap();
    assert_eq!(all.len(), 10);

    let laptop = catalog.by_id("p-001").await.unwrap().unwrap();
    assert_eq!(laptop.name, "Laptop Pro 15");
    assert_eq!(laptop.price_cents, 129_999);

    assert!(catalog.by_id("p-999").await.unwrap().is_none());

    let sports = catalog.by_category("Sports").await.unwrap();
    assert_eq!(sports.len(), 2);
}

#[tokio::test]
async fn blank_category_is_refused_by_product_service() {
    let catalog = open_catalog(spawn_product_server().await);

    assert_eq!(
        catalog.by_category("").await.unwrap_err(),
        CatalogError::Refused("Category is required".to_string())
    );
}

#[tokio::test]
async fn unreachable_product_service_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let catalog = open_catalog(addr);

    let started = Instant::now();
    let err = catalog.all().await.unwrap_err();
    assert!(err.is_unavailable(), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn closed_client_fails_without_calling() {
    let addr = spawn_product_server().await;
    let catalog = Arc::new(ProductCatalogClient::new(catalog_config(addr)));
    assert_eq!(catalog.all().await.unwrap_err(), CatalogError::NotInitialized);

    catalog.open().unwrap();
    assert!(catalog.by_id("p-001").await.unwrap().is_some());

    assert!(catalog.close());
    assert_eq!(
        catalog.by_id("p-001").await.unwrap_err(),
        CatalogError::NotInitialized
    );
}

#[tokio::test]
async fn user_routes_through_real_product_service() {
    let catalog = open_catalog(spawn_product_server().await);
    let app = app_with(StubResolver::valid("u1"), catalog.clone());

    let (status, body) = send(&app, get("/user/products/category/Clothing", Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = send(&app, get("/user/products/p-010", Some("tok"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Running Shoes");

    catalog.close();
    let (status, body) = send(&app, get("/user/products", Some("tok"))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "PRODUCT_SERVICE_UNAVAILABLE");
}
