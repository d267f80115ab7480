//! HTTP API. Catalogue and purchases sit behind the gate.

use std::sync::Arc;
use std::time::Duration;

use auth_relay::{authenticate, CredentialResolver, GateState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use rust_common::Identity;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::{Product, Purchase};
use crate::error::ProductError;
use crate::service::{ProductService, PurchaseRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct AppState {
    service: Arc<ProductService>,
    registry: Registry,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    category: Option<String>,
}

/// A list with its length.
#[derive(Debug, Serialize)]
struct Listing<T> {
    data: Vec<T>,
    count: usize,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Builds the router. Everything except `/health` and `/metrics` sits
/// behind the gate, which resolves credentials through `resolver`.
pub fn router(
    service: Arc<ProductService>,
    resolver: Arc<dyn CredentialResolver>,
    registry: Registry,
) -> Router {
    let gate = GateState::new(resolver);

    let protected = Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(product))
        .route("/products/category/:category", get(products_in_category))
        .route("/purchases", post(purchase))
        .route("/purchases/me", get(my_purchases))
        .route("/purchases/user/:user_id", get(user_purchases))
        .route_layer(middleware::from_fn_with_state(gate, authenticate));

    Router::new()
        .merge(protected)
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service, registry })
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<Product>>, ProductError> {
    let products = state.service.list_products(query.category).await?;
    Ok(Json(products.into()))
}

async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ProductError> {
    Ok(Json(state.service.product(&id).await?))
}

async fn products_in_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Listing<Product>>, ProductError> {
    let products = state.service.list_products(Some(category)).await?;
    Ok(Json(products.into()))
}

async fn purchase(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<Purchase>), ProductError> {
    let purchase = state.service.purchase(identity.user_id(), request).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

async fn my_purchases(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Listing<Purchase>>, ProductError> {
    let purchases = state.service.purchases_of(identity.user_id()).await?;
    Ok(Json(purchases.into()))
}

async fn user_purchases(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Listing<Purchase>>, ProductError> {
    let purchases = state.service.purchases_of(&user_id).await?;
    Ok(Json(purchases.into()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "product-service" }))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&state.registry.gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics encoding failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
