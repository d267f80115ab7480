//! HTTP API. Every `/user` route sits behind the gate.

use std::sync::Arc;
use std::time::Duration;

use auth_relay::{authenticate, CredentialResolver, GateState};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use rust_common::Identity;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::Product;
use crate::error::UserError;
use crate::profiles::UserProfile;
use crate::service::{ProfileInput, ProfileService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct AppState {
    service: Arc<ProfileService>,
    registry: Registry,
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

/// Builds the router. `/user` routes resolve credentials through `resolver`.
pub fn router(
    service: Arc<ProfileService>,
    resolver: Arc<dyn CredentialResolver>,
    registry: Registry,
) -> Router {
    let gate = GateState::new(resolver);

    let protected = Router::new()
        .route(
            "/user/profile",
            get(my_profile)
                .post(create_profile)
                .put(update_profile)
                .patch(update_profile)
                .delete(delete_profile),
        )
        .route("/user/profile/get-or-create", get(profile_or_create))
        .route("/user/products", get(products))
        .route("/user/products/:id", get(product))
        .route("/user/products/category/:category", get(products_in_category))
        .route_layer(middleware::from_fn_with_state(gate, authenticate));

    Router::new()
        .merge(protected)
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service, registry })
}

async fn my_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserProfile>, UserError> {
    Ok(Json(state.service.profile(&identity).await?))
}

async fn profile_or_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserProfile>, UserError> {
    Ok(Json(state.service.profile_or_create(&identity).await?))
}

async fn create_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<ProfileInput>,
) -> Result<(StatusCode, Json<UserProfile>), UserError> {
    let profile = state.service.create(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<UserProfile>, UserError> {
    Ok(Json(state.service.update(&identity, input).await?))
}

async fn delete_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<StatusCode, UserError> {
    state.service.delete(&identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn products(State(state): State<AppState>) -> Result<Json<Listing<Product>>, UserError> {
    Ok(Json(state.service.products().await?.into()))
}

async fn product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, UserError> {
    Ok(Json(state.service.product(&id).await?))
}

async fn products_in_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Listing<Product>>, UserError> {
    Ok(Json(state.service.products_in(&category).await?.into()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "user-service" }))
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
