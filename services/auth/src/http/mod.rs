//! HTTP API under `/auth`.

use std::sync::Arc;
use std::time::Duration;

use auth_relay::{authenticate, CredentialResolver, GateState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use rust_common::Identity;
use serde_json::{json, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::AuthError;
use crate::service::{AuthResponse, AuthService, LoginRequest, RefreshRequest, RegisterRequest};
use crate::users::UserView;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct AppState {
    service: Arc<AuthService>,
    registry: Registry,
}

/// Builds the router. `/auth/me` sits behind the gate, resolved locally by
/// the issuer.
pub fn router(service: Arc<AuthService>, registry: Registry) -> Router {
    let resolver: Arc<dyn CredentialResolver> = service.issuer().clone();
    let gate = GateState::new(resolver);

    let protected = Router::new()
        .route("/auth/me", get(me))
        .route_layer(middleware::from_fn_with_state(gate, authenticate));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .merge(protected)
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service, registry })
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = state.service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(state.service.login(request).await?))
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    Ok(Json(state.service.refresh(request).await?))
}

async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserView>, AuthError> {
    Ok(Json(state.service.me(&identity).await?))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "auth-service" }))
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
