#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use auth_relay::CredentialResolver;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use product_service::catalog::{InMemoryCatalog, InMemoryPurchaseLedger};
use product_service::{http, ProductService};
use prometheus::Registry;
use rust_common::proto::auth::v1::auth_service_server::{AuthService, AuthServiceServer};
use rust_common::proto::auth::v1::{
    GetUserByIdRequest, GetUserByIdResponse, ValidateTokenRequest, ValidateTokenResponse,
    VerifyUserExistsRequest, VerifyUserExistsResponse,
};
use rust_common::{Identity, VerificationOutcome};
use serde_json::Value;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Response, Status};
use tower::ServiceExt;

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

pub fn app(resolver: Arc<dyn CredentialResolver>) -> Router {
    let service = Arc::new(ProductService::new(
        Arc::new(InMemoryCatalog::seeded()),
        Arc::new(InMemoryPurchaseLedger::new()),
    ));
    http::router(service, resolver, Registry::new())
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Issuer that accepts `tok-<id>` and refuses everything else.
#[derive(Clone, Default)]
pub struct PrefixIssuer;

#[tonic::async_trait]
impl AuthService for PrefixIssuer {
    async fn validate_token(
        &self,
        request: tonic::Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        let token = request.into_inner().token;
        let response = match token.strip_prefix("tok-") {
            Some(id) if !id.is_empty() => ValidateTokenResponse {
                valid: true,
                user_id: id.to_string(),
                email: format!("{id}@example.com"),
                username: id.to_string(),
                error: String::new(),
            },
            _ => ValidateTokenResponse {
                valid: false,
                error: "Invalid or expired token".to_string(),
                ..Default::default()
            },
        };
        Ok(Response::new(response))
    }

    async fn get_user_by_id(
        &self,
        _request: tonic::Request<GetUserByIdRequest>,
    ) -> Result<Response<GetUserByIdResponse>, Status> {
        Err(Status::unimplemented("get_user_by_id"))
    }

    async fn verify_user_exists(
        &self,
        _request: tonic::Request<VerifyUserExistsRequest>,
    ) -> Result<Response<VerifyUserExistsResponse>, Status> {
        Err(Status::unimplemented("verify_user_exists"))
    }
}

/// Serves [`PrefixIssuer`] on an ephemeral port.
pub async fn spawn_issuer() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gRPC port");
    let addr = listener.local_addr().unwrap();
    let incoming = TcpListenerStream::new(listener);

    tokio::spawn(async move {
        Server::builder()
            .add_service(AuthServiceServer::new(PrefixIssuer))
            .serve_with_incoming(incoming)
            .await
            .expect("start issuer");
    });

    addr
}
